#[macro_use]
extern crate rocket;

use std::time::SystemTime;

use log::LevelFilter;
use rocket::{Build, Rocket};

use crate::albums::handler::{
    create_album, delete_album, fix_tree, get_album, merge_albums, tree_status,
};
use crate::config::PHOTO_SERVER_CONFIG;
use crate::photos::handler::{delete_photo, get_photo, upload_photo};
use crate::photos::storage::DiskStorage;
use crate::repository::initialize_db;

mod albums;
mod config;
mod model;
mod photos;
mod repository;
#[cfg(test)]
mod test;

#[launch]
fn rocket() -> Rocket<Build> {
    #[cfg(not(test))]
    if let Err(e) = setup_logger() {
        eprintln!("Failed to set up logging, continuing without it: {e:?}");
    }
    if let Err(e) = initialize_db() {
        panic!("Failed to initialize the database!: {e}");
    }
    rocket::build()
        .manage(DiskStorage::from_config())
        .mount(
            "/albums",
            routes![
                get_album,
                create_album,
                delete_album,
                merge_albums,
                tree_status,
                fix_tree
            ],
        )
        .mount("/photos", routes![upload_photo, get_photo, delete_photo])
}

/// sends log records to stdout, and to the configured log file if there is one
#[cfg_attr(test, allow(dead_code))]
fn setup_logger() -> Result<(), fern::InitError> {
    let level = PHOTO_SERVER_CONFIG
        .log
        .level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Info);
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}:{}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.module_path().unwrap_or(record.target()),
                record.line().unwrap_or(0),
                message
            ))
        })
        .level(level)
        // rocket is very chatty below warn
        .level_for("rocket", LevelFilter::Warn)
        .level_for("_", LevelFilter::Warn)
        .chain(std::io::stdout());
    if let Some(file) = &PHOTO_SERVER_CONFIG.log.file {
        dispatch = dispatch.chain(fern::log_file(file)?);
    }
    dispatch.apply()?;
    Ok(())
}
