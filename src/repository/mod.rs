use std::path::Path;

#[cfg(not(test))]
use rusqlite::OpenFlags;
use rusqlite::{Connection, Result};

pub mod metadata_repository;

/// creates a new connection and returns it, but panics if the connection could not be created.
///
/// The `rarray` table-valued function is registered on every connection so that queries can bind id lists
#[cfg(not(test))]
pub fn open_connection() -> Connection {
    use crate::config::PHOTO_SERVER_CONFIG;

    let con = match Connection::open_with_flags(
        Path::new(PHOTO_SERVER_CONFIG.database.location.as_str()),
        OpenFlags::default(),
    ) {
        Ok(con) => con,
        Err(error) => panic!("Failed to get a connection to the database!: {error}"),
    };
    load_array_module(con)
}

#[cfg(test)]
pub fn open_connection() -> Connection {
    let db_name = format!("{}.sqlite", crate::test::current_thread_name());
    let con = match Connection::open_with_flags(
        Path::new(db_name.as_str()),
        rusqlite::OpenFlags::default(),
    ) {
        Ok(con) => con,
        Err(error) => panic!("Failed to get a connection to the database!: {error}"),
    };
    load_array_module(con)
}

fn load_array_module(con: Connection) -> Connection {
    if let Err(e) = rusqlite::vtab::array::load_module(&con) {
        panic!("Failed to load the rarray module into the connection!: {e}");
    }
    con
}

/// binds a list of ids so it can be passed to a query using `rarray(?)`
pub fn id_array(ids: &[u32]) -> std::rc::Rc<Vec<rusqlite::types::Value>> {
    std::rc::Rc::new(
        ids.iter()
            .map(|id| rusqlite::types::Value::from(i64::from(*id)))
            .collect(),
    )
}

/// runs init.sql on the database
fn create_db(con: &Connection) -> Result<()> {
    con.execute_batch(include_str!("../assets/init.sql"))
}

/// handles checking if the database exists and is up to the correct version.
/// If not, it creates the database
pub fn initialize_db() -> Result<()> {
    let con = open_connection();
    match metadata_repository::get_version(&con) {
        Ok(version) => log::debug!("Database is at version {version}"),
        Err(_) => {
            // tables haven't been created yet
            log::info!("No database found, creating a new one...");
            create_db(&con)?;
        }
    };
    con.close().map_err(|(_, e)| e)
}
