pub mod handler;
pub mod models;
pub mod reaper;
pub mod repository;
pub mod service;
pub mod storage;
pub mod variants;


pub use models::*;

/// the directory photo files are stored under
#[cfg(not(test))]
pub fn photo_dir() -> String {
    crate::config::PHOTO_SERVER_CONFIG.storage.root.clone()
}

#[cfg(test)]
pub fn photo_dir() -> String {
    let thread_name = crate::test::current_thread_name();
    format!("./{thread_name}_photos")
}
