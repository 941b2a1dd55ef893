use std::cell::RefCell;
use std::collections::HashSet;
use std::fs::{remove_dir_all, remove_file};
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::params;

use crate::albums::{repository as album_repository, tree};
use crate::photos::repository::{self as photo_repository, NewPhoto};
use crate::photos::storage::PhotoStorage;
use crate::photos::{photo_dir, SizeVariant, SizeVariantKind};
use crate::repository::{initialize_db, open_connection};


pub fn current_thread_name() -> String {
    let current_thread = std::thread::current();
    current_thread.name().unwrap().to_string()
}

pub fn refresh_db() {
    let thread_name = current_thread_name();
    remove_file(Path::new(format!("{thread_name}.sqlite").as_str())).unwrap_or(());
    initialize_db().unwrap();
}

/// starts the test with a fresh database and an empty photo directory
pub fn init_db_folder() {
    remove_files();
    refresh_db();
    std::fs::create_dir_all(photo_dir()).unwrap();
}

pub fn remove_files() {
    let dir = photo_dir();
    let path = Path::new(dir.as_str());
    if path.exists() {
        remove_dir_all(path).unwrap_or(());
    }
}

pub fn cleanup() {
    let thread_name = current_thread_name();
    remove_files();
    remove_file(Path::new(format!("{thread_name}.sqlite").as_str())).unwrap_or(());
}

/// creates an album as the last child of `parent_id`, keeping the tree valid
pub fn create_album_db_entry(title: &str, parent_id: Option<u32>, owner_id: u32) -> u32 {
    let connection = open_connection();
    let positions = tree::insert_node(parent_id, &connection).unwrap();
    let id =
        album_repository::create_album(title, parent_id, owner_id, positions, &connection).unwrap();
    connection.close().unwrap();
    id
}

/// creates a jpeg photo whose url is `<checksum>.jpg`, without size variants
pub fn create_photo_db_entry(
    title: &str,
    album_id: Option<u32>,
    owner_id: u32,
    checksum: &str,
) -> u32 {
    let connection = open_connection();
    let url = format!("{checksum}.jpg");
    let id = photo_repository::create_photo(
        &NewPhoto {
            title,
            album_id,
            owner_id,
            photo_type: "image/jpeg",
            url: &url,
            live_photo_url: None,
            checksum,
            file_size: 10,
            width: Some(4000),
            height: Some(3000),
        },
        &connection,
    )
    .unwrap();
    connection.close().unwrap();
    id
}

/// gives the photo a row for every size variant kind, stored under `stem`
pub fn create_size_variant_entries(photo_id: u32, stem: &str) {
    let connection = open_connection();
    for kind in SizeVariantKind::ALL {
        photo_repository::create_size_variant(
            photo_id,
            &SizeVariant {
                kind,
                width: 100,
                height: 100,
                url: kind.url_for(stem),
            },
            &connection,
        )
        .unwrap();
    }
    connection.close().unwrap();
}

pub fn set_live_photo_url(photo_id: u32, url: &str) {
    let connection = open_connection();
    connection
        .execute(
            "update Photos set livePhotoUrl = ?1 where id = ?2",
            params![url, photo_id],
        )
        .unwrap();
    connection.close().unwrap();
}

/// overwrites the position markers of an album, bypassing the tree bookkeeping
pub fn set_album_position(id: u32, lft: i64, rgt: i64) {
    let connection = open_connection();
    connection
        .execute(
            "update Albums set lft = ?1, rgt = ?2 where id = ?3",
            params![lft, rgt, id],
        )
        .unwrap();
    connection.close().unwrap();
}

/// overwrites the parent of an album, bypassing the tree bookkeeping
pub fn set_album_parent(id: u32, parent_id: Option<u32>) {
    let connection = open_connection();
    connection
        .execute(
            "update Albums set parentId = ?1 where id = ?2",
            params![parent_id, id],
        )
        .unwrap();
    connection.close().unwrap();
}

/// `(id, parent_id, lft, rgt)` of every album, ordered by id
pub fn album_rows() -> Vec<(u32, Option<u32>, i64, i64)> {
    let connection = open_connection();
    let rows = {
        let mut pst = connection
            .prepare("select id, parentId, lft, rgt from Albums order by id")
            .unwrap();
        let rows = pst
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
            .unwrap();
        rows.collect::<Result<Vec<_>, _>>().unwrap()
    };
    connection.close().unwrap();
    rows
}

pub fn is_tree_broken() -> bool {
    let connection = open_connection();
    let broken = tree::is_broken(&connection).unwrap();
    connection.close().unwrap();
    broken
}

/// In-memory [`PhotoStorage`] that remembers every call made to it
#[derive(Default)]
pub struct RecordingStorage {
    files: RefCell<HashSet<String>>,
    undeletable: HashSet<String>,
    read_only: bool,
    pub exists_calls: RefCell<Vec<String>>,
    pub delete_calls: RefCell<Vec<String>>,
    pub write_calls: RefCell<Vec<String>>,
}

impl RecordingStorage {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: RefCell::new(files.iter().map(|f| f.to_string()).collect()),
            ..Default::default()
        }
    }

    /// deleting this file fails with a permission error
    pub fn refuse_delete(mut self, path: &str) -> Self {
        self.undeletable.insert(path.to_string());
        self
    }

    /// every write fails with a permission error
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.borrow().contains(path)
    }

    pub fn total_calls(&self) -> usize {
        self.exists_calls.borrow().len() + self.delete_calls.borrow().len()
    }
}

impl PhotoStorage for RecordingStorage {
    fn exists(&self, path: &str) -> bool {
        self.exists_calls.borrow_mut().push(path.to_string());
        self.files.borrow().contains(path)
    }

    fn delete(&self, path: &str) -> io::Result<()> {
        self.delete_calls.borrow_mut().push(path.to_string());
        if self.undeletable.contains(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        if self.files.borrow_mut().remove(path) {
            Ok(())
        } else {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn absolute_path(&self, path: &str) -> PathBuf {
        PathBuf::from("/recording").join(path)
    }

    fn write(&self, path: &str, _contents: &[u8]) -> io::Result<()> {
        self.write_calls.borrow_mut().push(path.to_string());
        if self.read_only {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.files.borrow_mut().insert(path.to_string());
        Ok(())
    }
}

/// a decodable png of the passed size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut blob = Vec::new();
    img.write_to(&mut io::Cursor::new(&mut blob), image::ImageFormat::Png)
        .unwrap();
    blob
}
