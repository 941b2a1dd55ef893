use std::backtrace::Backtrace;
use std::io;

use rocket::http::ContentType;
use rusqlite::{Connection, TransactionBehavior};
use sha2::{Digest, Sha256};

use crate::albums::repository as album_repository;
use crate::model::error::photo_errors::{DeletePhotoError, GetPhotoError, ImportPhotoError};
use crate::photos::models::{ImportPhoto, Photo, SizeVariant, RAW_EXTENSIONS, RAW_TYPE};
use crate::photos::reaper::{self, PredeleteReport};
use crate::photos::repository::{self as photo_repository, NewPhoto};
use crate::photos::storage::PhotoStorage;
use crate::photos::variants;
use crate::repository::open_connection;

/// retrieves the photo along with its size variants
pub fn get_photo(id: u32) -> Result<Photo, GetPhotoError> {
    let con = open_connection();
    let result = photo_repository::get_photo(id, &con);
    con.close().unwrap_or(());
    match result {
        Ok(photo) => Ok(photo),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(GetPhotoError::NotFound),
        Err(e) => {
            log::error!(
                "Failed to pull photo {id} from the database! Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            Err(GetPhotoError::DbFailure)
        }
    }
}

/// Stores a new photo.
///
/// If a photo with the same contents was imported before, the new record points at the files already on disk
/// and nothing is written. Otherwise the original, the live photo, and every size variant the image is large
/// enough for are written to storage
pub fn import_photo(
    request: ImportPhoto,
    storage: &impl PhotoStorage,
) -> Result<Photo, ImportPhotoError> {
    let extension = request.extension.trim().trim_start_matches('.').to_lowercase();
    if extension.is_empty() {
        return Err(ImportPhotoError::MissingExtension);
    }
    let album_id = match request.album_id {
        Some(0) | None => None,
        Some(id) => Some(id),
    };
    let checksum = format!("{:x}", Sha256::digest(&request.contents));
    let mut con = open_connection();
    let tx = con
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(log_import_db_failure)?;
    if let Some(album_id) = album_id {
        match album_repository::get_album(album_id, &tx) {
            Ok(_) => {}
            Err(rusqlite::Error::QueryReturnedNoRows) => return Err(ImportPhotoError::AlbumNotFound),
            Err(e) => return Err(log_import_db_failure(e)),
        }
    }
    let existing =
        photo_repository::get_photo_by_checksum(&checksum, &tx).map_err(log_import_db_failure)?;
    let mut written: Vec<String> = Vec::new();
    let stored = match existing {
        Some(existing) => {
            log::info!(
                "Photo with checksum {checksum} already exists as {}, reusing its files",
                existing.id
            );
            StoredFiles {
                photo_type: existing.photo_type,
                url: existing.url,
                live_photo_url: existing.live_photo_url,
                width: existing.width,
                height: existing.height,
                size_variants: existing.size_variants,
            }
        }
        None => match write_files(&request, &extension, &checksum, storage, &mut written) {
            Ok(stored) => stored,
            Err(e) => {
                remove_written(&written, storage);
                return Err(e);
            }
        },
    };
    let new_photo = NewPhoto {
        title: request.title.trim(),
        album_id,
        owner_id: request.owner_id,
        photo_type: &stored.photo_type,
        url: &stored.url,
        live_photo_url: stored.live_photo_url.as_deref(),
        checksum: &checksum,
        file_size: request.contents.len() as u64,
        width: stored.width,
        height: stored.height,
    };
    let saved = save_record(&new_photo, &stored.size_variants, &tx).and_then(|id| {
        let photo = photo_repository::get_photo(id, &tx)?;
        tx.commit()?;
        Ok(photo)
    });
    saved.map_err(|e| {
        remove_written(&written, storage);
        log_import_db_failure(e)
    })
}

/// Deletes the photo record and, unless another photo shares them, its files.
///
/// The record is removed even if some of the files could not be; the returned report says which ones
pub fn delete_photo(
    id: u32,
    keep_original: bool,
    storage: &impl PhotoStorage,
) -> Result<PredeleteReport, DeletePhotoError> {
    let mut con = open_connection();
    // immediate so that an import of the same file can't sneak in between the duplicate check and the delete
    let tx = con
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| log_delete_failure(id, e))?;
    let photo = match photo_repository::get_photo(id, &tx) {
        Ok(photo) => photo,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Err(DeletePhotoError::NotFound),
        Err(e) => return Err(log_delete_failure(id, e)),
    };
    let report = delete_photo_with_connection(&photo, keep_original, storage, &tx)
        .map_err(|e| log_delete_failure(id, e))?;
    tx.commit().map_err(|e| log_delete_failure(id, e))?;
    Ok(report)
}

/// removes the files of the photo and then its record, using the caller's connection (and transaction)
pub fn delete_photo_with_connection(
    photo: &Photo,
    keep_original: bool,
    storage: &impl PhotoStorage,
    con: &Connection,
) -> Result<PredeleteReport, rusqlite::Error> {
    let report = reaper::predelete(photo, keep_original, storage, con)?;
    photo_repository::delete_photo(photo.id, con)?;
    Ok(report)
}

/// the mime type stored for a file with this extension
pub fn photo_type_for(extension: &str) -> String {
    if RAW_EXTENSIONS.contains(&extension) {
        return RAW_TYPE.to_string();
    }
    match ContentType::from_extension(extension) {
        Some(content_type) => content_type.to_string(),
        None => format!("image/{extension}"),
    }
}

/// the parts of a photo record that describe its files
struct StoredFiles {
    photo_type: String,
    url: String,
    live_photo_url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    size_variants: Vec<SizeVariant>,
}

fn write_files(
    request: &ImportPhoto,
    extension: &str,
    checksum: &str,
    storage: &impl PhotoStorage,
    written: &mut Vec<String>,
) -> Result<StoredFiles, ImportPhotoError> {
    let stem = &checksum[..32];
    let photo_type = photo_type_for(extension);
    let url = format!("{stem}.{extension}");
    let original_dir = if photo_type == RAW_TYPE { "raw" } else { "big" };
    write_file(&format!("{original_dir}/{url}"), &request.contents, storage, written)?;
    let live_photo_url = match &request.live_photo {
        Some(live) => {
            let live_extension = live.extension.trim().trim_start_matches('.').to_lowercase();
            let live_url = format!("{stem}.{live_extension}");
            write_file(&format!("big/{live_url}"), &live.contents, storage, written)?;
            Some(live_url)
        }
        None => None,
    };
    let decoded = if photo_type == RAW_TYPE {
        None
    } else {
        match image::load_from_memory(&request.contents) {
            Ok(img) => Some(img),
            Err(e) => {
                log::warn!("Could not decode photo {url}, no size variants will be made. Error is {e:?}");
                None
            }
        }
    };
    let mut size_variants = Vec::new();
    let (mut width, mut height) = (None, None);
    if let Some(img) = decoded {
        width = Some(img.width());
        height = Some(img.height());
        let rendered = match variants::render_variants(&img) {
            Ok(rendered) => rendered,
            Err(e) => {
                log::error!(
                    "Failed to render size variants for {url}. Error is {e:?}\n{}",
                    Backtrace::force_capture()
                );
                Vec::new()
            }
        };
        for variant in rendered {
            let variant_url = variant.kind.url_for(stem);
            write_file(&variant_url, &variant.contents, storage, written)?;
            size_variants.push(SizeVariant {
                kind: variant.kind,
                width: variant.width,
                height: variant.height,
                url: variant_url,
            });
        }
    }
    Ok(StoredFiles {
        photo_type,
        url,
        live_photo_url,
        width,
        height,
        size_variants,
    })
}

fn write_file(
    path: &str,
    contents: &[u8],
    storage: &impl PhotoStorage,
    written: &mut Vec<String>,
) -> Result<(), ImportPhotoError> {
    match storage.write(path, contents) {
        Ok(()) => {
            written.push(path.to_string());
            Ok(())
        }
        Err(e) => {
            log::error!(
                "Failed to write {}. Error is {e:?}\n{}",
                storage.absolute_path(path).display(),
                Backtrace::force_capture()
            );
            Err(match e.kind() {
                io::ErrorKind::PermissionDenied => ImportPhotoError::InsufficientFilesystemPermissions,
                _ => ImportPhotoError::FileSystemFailure,
            })
        }
    }
}

/// cleans up after an import that couldn't finish
fn remove_written(written: &[String], storage: &impl PhotoStorage) {
    for path in written {
        if let Err(e) = storage.delete(path) {
            log::warn!(
                "Failed to clean up {} after a failed import. Error is {e:?}",
                storage.absolute_path(path).display()
            );
        }
    }
}

fn save_record(
    photo: &NewPhoto,
    size_variants: &[SizeVariant],
    con: &Connection,
) -> Result<u32, rusqlite::Error> {
    let id = photo_repository::create_photo(photo, con)?;
    for variant in size_variants {
        photo_repository::create_size_variant(id, variant, con)?;
    }
    Ok(id)
}

fn log_import_db_failure(error: rusqlite::Error) -> ImportPhotoError {
    log::error!(
        "Failed to save photo to the database! Error is {error:?}\n{}",
        Backtrace::force_capture()
    );
    ImportPhotoError::DbFailure
}

fn log_delete_failure(id: u32, error: rusqlite::Error) -> DeletePhotoError {
    log::error!(
        "Failed to delete photo {id}! Error is {error:?}\n{}",
        Backtrace::force_capture()
    );
    DeletePhotoError::DbFailure
}
