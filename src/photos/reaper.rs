//! Removes the files belonging to a photo before its record is deleted.
//!
//! Photos that were imported from the same source file share their original and their size variants,
//! so files are only touched when no other photo has the same checksum.

use rusqlite::Connection;

use crate::photos::models::{Photo, SizeVariantKind};
use crate::photos::repository as photo_repository;
use crate::photos::storage::PhotoStorage;

/// which of a photo's files an outcome is about
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileKind {
    Original,
    LivePhoto,
    Variant(SizeVariantKind),
}

impl FileKind {
    pub fn name(&self) -> &'static str {
        match self {
            FileKind::Original => "original",
            FileKind::LivePhoto => "livePhoto",
            FileKind::Variant(kind) => kind.name(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileFailure {
    /// nothing was at the path the database points to
    Missing,
    /// the file was there but the filesystem refused to remove it
    DeleteFailed,
}

impl FileFailure {
    pub fn name(&self) -> &'static str {
        match self {
            FileFailure::Missing => "missing",
            FileFailure::DeleteFailed => "deleteFailed",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FileOutcome {
    pub kind: FileKind,
    /// storage path of the file
    pub path: String,
    pub result: Result<(), FileFailure>,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PredeleteReport {
    /// another photo shares the checksum, so no files were touched
    pub duplicate: bool,
    /// one entry per file that was attempted, in the order they were attempted
    pub outcomes: Vec<FileOutcome>,
}

impl PredeleteReport {
    /// `true` if every attempted file was removed. A duplicate attempts nothing and always succeeds
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

/// Deletes the files of `photo` ahead of its record being removed.
///
/// The original (skipped if `keep_original`), the live photo, and every size variant the photo has are each
/// attempted in that order. A file that is missing or can't be removed is logged and recorded in the report,
/// but never stops the remaining files from being attempted.
///
/// If another photo shares the checksum, nothing is touched and the report is marked as a duplicate
pub fn predelete(
    photo: &Photo,
    keep_original: bool,
    storage: &impl PhotoStorage,
    con: &Connection,
) -> Result<PredeleteReport, rusqlite::Error> {
    if photo_repository::count_duplicates(&photo.checksum, photo.id, con)? > 0 {
        log::info!("{} is a duplicate!", photo.id);
        return Ok(PredeleteReport {
            duplicate: true,
            outcomes: Vec::new(),
        });
    }
    let mut targets: Vec<(FileKind, String)> = Vec::new();
    if !keep_original {
        targets.push((FileKind::Original, photo.original_path()));
    }
    if let Some(path) = photo.live_photo_path() {
        targets.push((FileKind::LivePhoto, path));
    }
    for kind in SizeVariantKind::ALL {
        if let Some(variant) = photo.size_variant(kind) {
            targets.push((FileKind::Variant(kind), variant.url.clone()));
        }
    }
    let outcomes = targets
        .into_iter()
        .map(|(kind, path)| {
            let result = remove(photo.id, kind, &path, storage);
            FileOutcome { kind, path, result }
        })
        .collect();
    Ok(PredeleteReport {
        duplicate: false,
        outcomes,
    })
}

fn remove(
    photo_id: u32,
    kind: FileKind,
    path: &str,
    storage: &impl PhotoStorage,
) -> Result<(), FileFailure> {
    if !storage.exists(path) {
        log::error!(
            "Could not find {} file of photo {photo_id} at {}",
            kind.name(),
            storage.absolute_path(path).display()
        );
        return Err(FileFailure::Missing);
    }
    storage.delete(path).map_err(|e| {
        log::error!(
            "Could not delete {} file of photo {photo_id} at {}. Error is {e:?}",
            kind.name(),
            storage.absolute_path(path).display()
        );
        FileFailure::DeleteFailed
    })
}
