use std::backtrace::Backtrace;

use rusqlite::{Connection, TransactionBehavior};

use crate::albums::models::{Album, AlbumApi, CreateAlbumRequest, TreeErrors, MAX_TITLE_LENGTH};
use crate::albums::repository as album_repository;
use crate::albums::tree;
use crate::model::error::album_errors::{
    CreateAlbumError, DeleteAlbumError, GetAlbumError, MergeAlbumsError, TreeError,
    TreeMaintenanceError,
};
use crate::photos::storage::PhotoStorage;
use crate::photos::{self, PhotoApi};
use crate::repository::open_connection;

/// retrieves the album with the passed id along with its direct child albums and photos
pub fn get_album(id: u32) -> Result<AlbumApi, GetAlbumError> {
    let con = open_connection();
    let album = match album_repository::get_album(id, &con) {
        Ok(album) => album,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Err(GetAlbumError::NotFound),
        Err(e) => {
            log::error!(
                "Failed to pull album {id} from the database! Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            return Err(GetAlbumError::DbFailure);
        }
    };
    let children = album_repository::get_child_albums(id, &con);
    let photos = photos::repository::get_photos_in_album(id, &con);
    match (children, photos) {
        (Ok(children), Ok(photos)) => {
            let mut response = AlbumApi::from(album);
            response.albums = children.into_iter().map(AlbumApi::from).collect();
            response.photos = photos.into_iter().map(PhotoApi::from).collect();
            Ok(response)
        }
        (Err(e), _) | (_, Err(e)) => {
            log::error!(
                "Failed to pull the contents of album {id} from the database! Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            Err(GetAlbumError::DbFailure)
        }
    }
}

/// creates a new album as the last child of the requested parent, or as a top-level album
pub fn create_album(request: &CreateAlbumRequest) -> Result<AlbumApi, CreateAlbumError> {
    let title = request.title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CreateAlbumError::InvalidTitle);
    }
    // the client can pass 0 for the parent id, in which case it needs to be translated to None for the database
    let parent_id = match request.parent_id {
        Some(0) | None => None,
        Some(id) => Some(id),
    };
    let mut con = open_connection();
    let created = con
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(TreeError::Db)
        .and_then(|tx| {
            let positions = tree::insert_node(parent_id, &tx)?;
            let id = album_repository::create_album(title, parent_id, request.owner_id, positions, &tx)?;
            let album = album_repository::get_album(id, &tx)?;
            tx.commit()?;
            Ok(album)
        });
    match created {
        Ok(album) => Ok(AlbumApi::from(album)),
        Err(TreeError::NodeNotFound) => Err(CreateAlbumError::ParentNotFound),
        Err(e) => {
            log::error!(
                "Failed to create album {title}! Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            Err(CreateAlbumError::DbFailure)
        }
    }
}

/// Deletes the album, every album beneath it, and every photo inside any of them.
///
/// Photo files that can't be removed are logged but don't stop the deletion
pub fn delete_album(id: u32, storage: &impl PhotoStorage) -> Result<(), DeleteAlbumError> {
    let mut con = open_connection();
    let tx = con
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| log_delete_failure(id, TreeError::Db(e)))?;
    match album_repository::get_album(id, &tx) {
        Ok(_) => {}
        Err(rusqlite::Error::QueryReturnedNoRows) => return Err(DeleteAlbumError::NotFound),
        Err(e) => return Err(log_delete_failure(id, TreeError::Db(e))),
    };
    let deleted = delete_album_contents(id, storage, &tx).and_then(|_| {
        tree::delete_node(id, &tx)?;
        Ok(())
    });
    if let Err(e) = deleted {
        return Err(log_delete_failure(id, e));
    }
    tx.commit().map_err(|e| log_delete_failure(id, TreeError::Db(e)))
}

/// Merges the content of the source albums (photos and sub-albums) into the target, then deletes the sources.
///
/// Everything beneath the target ends up owned by the target's owner, including albums and photos that were
/// already there. The whole merge runs in one transaction, so a failure leaves the tree untouched.
///
/// Source ids that don't exist are ignored. A source that is the target itself or one of its ancestors is refused
/// with [`MergeAlbumsError::InvalidMergeTarget`], because moving its children would put the target inside itself
pub fn merge_albums(target_id: u32, source_ids: &[u32]) -> Result<(), MergeAlbumsError> {
    let mut con = open_connection();
    let tx = con
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| log_merge_failure(target_id, TreeError::Db(e)))?;
    let target = match album_repository::get_album(target_id, &tx) {
        Ok(album) => album,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Err(MergeAlbumsError::NotFound),
        Err(e) => return Err(log_merge_failure(target_id, TreeError::Db(e))),
    };
    let ancestors = album_repository::get_ancestor_ids(target_id, &tx)
        .map_err(|e| log_merge_failure(target_id, TreeError::Db(e)))?;
    if source_ids
        .iter()
        .any(|id| *id == target_id || ancestors.contains(id))
    {
        log::warn!("Refusing to merge albums {source_ids:?} into their own descendant {target_id}");
        return Err(MergeAlbumsError::InvalidMergeTarget);
    }
    if let Err(e) = merge_into(&target, source_ids, &tx) {
        // dropping the transaction rolls everything back
        return Err(match e {
            TreeError::Cycle => MergeAlbumsError::InvalidMergeTarget,
            e => log_merge_failure(target_id, e),
        });
    }
    tx.commit()
        .map_err(|e| log_merge_failure(target_id, TreeError::Db(e)))
}

/// counts the structural errors currently in the album tree
pub fn tree_status() -> Result<TreeErrors, TreeMaintenanceError> {
    let con = open_connection();
    tree::count_errors(&con).map_err(|e| {
        log::error!(
            "Failed to check the album tree! Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        TreeMaintenanceError::DbFailure
    })
}

/// rebuilds the album tree if it is broken. Returns `true` if a repair was needed
pub fn repair_tree() -> Result<bool, TreeMaintenanceError> {
    let mut con = open_connection();
    let repaired = con
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .and_then(|tx| {
            let repaired = tree::repair_if_broken(&tx)?;
            tx.commit()?;
            Ok(repaired)
        });
    repaired.map_err(|e| {
        log::error!(
            "Failed to repair the album tree! Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        TreeMaintenanceError::DbFailure
    })
}

/// the body of [`merge_albums`], run after the target has been validated
fn merge_into(target: &Album, source_ids: &[u32], con: &Connection) -> Result<(), TreeError> {
    if !source_ids.is_empty() {
        // photos have no tree bookkeeping, so they can be moved in bulk
        photos::repository::move_photos_to_album(target.id, source_ids, con)?;
        // sub-albums have to be moved one at a time so their markers follow them
        for album in album_repository::get_albums_with_parent_in(source_ids, con)? {
            tree::move_node(album.id, Some(target.id), con)?;
        }
        for album in album_repository::get_albums_with_id_in(source_ids, con)? {
            tree::delete_node(album.id, con)?;
        }
    }
    tree::repair_if_broken(con)?;
    // the markers may have shifted (or been rebuilt), so the target has to be read again
    let target = album_repository::get_album(target.id, con)?;
    let bounds = (target.lft, target.rgt);
    album_repository::update_descendant_owner(target.owner_id, bounds, con)?;
    photos::repository::update_owner_in_subtree(target.owner_id, bounds, con)?;
    Ok(())
}

/// deletes every photo in the album's subtree, files included
fn delete_album_contents(
    id: u32,
    storage: &impl PhotoStorage,
    con: &Connection,
) -> Result<(), TreeError> {
    let album_ids = album_repository::get_subtree_ids(id, con)?;
    for photo in photos::repository::get_photos_in_albums(&album_ids, con)? {
        let report = photos::service::delete_photo_with_connection(&photo, false, storage, con)?;
        if !report.all_succeeded() {
            log::warn!(
                "Some files of photo {} could not be removed while deleting album {id}",
                photo.id
            );
        }
    }
    Ok(())
}

fn log_delete_failure(id: u32, error: TreeError) -> DeleteAlbumError {
    match error {
        TreeError::Db(e) => log::error!(
            "Failed to delete album {id}! Database error is {e:?}\n{}",
            Backtrace::force_capture()
        ),
        e => log::error!(
            "Failed to delete album {id}! Error is {e:?}\n{}",
            Backtrace::force_capture()
        ),
    };
    DeleteAlbumError::DbFailure
}

fn log_merge_failure(target_id: u32, error: TreeError) -> MergeAlbumsError {
    match error {
        TreeError::Db(e) => log::error!(
            "Failed to merge albums into {target_id}, rolling back! Database error is {e:?}\n{}",
            Backtrace::force_capture()
        ),
        e => log::error!(
            "Failed to merge albums into {target_id}, rolling back! Error is {e:?}\n{}",
            Backtrace::force_capture()
        ),
    };
    MergeAlbumsError::DbFailure
}
