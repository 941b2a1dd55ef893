use rocket::serde::json::Json;
use rocket::State;

use crate::albums::models::{
    CreateAlbumRequest, CreateAlbumResponse, DeleteAlbumResponse, GetAlbumResponse,
    MergeAlbumsRequest, MergeAlbumsResponse, TreeFixResponder, TreeFixResponse, TreeStatusResponse,
};
use crate::albums::service;
use crate::model::error::album_errors::{
    CreateAlbumError, DeleteAlbumError, GetAlbumError, MergeAlbumsError,
};
use crate::model::response::BasicMessage;
use crate::photos::storage::DiskStorage;

#[get("/<id>")]
pub fn get_album(id: u32) -> GetAlbumResponse {
    match service::get_album(id) {
        Ok(album) => GetAlbumResponse::Success(Json::from(album)),
        Err(GetAlbumError::NotFound) => GetAlbumResponse::NotFound(BasicMessage::new(
            "The album with the passed id could not be found.",
        )),
        Err(_) => GetAlbumResponse::GenericError(BasicMessage::new(
            "Failed to pull album info from database. Check server logs for details",
        )),
    }
}

#[post("/", data = "<album>")]
pub fn create_album(album: Json<CreateAlbumRequest>) -> CreateAlbumResponse {
    match service::create_album(&album.into_inner()) {
        Ok(album) => CreateAlbumResponse::Success(Json::from(album)),
        Err(CreateAlbumError::InvalidTitle) => CreateAlbumResponse::BadRequest(BasicMessage::new(
            "Album title must be between 1 and 100 characters.",
        )),
        Err(CreateAlbumError::ParentNotFound) => CreateAlbumResponse::ParentNotFound(
            BasicMessage::new("The parent album with the passed id could not be found."),
        ),
        Err(_) => CreateAlbumResponse::GenericError(BasicMessage::new(
            "Failed to create album. Check server logs for details",
        )),
    }
}

#[delete("/<id>")]
pub fn delete_album(id: u32, storage: &State<DiskStorage>) -> DeleteAlbumResponse {
    match service::delete_album(id, storage.inner()) {
        Ok(()) => DeleteAlbumResponse::Success(()),
        Err(DeleteAlbumError::NotFound) => DeleteAlbumResponse::NotFound(BasicMessage::new(
            "The album with the passed id could not be found.",
        )),
        Err(_) => DeleteAlbumResponse::GenericError(BasicMessage::new(
            "Failed to delete album. Check server logs for details",
        )),
    }
}

#[post("/<id>/merge", data = "<request>")]
pub fn merge_albums(id: u32, request: Json<MergeAlbumsRequest>) -> MergeAlbumsResponse {
    match service::merge_albums(id, &request.album_ids) {
        Ok(()) => MergeAlbumsResponse::Success(()),
        Err(MergeAlbumsError::InvalidMergeTarget) => MergeAlbumsResponse::InvalidMergeTarget(
            BasicMessage::new("An album cannot be merged into itself or one of its descendants."),
        ),
        Err(MergeAlbumsError::NotFound) => MergeAlbumsResponse::NotFound(BasicMessage::new(
            "The album with the passed id could not be found.",
        )),
        Err(_) => MergeAlbumsResponse::GenericError(BasicMessage::new(
            "Failed to merge albums. Check server logs for details",
        )),
    }
}

#[get("/tree")]
pub fn tree_status() -> TreeStatusResponse {
    match service::tree_status() {
        Ok(errors) => TreeStatusResponse::Success(Json::from(errors)),
        Err(_) => TreeStatusResponse::GenericError(BasicMessage::new(
            "Failed to check the album tree. Check server logs for details",
        )),
    }
}

#[post("/tree/fix")]
pub fn fix_tree() -> TreeFixResponder {
    match service::repair_tree() {
        Ok(fixed) => TreeFixResponder::Success(Json::from(TreeFixResponse { fixed })),
        Err(_) => TreeFixResponder::GenericError(BasicMessage::new(
            "Failed to repair the album tree. Check server logs for details",
        )),
    }
}
