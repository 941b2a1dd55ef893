use chrono::NaiveDateTime;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};

use crate::model::response::{BasicMessage, NoContent};
use crate::photos::PhotoApi;

/// the longest title an album may have
pub const MAX_TITLE_LENGTH: usize = 100;

/// represents a row in the Albums table.
///
/// `lft` and `rgt` are the nested-set position markers. They are derived from `parent_id` and are
/// maintained through [`crate::albums::tree`], never written directly
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Album {
    pub id: u32,
    pub title: String,
    /// `None` for a top-level album
    pub parent_id: Option<u32>,
    pub owner_id: u32,
    pub lft: i64,
    pub rgt: i64,
    pub create_date: NaiveDateTime,
}

/// the result of counting structural errors in the album tree
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct TreeErrors {
    /// albums whose markers can't describe any node (`lft >= rgt`, or an even width)
    pub oddness: u64,
    /// pairs of albums sharing a marker value
    pub duplicates: u64,
    /// albums whose markers put them under a different node than `parent_id` says
    #[serde(rename = "wrongParent")]
    pub wrong_parent: u64,
    /// albums whose `parent_id` points to an album that doesn't exist
    #[serde(rename = "missingParent")]
    pub missing_parent: u64,
}

impl TreeErrors {
    pub fn total(&self) -> u64 {
        self.oddness + self.duplicates + self.wrong_parent + self.missing_parent
    }
}

#[derive(Deserialize, Debug)]
pub struct CreateAlbumRequest {
    pub title: String,
    /// `None` or `0` creates a top-level album
    #[serde(rename = "parentId")]
    pub parent_id: Option<u32>,
    #[serde(rename = "ownerId", default)]
    pub owner_id: u32,
}

#[derive(Deserialize, Debug)]
pub struct MergeAlbumsRequest {
    /// the albums whose contents are moved into the target before they are deleted
    #[serde(rename = "albumIds")]
    pub album_ids: Vec<u32>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct AlbumApi {
    pub id: u32,
    pub title: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<u32>,
    #[serde(rename = "ownerId")]
    pub owner_id: u32,
    #[serde(rename = "dateCreated")]
    pub create_date: NaiveDateTime,
    /// direct child albums. Their own children are not populated
    pub albums: Vec<AlbumApi>,
    /// photos directly inside this album
    pub photos: Vec<PhotoApi>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct TreeFixResponse {
    /// `true` if the tree was broken and has been rebuilt
    pub fixed: bool,
}

impl From<Album> for AlbumApi {
    fn from(value: Album) -> Self {
        Self {
            id: value.id,
            title: value.title,
            parent_id: value.parent_id,
            owner_id: value.owner_id,
            create_date: value.create_date,
            albums: Vec::new(),
            photos: Vec::new(),
        }
    }
}

// ---------------------------------- responses

#[derive(Responder)]
pub enum GetAlbumResponse {
    #[response(status = 200)]
    Success(Json<AlbumApi>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum CreateAlbumResponse {
    #[response(status = 201, content_type = "json")]
    Success(Json<AlbumApi>),
    #[response(status = 400, content_type = "json")]
    BadRequest(Json<BasicMessage>),
    #[response(status = 404, content_type = "json")]
    ParentNotFound(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum DeleteAlbumResponse {
    #[response(status = 204)]
    Success(NoContent),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum MergeAlbumsResponse {
    #[response(status = 204)]
    Success(NoContent),
    #[response(status = 400, content_type = "json")]
    InvalidMergeTarget(Json<BasicMessage>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum TreeStatusResponse {
    #[response(status = 200)]
    Success(Json<TreeErrors>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum TreeFixResponder {
    #[response(status = 200)]
    Success(Json<TreeFixResponse>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}
