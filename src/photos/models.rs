use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

use crate::model::response::{BasicMessage, NoContent};
use crate::photos::reaper::FileOutcome;

/// file extensions of camera raw formats. Originals of these go under `raw/` instead of `big/`
pub const RAW_EXTENSIONS: [&str; 8] = ["nef", "cr2", "cr3", "arw", "dng", "raf", "orf", "rw2"];

/// the value of [`Photo::photo_type`] for camera raw files
pub const RAW_TYPE: &str = "raw";

/// the derived renditions of a photo. The discriminant is what's stored in the database
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum SizeVariantKind {
    Thumb = 0,
    Thumb2x = 1,
    Small = 2,
    Small2x = 3,
    Medium = 4,
    Medium2x = 5,
}

impl SizeVariantKind {
    /// every kind, in the order files are cleaned up
    pub const ALL: [SizeVariantKind; 6] = [
        SizeVariantKind::Thumb,
        SizeVariantKind::Thumb2x,
        SizeVariantKind::Small,
        SizeVariantKind::Small2x,
        SizeVariantKind::Medium,
        SizeVariantKind::Medium2x,
    ];

    pub fn from_db(value: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| *kind as i64 == value)
    }

    /// the storage directory files of this kind live in
    pub fn directory(&self) -> &'static str {
        match self {
            SizeVariantKind::Thumb | SizeVariantKind::Thumb2x => "thumb",
            SizeVariantKind::Small | SizeVariantKind::Small2x => "small",
            SizeVariantKind::Medium | SizeVariantKind::Medium2x => "medium",
        }
    }

    pub fn is_2x(&self) -> bool {
        matches!(
            self,
            SizeVariantKind::Thumb2x | SizeVariantKind::Small2x | SizeVariantKind::Medium2x
        )
    }

    /// the name used for this kind in api responses and log messages
    pub fn name(&self) -> &'static str {
        match self {
            SizeVariantKind::Thumb => "thumb",
            SizeVariantKind::Thumb2x => "thumb2x",
            SizeVariantKind::Small => "small",
            SizeVariantKind::Small2x => "small2x",
            SizeVariantKind::Medium => "medium",
            SizeVariantKind::Medium2x => "medium2x",
        }
    }

    /// the storage path for a file of this kind belonging to a photo stored under `stem`
    pub fn url_for(&self, stem: &str) -> String {
        let suffix = if self.is_2x() { "@2x" } else { "" };
        format!("{}/{stem}{suffix}.jpeg", self.directory())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SizeVariant {
    pub kind: SizeVariantKind,
    pub width: u32,
    pub height: u32,
    /// storage path including the directory, e.g. `thumb/abc@2x.jpeg`
    pub url: String,
}

/// represents a row in the Photos table along with its size variants
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Photo {
    pub id: u32,
    pub title: String,
    /// `None` if the photo is unsorted
    pub album_id: Option<u32>,
    pub owner_id: u32,
    /// the mime type of the original, or [`RAW_TYPE`]
    pub photo_type: String,
    /// file name of the original, relative to `big/` or `raw/`
    pub url: String,
    /// file name of the live photo video, relative to `big/`
    pub live_photo_url: Option<String>,
    /// sha256 of the original, hex encoded
    pub checksum: String,
    pub file_size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub create_date: NaiveDateTime,
    pub size_variants: Vec<SizeVariant>,
}

impl Photo {
    pub fn is_raw(&self) -> bool {
        self.photo_type == RAW_TYPE
    }

    /// the storage path of the original file
    pub fn original_path(&self) -> String {
        let prefix = if self.is_raw() { "raw" } else { "big" };
        format!("{prefix}/{}", self.url)
    }

    /// the storage path of the live photo video, if there is one
    pub fn live_photo_path(&self) -> Option<String> {
        self.live_photo_url
            .as_ref()
            .map(|url| format!("big/{url}"))
    }

    pub fn size_variant(&self, kind: SizeVariantKind) -> Option<&SizeVariant> {
        self.size_variants.iter().find(|v| v.kind == kind)
    }
}

/// the data needed to import a new photo
pub struct ImportPhoto {
    pub title: String,
    /// `None` or `Some(0)` imports the photo as unsorted
    pub album_id: Option<u32>,
    pub owner_id: u32,
    /// lowercase extension of the uploaded file, without the dot
    pub extension: String,
    pub contents: Vec<u8>,
    pub live_photo: Option<LivePhotoUpload>,
}

/// the video half of a live photo
pub struct LivePhotoUpload {
    pub extension: String,
    pub contents: Vec<u8>,
}

#[derive(FromForm)]
pub struct PhotoUpload<'a> {
    pub file: TempFile<'a>,
    #[field(name = "livePhoto")]
    pub live_photo: Option<TempFile<'a>>,
    pub title: Option<String>,
    #[field(name = "albumId")]
    pub album_id: Option<u32>,
    #[field(name = "ownerId")]
    pub owner_id: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(crate = "rocket::serde")]
pub struct SizeVariantApi {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(crate = "rocket::serde")]
pub struct PhotoApi {
    pub id: u32,
    pub title: String,
    #[serde(rename = "albumId")]
    pub album_id: Option<u32>,
    #[serde(rename = "ownerId")]
    pub owner_id: u32,
    #[serde(rename = "type")]
    pub photo_type: String,
    pub url: String,
    #[serde(rename = "livePhotoUrl")]
    pub live_photo_url: Option<String>,
    pub checksum: String,
    #[serde(rename = "fileSize")]
    pub file_size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "dateCreated")]
    pub create_date: NaiveDateTime,
    /// keyed by variant name (`thumb`, `thumb2x`, ...). Missing variants are left out
    #[serde(rename = "sizeVariants")]
    pub size_variants: BTreeMap<String, SizeVariantApi>,
}

impl From<Photo> for PhotoApi {
    fn from(value: Photo) -> Self {
        let size_variants = value
            .size_variants
            .into_iter()
            .map(|v| {
                (
                    v.kind.name().to_string(),
                    SizeVariantApi {
                        width: v.width,
                        height: v.height,
                        url: v.url,
                    },
                )
            })
            .collect();
        Self {
            id: value.id,
            title: value.title,
            album_id: value.album_id,
            owner_id: value.owner_id,
            photo_type: value.photo_type,
            url: value.url,
            live_photo_url: value.live_photo_url,
            checksum: value.checksum,
            file_size: value.file_size,
            width: value.width,
            height: value.height,
            create_date: value.create_date,
            size_variants,
        }
    }
}

/// a single file that couldn't be removed when a photo was deleted
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct FileFailureApi {
    /// `original`, `livePhoto`, or a variant name
    pub kind: String,
    pub path: String,
    /// `missing` or `deleteFailed`
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct DeletePhotoReportApi {
    #[serde(rename = "failedFiles")]
    pub failed_files: Vec<FileFailureApi>,
}

impl FileFailureApi {
    /// returns `None` if the file was removed successfully
    pub fn from_outcome(outcome: &FileOutcome) -> Option<Self> {
        outcome.result.as_ref().err().map(|failure| FileFailureApi {
            kind: outcome.kind.name().to_string(),
            path: outcome.path.clone(),
            reason: failure.name().to_string(),
        })
    }
}

// ---------------------------------- responses

#[derive(Responder)]
pub enum GetPhotoResponse {
    #[response(status = 200)]
    Success(Json<PhotoApi>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum ImportPhotoResponse {
    #[response(status = 201, content_type = "json")]
    Success(Json<PhotoApi>),
    #[response(status = 400, content_type = "json")]
    BadRequest(Json<BasicMessage>),
    #[response(status = 404, content_type = "json")]
    AlbumNotFound(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
    #[response(status = 501, content_type = "json")]
    InsufficientFilesystemPermissions(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum DeletePhotoResponse {
    #[response(status = 204)]
    Success(NoContent),
    /// the record is gone but some of its files could not be removed
    #[response(status = 200, content_type = "json")]
    PartialSuccess(Json<DeletePhotoReportApi>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}
