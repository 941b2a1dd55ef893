use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::tokio::io::AsyncReadExt;
use rocket::State;

use crate::model::error::photo_errors::{DeletePhotoError, GetPhotoError, ImportPhotoError};
use crate::model::response::BasicMessage;
use crate::photos::models::{
    DeletePhotoReportApi, DeletePhotoResponse, FileFailureApi, GetPhotoResponse, ImportPhoto,
    ImportPhotoResponse, LivePhotoUpload, PhotoApi, PhotoUpload,
};
use crate::photos::service;
use crate::photos::storage::DiskStorage;

#[post("/", data = "<upload>")]
pub async fn upload_photo(
    upload: Form<PhotoUpload<'_>>,
    storage: &State<DiskStorage>,
) -> ImportPhotoResponse {
    let upload = upload.into_inner();
    let extension = match file_extension(&upload.file) {
        Some(ext) => ext,
        None => {
            return ImportPhotoResponse::BadRequest(BasicMessage::new(
                "The uploaded file needs a file extension.",
            ))
        }
    };
    let contents = match read_temp_file(&upload.file).await {
        Ok(contents) => contents,
        Err(e) => {
            log::error!("Failed to read uploaded file. Error is {e:?}");
            return ImportPhotoResponse::GenericError(BasicMessage::new(
                "Failed to read the uploaded file. Check server logs for details",
            ));
        }
    };
    let live_photo = match &upload.live_photo {
        Some(file) => {
            let extension = file_extension(file).unwrap_or_else(|| "mov".to_string());
            match read_temp_file(file).await {
                Ok(contents) => Some(LivePhotoUpload {
                    extension,
                    contents,
                }),
                Err(e) => {
                    log::error!("Failed to read uploaded live photo. Error is {e:?}");
                    return ImportPhotoResponse::GenericError(BasicMessage::new(
                        "Failed to read the uploaded live photo. Check server logs for details",
                    ));
                }
            }
        }
        None => None,
    };
    let title = upload
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| upload.file.name().map(|n| n.to_string()))
        .unwrap_or_else(|| "Untitled".to_string());
    let request = ImportPhoto {
        title,
        album_id: upload.album_id,
        owner_id: upload.owner_id.unwrap_or(0),
        extension,
        contents,
        live_photo,
    };
    match service::import_photo(request, storage.inner()) {
        Ok(photo) => ImportPhotoResponse::Success(Json::from(PhotoApi::from(photo))),
        Err(ImportPhotoError::MissingExtension) => ImportPhotoResponse::BadRequest(
            BasicMessage::new("The uploaded file needs a file extension."),
        ),
        Err(ImportPhotoError::AlbumNotFound) => ImportPhotoResponse::AlbumNotFound(
            BasicMessage::new("The album with the passed id could not be found."),
        ),
        Err(ImportPhotoError::InsufficientFilesystemPermissions) => {
            ImportPhotoResponse::InsufficientFilesystemPermissions(BasicMessage::new(
                "The server does not have permission to write to the photo directory.",
            ))
        }
        Err(_) => ImportPhotoResponse::GenericError(BasicMessage::new(
            "Failed to save photo. Check server logs for details",
        )),
    }
}

#[get("/<id>")]
pub fn get_photo(id: u32) -> GetPhotoResponse {
    match service::get_photo(id) {
        Ok(photo) => GetPhotoResponse::Success(Json::from(PhotoApi::from(photo))),
        Err(GetPhotoError::NotFound) => GetPhotoResponse::NotFound(BasicMessage::new(
            "The photo with the passed id could not be found.",
        )),
        Err(_) => GetPhotoResponse::GenericError(BasicMessage::new(
            "Failed to pull photo info from database. Check server logs for details",
        )),
    }
}

#[delete("/<id>?<keepOriginal>")]
#[allow(non_snake_case)]
pub fn delete_photo(
    id: u32,
    keepOriginal: Option<bool>,
    storage: &State<DiskStorage>,
) -> DeletePhotoResponse {
    match service::delete_photo(id, keepOriginal.unwrap_or(false), storage.inner()) {
        Ok(report) if report.all_succeeded() => DeletePhotoResponse::Success(()),
        Ok(report) => DeletePhotoResponse::PartialSuccess(Json::from(DeletePhotoReportApi {
            failed_files: report
                .failures()
                .filter_map(FileFailureApi::from_outcome)
                .collect(),
        })),
        Err(DeletePhotoError::NotFound) => DeletePhotoResponse::NotFound(BasicMessage::new(
            "The photo with the passed id could not be found.",
        )),
        Err(_) => DeletePhotoResponse::GenericError(BasicMessage::new(
            "Failed to delete photo. Check server logs for details",
        )),
    }
}

/// the lowercase extension of the uploaded file, taken from its name or else its content type
fn file_extension(file: &TempFile<'_>) -> Option<String> {
    let from_name = file
        .raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    from_name.or_else(|| {
        file.content_type()
            .and_then(|ct| ct.extension())
            .map(|ext| ext.as_str().to_lowercase())
    })
}

async fn read_temp_file(file: &TempFile<'_>) -> std::io::Result<Vec<u8>> {
    let mut contents = Vec::new();
    let mut reader = Box::pin(file.open().await?);
    reader.read_to_end(&mut contents).await?;
    Ok(contents)
}
