pub mod album_errors;
pub mod photo_errors;
