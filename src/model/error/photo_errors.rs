#[derive(PartialEq, Debug)]
pub enum GetPhotoError {
    NotFound,
    DbFailure,
}

#[derive(PartialEq, Debug)]
pub enum ImportPhotoError {
    /// the upload had no usable file extension
    MissingExtension,
    /// the album the photo should go into does not exist
    AlbumNotFound,
    /// the storage directory refused the write
    InsufficientFilesystemPermissions,
    /// any other failure writing to the storage directory
    FileSystemFailure,
    DbFailure,
}

#[derive(PartialEq, Debug)]
pub enum DeletePhotoError {
    /// photo reference not found in repository
    NotFound,
    /// couldn't remove the photo reference from the repository
    DbFailure,
}
