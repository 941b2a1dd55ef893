#[derive(PartialEq, Debug)]
pub enum GetAlbumError {
    NotFound,
    DbFailure,
}

#[derive(PartialEq, Debug)]
pub enum CreateAlbumError {
    /// the title is blank or longer than the allowed length
    InvalidTitle,
    /// the requested parent album does not exist
    ParentNotFound,
    /// the database failed to save the album
    DbFailure,
}

#[derive(PartialEq, Debug)]
pub enum DeleteAlbumError {
    /// album not in the repository
    NotFound,
    /// database could not execute the query
    DbFailure,
}

#[derive(PartialEq, Debug)]
pub enum MergeAlbumsError {
    /// the target album does not exist
    NotFound,
    /// a source album is the target itself or one of its ancestors, which would put the target inside itself
    InvalidMergeTarget,
    /// the database failed part way through; nothing was committed
    DbFailure,
}

#[derive(PartialEq, Debug)]
pub enum TreeMaintenanceError {
    DbFailure,
}

/// errors from the nested-set bookkeeping functions in [`crate::albums::tree`]
#[derive(Debug)]
pub enum TreeError {
    /// the album to move or delete does not exist
    NodeNotFound,
    /// the requested parent is the node itself or one of its descendants
    Cycle,
    Db(rusqlite::Error),
}

impl From<rusqlite::Error> for TreeError {
    fn from(value: rusqlite::Error) -> Self {
        TreeError::Db(value)
    }
}
