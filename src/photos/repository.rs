use rusqlite::{params, Connection, OptionalExtension};

use crate::photos::models::{Photo, SizeVariant, SizeVariantKind};
use crate::repository::id_array;

/// the columns needed to insert a new photo
pub struct NewPhoto<'a> {
    pub title: &'a str,
    pub album_id: Option<u32>,
    pub owner_id: u32,
    pub photo_type: &'a str,
    pub url: &'a str,
    pub live_photo_url: Option<&'a str>,
    pub checksum: &'a str,
    pub file_size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// retrieves the photo along with all of its size variants
pub fn get_photo(id: u32, con: &Connection) -> Result<Photo, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/photo/get_photo_by_id.sql"))?;
    let photo = pst.query_row([id], map_photo)?;
    with_variants(photo, con)
}

pub fn get_photos_in_album(album_id: u32, con: &Connection) -> Result<Vec<Photo>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/photo/get_photos_in_album.sql"
    ))?;
    let rows = pst.query_map([album_id], map_photo)?;
    rows.map(|photo| with_variants(photo?, con)).collect()
}

pub fn get_photos_in_albums(
    album_ids: &[u32],
    con: &Connection,
) -> Result<Vec<Photo>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/photo/get_photos_in_albums.sql"
    ))?;
    let rows = pst.query_map([id_array(album_ids)], map_photo)?;
    rows.map(|photo| with_variants(photo?, con)).collect()
}

/// returns the oldest photo with the passed checksum, if any
pub fn get_photo_by_checksum(
    checksum: &str,
    con: &Connection,
) -> Result<Option<Photo>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/photo/get_photo_by_checksum.sql"
    ))?;
    match pst.query_row([checksum], map_photo).optional()? {
        Some(photo) => Ok(Some(with_variants(photo, con)?)),
        None => Ok(None),
    }
}

/// counts the photos other than `id` that share `checksum`
pub fn count_duplicates(checksum: &str, id: u32, con: &Connection) -> Result<u32, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/photo/count_duplicates.sql"))?;
    pst.query_row(params![checksum, id], |row| row.get(0))
}

pub fn create_photo(photo: &NewPhoto, con: &Connection) -> Result<u32, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/photo/create_photo.sql"))?;
    let id = pst.insert(params![
        photo.title,
        photo.album_id,
        photo.owner_id,
        photo.photo_type,
        photo.url,
        photo.live_photo_url,
        photo.checksum,
        photo.file_size as i64,
        photo.width,
        photo.height
    ])?;
    Ok(id as u32)
}

pub fn create_size_variant(
    photo_id: u32,
    variant: &SizeVariant,
    con: &Connection,
) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/photo/create_size_variant.sql"
    ))?;
    pst.execute(params![
        photo_id,
        variant.kind as i64,
        variant.width,
        variant.height,
        variant.url
    ])?;
    Ok(())
}

/// moves every photo in one of the source albums into the target album
pub fn move_photos_to_album(
    target_id: u32,
    source_ids: &[u32],
    con: &Connection,
) -> Result<usize, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/photo/move_photos_to_album.sql"
    ))?;
    pst.execute(params![target_id, id_array(source_ids)])
}

/// sets the owner of every photo in an album inside the passed position markers, bounds included
pub fn update_owner_in_subtree(
    owner_id: u32,
    (lft, rgt): (i64, i64),
    con: &Connection,
) -> Result<usize, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/photo/update_owner_in_subtree.sql"
    ))?;
    pst.execute(params![owner_id, lft, rgt])
}

/// deletes the photo record and its size variant rows. Files are not touched
pub fn delete_photo(id: u32, con: &Connection) -> Result<(), rusqlite::Error> {
    delete_size_variants(id, con)?;
    let mut pst = con.prepare(include_str!("../assets/queries/photo/delete_photo.sql"))?;
    pst.execute([id])?;
    Ok(())
}

pub fn delete_size_variants(photo_id: u32, con: &Connection) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/photo/delete_size_variants.sql"
    ))?;
    pst.execute([photo_id])?;
    Ok(())
}

fn get_size_variants(photo_id: u32, con: &Connection) -> Result<Vec<SizeVariant>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/photo/get_size_variants.sql"
    ))?;
    let rows = pst.query_map([photo_id], |row| {
        let kind: i64 = row.get(0)?;
        Ok((kind, row.get(1)?, row.get(2)?, row.get(3)?))
    })?;
    let mut variants = Vec::new();
    for row in rows {
        let (kind, width, height, url) = row?;
        match SizeVariantKind::from_db(kind) {
            Some(kind) => variants.push(SizeVariant {
                kind,
                width,
                height,
                url,
            }),
            None => log::warn!("Photo {photo_id} has a size variant of unknown kind {kind}"),
        }
    }
    Ok(variants)
}

fn with_variants(mut photo: Photo, con: &Connection) -> Result<Photo, rusqlite::Error> {
    photo.size_variants = get_size_variants(photo.id, con)?;
    Ok(photo)
}

fn map_photo(row: &rusqlite::Row) -> Result<Photo, rusqlite::Error> {
    let file_size: i64 = row.get(8)?;
    Ok(Photo {
        id: row.get(0)?,
        title: row.get(1)?,
        album_id: row.get(2)?,
        owner_id: row.get(3)?,
        photo_type: row.get(4)?,
        url: row.get(5)?,
        live_photo_url: row.get(6)?,
        checksum: row.get(7)?,
        file_size: file_size.max(0) as u64,
        width: row.get(9)?,
        height: row.get(10)?,
        create_date: row.get(11)?,
        size_variants: Vec::new(),
    })
}
