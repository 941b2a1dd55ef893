use rusqlite::{params, Connection};

use crate::albums::models::Album;
use crate::repository::id_array;

pub fn get_album(id: u32, con: &Connection) -> Result<Album, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/album/get_album_by_id.sql"))?;
    pst.query_row([id], map_album)
}

/// returns the direct children of the album with the passed id, in tree order
pub fn get_child_albums(id: u32, con: &Connection) -> Result<Vec<Album>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/album/get_child_albums.sql"))?;
    let rows = pst.query_map([id], map_album)?;
    rows.collect()
}

/// returns every album whose parent is one of the passed ids
pub fn get_albums_with_parent_in(
    parent_ids: &[u32],
    con: &Connection,
) -> Result<Vec<Album>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/album/get_albums_with_parent_in.sql"
    ))?;
    let rows = pst.query_map([id_array(parent_ids)], map_album)?;
    rows.collect()
}

/// returns every album with one of the passed ids. Ids without an album are skipped
pub fn get_albums_with_id_in(ids: &[u32], con: &Connection) -> Result<Vec<Album>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/album/get_albums_with_id_in.sql"
    ))?;
    let rows = pst.query_map([id_array(ids)], map_album)?;
    rows.collect()
}

/// inserts an album row with already-computed position markers.
/// Callers are expected to go through [`crate::albums::tree::insert_node`] to get those markers
pub fn create_album(
    title: &str,
    parent_id: Option<u32>,
    owner_id: u32,
    (lft, rgt): (i64, i64),
    con: &Connection,
) -> Result<u32, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/album/create_album.sql"))?;
    let id = pst.insert(params![title, parent_id, owner_id, lft, rgt])?;
    Ok(id as u32)
}

/// changes only the parent pointer. Position markers are left alone
pub fn update_parent(id: u32, parent_id: Option<u32>, con: &Connection) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/album/update_album_parent.sql"
    ))?;
    pst.execute(params![parent_id, id])?;
    Ok(())
}

/// returns the ids of every ancestor of the album, following `parent_id` pointers rather than position markers
pub fn get_ancestor_ids(id: u32, con: &Connection) -> Result<Vec<u32>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/album/get_ancestor_ids.sql"))?;
    let rows = pst.query_map([id], |row| row.get(0))?;
    rows.collect()
}

/// returns the id of the album and the ids of all its descendants, following `parent_id` pointers
pub fn get_subtree_ids(id: u32, con: &Connection) -> Result<Vec<u32>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/album/get_subtree_ids.sql"))?;
    let rows = pst.query_map([id], |row| row.get(0))?;
    rows.collect()
}

/// deletes the album rows only. Photos inside them must be handled first
pub fn delete_albums(ids: &[u32], con: &Connection) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/album/delete_albums_with_id_in.sql"
    ))?;
    pst.execute([id_array(ids)])?;
    Ok(())
}

/// sets the owner of every album strictly inside the passed position markers
pub fn update_descendant_owner(
    owner_id: u32,
    (lft, rgt): (i64, i64),
    con: &Connection,
) -> Result<usize, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/album/update_descendant_owner.sql"
    ))?;
    pst.execute(params![owner_id, lft, rgt])
}

fn map_album(row: &rusqlite::Row) -> Result<Album, rusqlite::Error> {
    Ok(Album {
        id: row.get(0)?,
        title: row.get(1)?,
        parent_id: row.get(2)?,
        owner_id: row.get(3)?,
        lft: row.get(4)?,
        rgt: row.get(5)?,
        create_date: row.get(6)?,
    })
}
