//! Nested-set bookkeeping for the album tree.
//!
//! Every album carries `lft` / `rgt` markers next to its `parent_id` pointer. A subtree is every album whose
//! markers lie between the markers of its root, which lets descendant queries run without recursion.
//! `parent_id` is the source of truth: whenever the two disagree, [`fix_tree`] rebuilds the markers from the pointers.
//!
//! Structural changes go through [`insert_node`], [`move_node`] and [`delete_node`] so the markers stay in step with
//! the pointers. Bulk updates of `parentId` bypass this and leave the tree broken until it is repaired.

use std::collections::{HashMap, HashSet};

use rusqlite::{params, Connection};

use crate::albums::models::TreeErrors;
use crate::albums::repository as album_repository;
use crate::model::error::album_errors::TreeError;

/// the parts of an album that matter to the tree structure
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TreeNode {
    pub id: u32,
    pub parent_id: Option<u32>,
    pub lft: i64,
    pub rgt: i64,
}

/// markers recomputed from the parent pointers
#[derive(Debug, PartialEq, Eq, Default)]
pub struct RebuiltTree {
    /// `(id, lft, rgt)` for every node, in the order the nodes were closed
    pub positions: Vec<(u32, i64, i64)>,
    /// nodes whose parent pointer could not be kept (missing parent, self-parent, or part of a cycle).
    /// They become top-level albums
    pub detached: Vec<u32>,
}

/// counts the four kinds of structural errors the tree can have
pub fn count_errors(con: &Connection) -> Result<TreeErrors, rusqlite::Error> {
    let count = |sql: &str| -> Result<u64, rusqlite::Error> {
        let value: i64 = con.query_row(sql, [], |row| row.get(0))?;
        Ok(value.max(0) as u64)
    };
    Ok(TreeErrors {
        oddness: count(include_str!(
            "../assets/queries/album/count_oddness_errors.sql"
        ))?,
        duplicates: count(include_str!(
            "../assets/queries/album/count_duplicate_errors.sql"
        ))?,
        wrong_parent: count(include_str!(
            "../assets/queries/album/count_wrong_parent_errors.sql"
        ))?,
        missing_parent: count(include_str!(
            "../assets/queries/album/count_missing_parent_errors.sql"
        ))?,
    })
}

pub fn is_broken(con: &Connection) -> Result<bool, rusqlite::Error> {
    Ok(count_errors(con)?.total() > 0)
}

/// Recomputes every album's markers from the `parent_id` pointers.
/// Albums whose parent pointer can't be honored are turned into top-level albums.
///
/// Returns the number of albums that were changed. Running this on a healthy tree changes nothing
pub fn fix_tree(con: &Connection) -> Result<usize, rusqlite::Error> {
    let nodes = get_tree_nodes(con)?;
    let rebuilt = compute_positions(&nodes);
    let current: HashMap<u32, (i64, i64)> = nodes.iter().map(|n| (n.id, (n.lft, n.rgt))).collect();
    let mut changed = 0;
    for id in rebuilt.detached.iter() {
        log::debug!("Album {id} has an unusable parent and is being moved to the top level");
        album_repository::update_parent(*id, None, con)?;
        changed += 1;
    }
    let mut pst = con.prepare(include_str!(
        "../assets/queries/album/update_album_position.sql"
    ))?;
    for (id, lft, rgt) in rebuilt.positions {
        if current.get(&id) != Some(&(lft, rgt)) {
            pst.execute(params![lft, rgt, id])?;
            changed += 1;
        }
    }
    Ok(changed)
}

/// Checks the tree and rebuilds it if anything is wrong.
///
/// Returns `true` if a repair was needed
pub fn repair_if_broken(con: &Connection) -> Result<bool, rusqlite::Error> {
    if !is_broken(con)? {
        return Ok(false);
    }
    let errors = count_errors(con)?;
    log::warn!("Tree is broken with {} errors.", errors.total());
    fix_tree(con)?;
    log::info!("Tree has been fixed.");
    Ok(true)
}

/// Makes room for a new last child of `parent_id` (or a new top-level album if `None`)
/// and returns the markers the new album must be inserted with
pub fn insert_node(parent_id: Option<u32>, con: &Connection) -> Result<(i64, i64), TreeError> {
    let position = match parent_id {
        Some(parent_id) => {
            let (_, parent_rgt) = get_position(parent_id, con)?;
            shift_positions(2, parent_rgt, con)?;
            parent_rgt
        }
        None => next_root_position(con)?,
    };
    Ok((position, position + 1))
}

/// Moves the album and its whole subtree so that it becomes the last child of `new_parent_id`
/// (or a top-level album if `None`).
///
/// Fails with [`TreeError::Cycle`] if the new parent is the album itself or one of its descendants
pub fn move_node(id: u32, new_parent_id: Option<u32>, con: &Connection) -> Result<(), TreeError> {
    let (lft, rgt) = get_position(id, con)?;
    if let Some(parent_id) = new_parent_id {
        // make sure the parent exists
        get_position(parent_id, con)?;
        if parent_id == id || album_repository::get_ancestor_ids(parent_id, con)?.contains(&id) {
            return Err(TreeError::Cycle);
        }
    }
    if lft <= 0 || rgt <= lft {
        // the markers are already unusable, so there's nothing to carry along. The next repair rebuilds them
        album_repository::update_parent(id, new_parent_id, con)?;
        return Ok(());
    }
    let width = rgt - lft + 1;
    // park the subtree on negative markers while the rest of the tree is shifted around it
    con.execute(
        include_str!("../assets/queries/album/negate_subtree_positions.sql"),
        params![lft, rgt],
    )?;
    shift_positions(-width, rgt + 1, con)?;
    let position = match new_parent_id {
        Some(parent_id) => get_position(parent_id, con)?.1,
        None => next_root_position(con)?,
    };
    shift_positions(width, position, con)?;
    con.execute(
        include_str!("../assets/queries/album/restore_negated_positions.sql"),
        params![position - lft],
    )?;
    album_repository::update_parent(id, new_parent_id, con)?;
    Ok(())
}

/// Deletes the album and every album beneath it (by parent pointer), then closes the gap they leave in the markers.
///
/// Returns the ids of every deleted album
pub fn delete_node(id: u32, con: &Connection) -> Result<Vec<u32>, TreeError> {
    let (lft, rgt) = get_position(id, con)?;
    let ids = album_repository::get_subtree_ids(id, con)?;
    album_repository::delete_albums(&ids, con)?;
    if lft > 0 && rgt > lft {
        shift_positions(-(rgt - lft + 1), rgt + 1, con)?;
    }
    Ok(ids)
}

/// Walks the parent pointers depth-first and hands out markers in visiting order.
/// Siblings keep their current relative order (by `lft`, then id)
pub fn compute_positions(nodes: &[TreeNode]) -> RebuiltTree {
    let ids: HashSet<u32> = nodes.iter().map(|n| n.id).collect();
    let mut sorted: Vec<&TreeNode> = nodes.iter().collect();
    sorted.sort_by_key(|n| (n.lft, n.id));
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut roots: Vec<u32> = Vec::new();
    let mut rebuilt = RebuiltTree::default();
    for node in sorted.iter() {
        match node.parent_id {
            None => roots.push(node.id),
            Some(parent_id) if parent_id != node.id && ids.contains(&parent_id) => {
                children.entry(parent_id).or_default().push(node.id)
            }
            Some(_) => {
                rebuilt.detached.push(node.id);
                roots.push(node.id);
            }
        }
    }
    let mut visited: HashSet<u32> = HashSet::new();
    let mut counter: i64 = 0;
    for root in roots {
        visit(root, &children, &mut visited, &mut counter, &mut rebuilt.positions);
    }
    // anything left over hangs off a cycle in the parent pointers
    for node in sorted {
        if !visited.contains(&node.id) {
            rebuilt.detached.push(node.id);
            visit(node.id, &children, &mut visited, &mut counter, &mut rebuilt.positions);
        }
    }
    rebuilt
}

fn visit(
    id: u32,
    children: &HashMap<u32, Vec<u32>>,
    visited: &mut HashSet<u32>,
    counter: &mut i64,
    positions: &mut Vec<(u32, i64, i64)>,
) {
    if !visited.insert(id) {
        return;
    }
    *counter += 1;
    let lft = *counter;
    if let Some(child_ids) = children.get(&id) {
        for child in child_ids {
            visit(*child, children, visited, counter, positions);
        }
    }
    *counter += 1;
    positions.push((id, lft, *counter));
}

fn get_tree_nodes(con: &Connection) -> Result<Vec<TreeNode>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/album/get_tree_nodes.sql"))?;
    let rows = pst.query_map([], |row| {
        Ok(TreeNode {
            id: row.get(0)?,
            parent_id: row.get(1)?,
            lft: row.get(2)?,
            rgt: row.get(3)?,
        })
    })?;
    rows.collect()
}

fn get_position(id: u32, con: &Connection) -> Result<(i64, i64), TreeError> {
    match album_repository::get_album(id, con) {
        Ok(album) => Ok((album.lft, album.rgt)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(TreeError::NodeNotFound),
        Err(e) => Err(TreeError::Db(e)),
    }
}

fn next_root_position(con: &Connection) -> Result<i64, rusqlite::Error> {
    con.query_row(
        include_str!("../assets/queries/album/get_next_root_position.sql"),
        [],
        |row| row.get(0),
    )
}

/// adds `delta` to every marker at or past `from`
fn shift_positions(delta: i64, from: i64, con: &Connection) -> Result<(), rusqlite::Error> {
    con.execute(
        include_str!("../assets/queries/album/shift_left_positions.sql"),
        params![delta, from],
    )?;
    con.execute(
        include_str!("../assets/queries/album/shift_right_positions.sql"),
        params![delta, from],
    )?;
    Ok(())
}
