mod get_album_tests {
    use crate::albums::repository::{get_album, get_child_albums};
    use crate::repository::open_connection;
    use crate::test::*;

    #[test]
    fn get_album_found() {
        init_db_folder();
        create_album_db_entry("test", None, 3);
        let con = open_connection();
        let album = get_album(1, &con).unwrap();
        con.close().unwrap();
        assert_eq!("test", album.title);
        assert_eq!(None, album.parent_id);
        assert_eq!(3, album.owner_id);
        assert_eq!((1, 2), (album.lft, album.rgt));
        cleanup();
    }

    #[test]
    fn get_album_not_found() {
        init_db_folder();
        let con = open_connection();
        let res = get_album(1, &con);
        con.close().unwrap();
        assert_eq!(Err(rusqlite::Error::QueryReturnedNoRows), res);
        cleanup();
    }

    #[test]
    fn get_child_albums_in_tree_order() {
        init_db_folder();
        create_album_db_entry("parent", None, 0);
        create_album_db_entry("first", Some(1), 0);
        create_album_db_entry("second", Some(1), 0);
        create_album_db_entry("grandchild", Some(2), 0);
        let con = open_connection();
        let titles: Vec<String> = get_child_albums(1, &con)
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        con.close().unwrap();
        assert_eq!(vec!["first".to_string(), "second".to_string()], titles);
        cleanup();
    }
}

mod ancestor_tests {
    use crate::albums::repository::{get_ancestor_ids, get_subtree_ids};
    use crate::repository::open_connection;
    use crate::test::*;

    #[test]
    fn get_ancestor_ids_walks_to_the_root() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        create_album_db_entry("c", Some(2), 0);
        let con = open_connection();
        let mut ids = get_ancestor_ids(3, &con).unwrap();
        con.close().unwrap();
        ids.sort();
        assert_eq!(vec![1, 2], ids);
        cleanup();
    }

    #[test]
    fn get_ancestor_ids_survives_cycles() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        set_album_parent(1, Some(2));
        let con = open_connection();
        let ids = get_ancestor_ids(2, &con).unwrap();
        con.close().unwrap();
        assert_eq!(vec![1], ids);
        cleanup();
    }

    #[test]
    fn get_subtree_ids_includes_self() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        create_album_db_entry("c", Some(2), 0);
        create_album_db_entry("d", None, 0);
        let con = open_connection();
        let mut ids = get_subtree_ids(2, &con).unwrap();
        con.close().unwrap();
        ids.sort();
        assert_eq!(vec![2, 3], ids);
        cleanup();
    }
}
