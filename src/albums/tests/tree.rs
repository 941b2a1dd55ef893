mod insert_node_tests {
    use crate::test::*;

    #[test]
    fn insert_keeps_markers_in_step_with_parents() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        create_album_db_entry("c", Some(1), 0);
        create_album_db_entry("d", None, 0);
        assert_eq!(
            vec![
                (1, None, 1, 6),
                (2, Some(1), 2, 3),
                (3, Some(1), 4, 5),
                (4, None, 7, 8)
            ],
            album_rows()
        );
        assert!(!is_tree_broken());
        cleanup();
    }

    #[test]
    fn insert_into_missing_parent_fails() {
        use crate::albums::tree::insert_node;
        use crate::model::error::album_errors::TreeError;
        use crate::repository::open_connection;

        init_db_folder();
        let con = open_connection();
        let res = insert_node(Some(12), &con);
        con.close().unwrap();
        assert!(matches!(res, Err(TreeError::NodeNotFound)));
        cleanup();
    }
}

mod move_node_tests {
    use crate::albums::tree::move_node;
    use crate::model::error::album_errors::TreeError;
    use crate::repository::open_connection;
    use crate::test::*;

    #[test]
    fn move_node_to_another_parent() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        create_album_db_entry("c", Some(1), 0);
        create_album_db_entry("d", None, 0);
        let con = open_connection();
        move_node(2, Some(4), &con).unwrap();
        con.close().unwrap();
        assert_eq!(
            vec![
                (1, None, 1, 4),
                (2, Some(4), 6, 7),
                (3, Some(1), 2, 3),
                (4, None, 5, 8)
            ],
            album_rows()
        );
        assert!(!is_tree_broken());
        cleanup();
    }

    #[test]
    fn move_node_carries_subtree() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        create_album_db_entry("c", Some(2), 0);
        create_album_db_entry("d", None, 0);
        let con = open_connection();
        move_node(2, Some(4), &con).unwrap();
        con.close().unwrap();
        let rows = album_rows();
        assert_eq!(Some(4), rows[1].1);
        assert_eq!(Some(2), rows[2].1);
        assert!(!is_tree_broken());
        cleanup();
    }

    #[test]
    fn move_node_to_top_level() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        let con = open_connection();
        move_node(2, None, &con).unwrap();
        con.close().unwrap();
        assert_eq!(vec![(1, None, 1, 2), (2, None, 3, 4)], album_rows());
        cleanup();
    }

    #[test]
    fn move_node_under_own_descendant_is_refused() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        create_album_db_entry("c", Some(2), 0);
        let before = album_rows();
        let con = open_connection();
        let res = move_node(1, Some(3), &con);
        con.close().unwrap();
        assert!(matches!(res, Err(TreeError::Cycle)));
        assert_eq!(before, album_rows());
        cleanup();
    }

    #[test]
    fn move_node_under_itself_is_refused() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        let con = open_connection();
        let res = move_node(1, Some(1), &con);
        con.close().unwrap();
        assert!(matches!(res, Err(TreeError::Cycle)));
        cleanup();
    }

    #[test]
    fn move_missing_node_fails() {
        init_db_folder();
        let con = open_connection();
        let res = move_node(1, None, &con);
        con.close().unwrap();
        assert!(matches!(res, Err(TreeError::NodeNotFound)));
        cleanup();
    }
}

mod delete_node_tests {
    use crate::albums::tree::delete_node;
    use crate::repository::open_connection;
    use crate::test::*;

    #[test]
    fn delete_node_removes_subtree_and_closes_gap() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        create_album_db_entry("c", None, 0);
        let con = open_connection();
        let mut deleted = delete_node(1, &con).unwrap();
        con.close().unwrap();
        deleted.sort();
        assert_eq!(vec![1, 2], deleted);
        assert_eq!(vec![(3, None, 1, 2)], album_rows());
        assert!(!is_tree_broken());
        cleanup();
    }
}

mod count_errors_tests {
    use crate::albums::models::TreeErrors;
    use crate::albums::tree::count_errors;
    use crate::repository::open_connection;
    use crate::test::*;

    fn errors() -> TreeErrors {
        let con = open_connection();
        let errors = count_errors(&con).unwrap();
        con.close().unwrap();
        errors
    }

    #[test]
    fn healthy_tree_has_no_errors() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        assert_eq!(TreeErrors::default(), errors());
        cleanup();
    }

    #[test]
    fn counts_oddness() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        set_album_position(1, 5, 3);
        assert_eq!(
            TreeErrors {
                oddness: 1,
                ..Default::default()
            },
            errors()
        );
        cleanup();
    }

    #[test]
    fn counts_duplicates() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", None, 0);
        set_album_position(2, 1, 2);
        assert_eq!(1, errors().duplicates);
        cleanup();
    }

    #[test]
    fn counts_wrong_parent() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", None, 0);
        set_album_parent(2, Some(1));
        assert_eq!(
            TreeErrors {
                wrong_parent: 1,
                ..Default::default()
            },
            errors()
        );
        cleanup();
    }

    #[test]
    fn counts_missing_parent() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        set_album_parent(2, Some(99));
        assert_eq!(
            TreeErrors {
                missing_parent: 1,
                ..Default::default()
            },
            errors()
        );
        cleanup();
    }
}

mod fix_tree_tests {
    use crate::albums::tree::{fix_tree, repair_if_broken};
    use crate::repository::open_connection;
    use crate::test::*;

    #[test]
    fn fix_tree_rebuilds_from_parents_and_is_idempotent() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        create_album_db_entry("c", Some(1), 0);
        set_album_parent(3, Some(2));
        assert!(is_tree_broken());
        let con = open_connection();
        assert_eq!(2, fix_tree(&con).unwrap());
        assert_eq!(0, fix_tree(&con).unwrap());
        con.close().unwrap();
        assert_eq!(
            vec![(1, None, 1, 6), (2, Some(1), 2, 5), (3, Some(2), 3, 4)],
            album_rows()
        );
        assert!(!is_tree_broken());
        cleanup();
    }

    #[test]
    fn fix_tree_moves_orphans_to_top_level() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        set_album_parent(2, Some(42));
        let con = open_connection();
        fix_tree(&con).unwrap();
        con.close().unwrap();
        assert_eq!(vec![(1, None, 1, 2), (2, None, 3, 4)], album_rows());
        assert!(!is_tree_broken());
        cleanup();
    }

    #[test]
    fn fix_tree_breaks_parent_cycles() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        set_album_parent(1, Some(2));
        let con = open_connection();
        fix_tree(&con).unwrap();
        con.close().unwrap();
        assert_eq!(vec![(1, None, 1, 4), (2, Some(1), 2, 3)], album_rows());
        assert!(!is_tree_broken());
        cleanup();
    }

    #[test]
    fn fix_tree_repairs_scrambled_markers() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        create_album_db_entry("c", None, 0);
        set_album_position(1, 0, 0);
        set_album_position(2, 7, 7);
        assert!(is_tree_broken());
        let con = open_connection();
        fix_tree(&con).unwrap();
        con.close().unwrap();
        assert!(!is_tree_broken());
        cleanup();
    }

    #[test]
    fn repair_if_broken_only_repairs_broken_trees() {
        init_db_folder();
        create_album_db_entry("a", None, 0);
        create_album_db_entry("b", Some(1), 0);
        let con = open_connection();
        assert!(!repair_if_broken(&con).unwrap());
        set_album_parent(2, Some(7));
        assert!(repair_if_broken(&con).unwrap());
        assert!(!repair_if_broken(&con).unwrap());
        con.close().unwrap();
        cleanup();
    }
}

mod compute_positions_tests {
    use crate::albums::tree::{compute_positions, TreeNode};

    fn node(id: u32, parent_id: Option<u32>, lft: i64) -> TreeNode {
        TreeNode {
            id,
            parent_id,
            lft,
            rgt: lft + 1,
        }
    }

    #[test]
    fn children_are_nested_in_their_parent() {
        let rebuilt = compute_positions(&[node(2, Some(1), 0), node(1, None, 0), node(3, Some(1), 0)]);
        assert_eq!(vec![(2, 2, 3), (3, 4, 5), (1, 1, 6)], rebuilt.positions);
        assert!(rebuilt.detached.is_empty());
    }

    #[test]
    fn siblings_keep_their_order() {
        let rebuilt = compute_positions(&[node(1, None, 1), node(2, Some(1), 9), node(3, Some(1), 4)]);
        assert_eq!(vec![(3, 2, 3), (2, 4, 5), (1, 1, 6)], rebuilt.positions);
    }

    #[test]
    fn self_parent_is_detached() {
        let rebuilt = compute_positions(&[node(1, Some(1), 0)]);
        assert_eq!(vec![1], rebuilt.detached);
        assert_eq!(vec![(1, 1, 2)], rebuilt.positions);
    }

    #[test]
    fn empty_tree() {
        let rebuilt = compute_positions(&[]);
        assert!(rebuilt.positions.is_empty());
        assert!(rebuilt.detached.is_empty());
    }
}
