use rusqlite::Connection;

/// returns the current version of the database as a String
pub fn get_version(con: &Connection) -> Result<String, rusqlite::Error> {
    con.query_row(
        include_str!("../assets/queries/metadata/get_database_version.sql"),
        [],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::get_version;
    use crate::repository::open_connection;
    use crate::test::{cleanup, init_db_folder};

    #[test]
    fn new_database_is_at_version_1() {
        init_db_folder();
        let con = open_connection();
        let version = get_version(&con).unwrap();
        con.close().unwrap();
        assert_eq!("1", version);
        cleanup();
    }
}
