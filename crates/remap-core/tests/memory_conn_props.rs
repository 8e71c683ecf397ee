// Property tests for the in-memory backend against the storage contract

use proptest::prelude::*;
use remap_core::{Conn, MemoryConn};

proptest! {
    #[test]
    fn prop_last_write_wins(key in "[a-z]{1,12}", writes in prop::collection::vec(".*", 1..8)) {
        let conn = MemoryConn::new();
        for value in &writes {
            conn.set_string(&key, value).unwrap();
        }
        prop_assert_eq!(&conn.get_string(&key).unwrap(), writes.last().unwrap());
        prop_assert_eq!(conn.len().unwrap(), 1);
    }

    #[test]
    fn prop_set_if_not_exists_keeps_first(key in "[a-z]{1,12}", first in ".*", second in ".*") {
        let conn = MemoryConn::new();
        prop_assert!(conn.set_if_not_exists(&key, &first).unwrap());
        prop_assert!(!conn.set_if_not_exists(&key, &second).unwrap());
        prop_assert_eq!(conn.get_string(&key).unwrap(), first);
    }

    #[test]
    fn prop_del_then_get_not_found(key in "[a-z]{1,12}", value in ".*") {
        let conn = MemoryConn::new();
        conn.set_string(&key, &value).unwrap();
        conn.del_string(&key).unwrap();
        conn.del_string(&key).unwrap();
        prop_assert!(conn.get_string(&key).unwrap_err().is_not_found());
    }
}
