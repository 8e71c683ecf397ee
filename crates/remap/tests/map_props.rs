// Property tests: any serde value survives a set/get through either backend

use proptest::prelude::*;
use remap::{Map, MemoryConn, SqliteConn};
use std::collections::BTreeMap;

fn maps() -> Vec<Map> {
    let sqlite = SqliteConn::open_in_memory().unwrap();
    vec![
        Map::new(Box::new(MemoryConn::new())),
        remap::adopt(&sqlite).unwrap(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_string_values_round_trip(key in "\\PC{0,32}", value in ".*") {
        for map in maps() {
            map.set(&key, &value).unwrap();
            prop_assert_eq!(map.get::<String>(&key).unwrap(), value.clone());
        }
    }

    #[test]
    fn prop_last_write_wins(key in "[a-z]{1,8}", values in prop::collection::vec(any::<i64>(), 1..8)) {
        for map in maps() {
            for v in &values {
                map.set(&key, v).unwrap();
            }
            prop_assert_eq!(map.get::<i64>(&key).unwrap(), *values.last().unwrap());
        }
    }

    #[test]
    fn prop_nested_documents_round_trip(
        doc in prop::collection::btree_map("[a-z]{1,6}", prop::collection::vec(any::<u32>(), 0..4), 0..6)
    ) {
        for map in maps() {
            map.set("doc", &doc).unwrap();
            prop_assert_eq!(map.get::<BTreeMap<String, Vec<u32>>>("doc").unwrap(), doc.clone());
        }
    }

    #[test]
    fn prop_delete_then_get_misses(key in "[a-z]{1,8}", value in any::<bool>()) {
        for map in maps() {
            map.set(&key, &value).unwrap();
            map.del(&key).unwrap();
            prop_assert!(map.get::<bool>(&key).unwrap_err().is_not_found());
        }
    }
}
