#![no_main]
use libfuzzer_sys::fuzz_target;

use record_index::{Btree, BtreeConfig};
use std::collections::BTreeMap;

fuzz_target!(|data: (Vec<(bool, u32, u32)>, u8)| {
    let order = (data.1 as usize).max(3);
    let mut m = BTreeMap::default();
    let mut fixture = Btree::with_config(BtreeConfig::default().order(order)).unwrap();

    for (insert, key, value) in data.0 {
        if insert {
            assert_eq!(m.insert(key, value), fixture.put(key, value));
        } else {
            assert_eq!(m.remove(&key), fixture.delete(&key));
        }
    }

    // Check len() function
    assert_eq!(m.len(), fixture.len());
    fixture.check_invariants().unwrap();

    // get query for each entry
    for (k, v1) in m.iter() {
        assert!(fixture.contains_key(k));
        assert_eq!(Some(v1), fixture.get(k));
    }

    // Check that the maps are equal in both directions
    let expected: Vec<_> = m.iter().collect();
    let fixture_result: Vec<_> = fixture.iter().collect();
    assert_eq!(expected, fixture_result);

    let expected: Vec<_> = m.iter().rev().collect();
    let fixture_result: Vec<_> = fixture.range_desc(..).collect();
    assert_eq!(expected, fixture_result);
});
