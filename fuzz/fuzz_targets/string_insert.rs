#![no_main]
use libfuzzer_sys::fuzz_target;

use record_index::Btree;
use std::collections::BTreeMap;

fuzz_target!(|data: Vec<(String, String)>| {
    let mut m = BTreeMap::default();
    let mut fixture = Btree::new();

    for (key, value) in data {
        m.insert(key.clone(), value.clone());
        fixture.put(key, value);
    }

    assert_eq!(m.len(), fixture.len());

    let m: Vec<_> = m.iter().collect();
    let fixture_result: Vec<_> = fixture.iter().collect();
    assert_eq!(m, fixture_result);
});
