#![no_main]
use libfuzzer_sys::fuzz_target;

use record_index::{TransactionLog, TransactionLogConfig};

fuzz_target!(|data: (Vec<(u8, u8)>, u8)| {
    let max_entries = (data.1 as usize).max(1);
    let mut log =
        TransactionLog::with_config(TransactionLogConfig::default().max_entries(max_entries))
            .unwrap();

    for (op, arg) in data.0 {
        match op % 4 {
            0 => {
                let id = log.commit(arg);
                assert_eq!(Some(id), log.cursor());
                assert_eq!(Some(&arg), log.current_value());
            }
            1 => {
                log.advance(arg as usize);
            }
            2 => {
                log.rollback(arg as usize);
            }
            _ => log.flush(),
        }
        assert!(log.len() <= max_entries);
        match log.cursor_index() {
            Some(c) => assert!(c < log.len()),
            None => assert!(log.is_empty()),
        }
    }
});
