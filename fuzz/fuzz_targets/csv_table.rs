#![no_main]
use libfuzzer_sys::fuzz_target;
use transit_norm_core::RawTable;

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = RawTable::from_bytes("fuzz.csv", data) {
        assert_eq!(table.rows.len(), table.row_numbers.len());
    }
});
