#![no_main]

use libfuzzer_sys::fuzz_target;
use probe_estimator::dataset::RegressionDataset;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes, including invalid UTF-8, must yield Ok or a typed error
    if let Ok(dataset) = RegressionDataset::parse(Cursor::new(data), 4) {
        assert_eq!(dataset.w().len(), dataset.z().len());
    }
});
