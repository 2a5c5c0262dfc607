#![no_main]

use libfuzzer_sys::fuzz_target;
use paper_survey::models::RawRecord;
use paper_survey::models::semantic_scholar::S2Paper;

fuzz_target!(|data: &[u8]| {
    // Decoding and mapping must reject bad records, never panic
    if let Ok(paper) = serde_json::from_slice::<S2Paper>(data) {
        if let Ok(mapped) = RawRecord::SemanticScholar(paper).into_paper() {
            assert!(!mapped.id.is_empty());
            assert!(!mapped.title.trim().is_empty());
        }
    }
});
