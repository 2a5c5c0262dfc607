#![no_main]

use libfuzzer_sys::fuzz_target;
use paper_survey::ranking::title_similarity;

fuzz_target!(|data: (String, String)| {
    let (a, b) = data;
    let score = title_similarity(&a, &b);
    assert!((0.0..=1.0).contains(&score));
    assert_eq!(score, title_similarity(&b, &a));
});
