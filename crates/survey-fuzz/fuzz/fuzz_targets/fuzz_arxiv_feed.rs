#![no_main]

use libfuzzer_sys::fuzz_target;
use paper_survey::models::RawRecord;
use paper_survey::models::arxiv::parse_feed;

fuzz_target!(|data: &[u8]| {
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(feed) = parse_feed(xml) {
        for entry in feed.entries {
            let _ = RawRecord::Arxiv(entry).into_paper();
        }
    }
});
