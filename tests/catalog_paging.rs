use shelbyx::catalog::{categorize, empty_state, summary_line, ViewCategory};
use shelbyx::paginate::{Paginator, PagingPolicy};
use shelbyx::preview::blob_url;
use shelbyx::types::BlobRecord;
use shelbyx::util_text::{format_date, format_size};

fn rec(path: &str, size: u64, ts: Option<i64>) -> BlobRecord {
    BlobRecord {
        name: format!("@0xabc/{path}"),
        blob_name_suffix: path.to_string(),
        size,
        creation_micros: ts,
    }
}

#[test]
fn listing_splits_sorts_and_formats() {
    let listing: Vec<BlobRecord> = serde_json::from_str(
        r#"[
            {"name": "@0xabc/a/b c.png", "blobNameSuffix": "a/b c.png", "size": 2048, "creationMicros": 1700000000000000},
            {"name": "@0xabc/report.PDF", "blobNameSuffix": "report.PDF", "size": "512", "creationMicros": "1700000001000000"},
            {"name": "@0xabc/clip.mp4", "blobNameSuffix": "clip.mp4", "size": 0},
            {"name": "@0xabc/data.bin", "blobNameSuffix": "data.bin", "size": 1}
        ]"#,
    )
    .unwrap();

    let view = categorize(&listing);
    assert_eq!(view.total(), 4);
    let media: Vec<&str> = view.media.iter().map(|b| b.display_path()).collect();
    assert_eq!(media, ["a/b c.png", "clip.mp4"], "undated media sorts last");
    let docs: Vec<&str> = view.documents.iter().map(|b| b.display_path()).collect();
    assert_eq!(docs, ["report.PDF", "data.bin"], "unknown kinds land in documents");

    let cat = &view.media[0];
    assert_eq!(format_size(cat.size), "2.00 KB");
    assert_eq!(format_date(cat.creation_micros), "Nov 14, 2023");
    assert_eq!(format_date(view.media[1].creation_micros), "Unknown date");
    assert_eq!(
        blob_url("https://api.shelbynet.shelby.xyz", "0xabc", cat.display_path()),
        "https://api.shelbynet.shelby.xyz/shelby/v1/blobs/0xabc/a/b%20c.png"
    );

    assert_eq!(summary_line(view.total()), "4 items stored on Shelby Network");
    assert_eq!(summary_line(1), "1 item stored on Shelby Network");
}

#[test]
fn equal_timestamps_keep_listing_order() {
    let listing = vec![
        rec("first.png", 1, Some(5)),
        rec("second.png", 1, Some(5)),
        rec("third.png", 1, Some(9)),
    ];
    let view = categorize(&listing);
    let order: Vec<&str> = view.media.iter().map(|b| b.display_path()).collect();
    assert_eq!(order, ["third.png", "first.png", "second.png"]);
}

#[test]
fn pages_and_reveal_walk_the_same_sorted_list() {
    let listing: Vec<BlobRecord> = (0..25)
        .map(|i| rec(&format!("f{i:02}.txt"), 1, Some(i)))
        .collect();
    let view = categorize(&listing);
    let docs = view.list(ViewCategory::Documents);
    assert_eq!(docs[0].display_path(), "f24.txt");

    let mut pages = Paginator::from_policy(PagingPolicy::Pages, 10, 12);
    let mut seen = Vec::new();
    loop {
        seen.extend(pages.slice(docs).iter().map(|b| b.display_path().to_string()));
        if !pages.advance(docs.len()) {
            break;
        }
    }
    assert_eq!(seen.len(), 25);
    assert_eq!(pages.status(docs.len()), "Page 3/3");

    let mut reveal = Paginator::from_policy(PagingPolicy::Reveal, 10, 12);
    assert_eq!(reveal.status(docs.len()), "12 of 25");
    reveal.advance(docs.len());
    reveal.advance(docs.len());
    assert!(!reveal.can_advance(docs.len()));
    let revealed: Vec<String> = reveal
        .slice(docs)
        .iter()
        .map(|b| b.display_path().to_string())
        .collect();
    assert_eq!(revealed, seen);
}

#[test]
fn empty_tabs_explain_themselves() {
    let view = categorize(&[]);
    assert!(view.is_empty());
    let (title, hint) = empty_state(ViewCategory::Media);
    assert_eq!(title, "No media files");
    assert!(hint.contains("upload"));
}
