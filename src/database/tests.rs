use super::*;

fn page(url: &str, title: &str) -> ScrapedPage {
    ScrapedPage {
        url: url.to_string(),
        title: title.to_string(),
        description: "desc".to_string(),
        snippet: "snippet".to_string(),
    }
}

#[test]
fn record_id_prefers_title() {
    let record = StoreRecord::from_page(page("https://a.io", "A page"), vec![1.0]);

    assert_eq!(record.id, "A page");
    assert_eq!(record.metadata.url, "https://a.io");
    assert_eq!(record.metadata.title, "A page");
    assert_eq!(record.vector, vec![1.0]);
}

#[test]
fn record_id_falls_back_to_url() {
    let record = StoreRecord::from_page(page("https://a.io", ""), vec![1.0]);

    assert_eq!(record.id, "https://a.io");
}

#[test]
fn dedupe_keeps_last_record_in_first_position() {
    let records = vec![
        StoreRecord::from_page(page("https://a.io/1", "Same"), vec![1.0]),
        StoreRecord::from_page(page("https://b.io", "Other"), vec![2.0]),
        StoreRecord::from_page(page("https://a.io/2", "Same"), vec![3.0]),
    ];

    let unique = dedupe_by_id(records);

    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].id, "Same");
    assert_eq!(unique[0].metadata.url, "https://a.io/2");
    assert_eq!(unique[1].id, "Other");
}

#[test]
fn metadata_missing_fields_default_to_empty() {
    let metadata: PageMetadata =
        serde_json::from_str(r#"{"url":"https://a.io"}"#).expect("should parse");

    assert_eq!(metadata.url, "https://a.io");
    assert!(metadata.title.is_empty());
    assert!(metadata.snippet.is_empty());
}
