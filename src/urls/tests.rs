use super::*;

#[test]
fn single_url() {
    assert_eq!(
        extract_urls("Check https://example.com"),
        vec!["https://example.com".to_string()]
    );
}

#[test]
fn empty_and_plain_text() {
    assert!(extract_urls("").is_empty());
    assert!(extract_urls("nothing to see here").is_empty());
}

#[test]
fn scheme_is_required() {
    assert!(extract_urls("go to www.example.com now").is_empty());
}

#[test]
fn keeps_order_and_duplicates() {
    let text = "first http://www.rust-lang.org/learn?lang=en then https://docs.rs/tokio \
                and again http://www.rust-lang.org/learn?lang=en";
    assert_eq!(
        extract_urls(text),
        vec![
            "http://www.rust-lang.org/learn?lang=en".to_string(),
            "https://docs.rs/tokio".to_string(),
            "http://www.rust-lang.org/learn?lang=en".to_string(),
        ]
    );
}

#[test]
fn stops_at_characters_outside_the_pattern() {
    assert_eq!(
        extract_urls("see https://example.com/a/b, and \"https://foo.io/x\""),
        vec![
            "https://example.com/a/b".to_string(),
            "https://foo.io/x".to_string(),
        ]
    );
}

#[test]
fn includes_port_query_and_fragment() {
    assert_eq!(
        extract_urls("local http://localhost.dev:8080/path?q=1&r=2#top end"),
        vec!["http://localhost.dev:8080/path?q=1&r=2#top".to_string()]
    );
}

#[test]
fn trailing_sentence_period_is_part_of_the_match() {
    assert_eq!(
        extract_urls("Read https://example.com/post."),
        vec!["https://example.com/post.".to_string()]
    );
}

#[test]
fn non_ascii_text_right_after_url() {
    assert_eq!(
        extract_urls("看看https://example.com吗"),
        vec!["https://example.com".to_string()]
    );
    assert_eq!(
        extract_urls("https://example.comé"),
        vec!["https://example.com".to_string()]
    );
}

#[test]
fn top_level_domain_must_end_at_a_word_boundary() {
    assert!(extract_urls("https://example.abcdefgh").is_empty());
    assert!(extract_urls("https://example.com_x").is_empty());
}
