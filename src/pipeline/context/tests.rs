use super::*;
use crate::completion::Role;
use crate::database::PageMetadata;

fn query_match(title: &str, url: &str) -> QueryMatch {
    QueryMatch {
        id: title.to_string(),
        score: 0.9,
        metadata: PageMetadata {
            url: url.to_string(),
            title: title.to_string(),
            description: format!("About {}", title),
            snippet: format!("{} snippet", title),
        },
    }
}

#[test]
fn formats_single_match() {
    let formatted = format_results(&[query_match("Rust", "https://www.rust-lang.org")]);

    assert_eq!(
        formatted,
        "**Title:** Rust\n**Description:** About Rust\n**Snippet:** Rust snippet\n**URL:** https://www.rust-lang.org"
    );
}

#[test]
fn separates_matches_in_order() {
    let formatted = format_results(&[
        query_match("First", "https://a.example.com"),
        query_match("Second", "https://b.example.com"),
    ]);

    let parts: Vec<&str> = formatted.split(MATCH_SEPARATOR).collect();
    assert_eq!(parts.len(), 2);
    assert!(parts[0].starts_with("**Title:** First"));
    assert!(parts[1].ends_with("**URL:** https://b.example.com"));
}

#[test]
fn no_matches_is_empty() {
    assert_eq!(format_results(&[]), "");
}

#[test]
fn context_as_assistant_turn() {
    let config = ChatConfig::default();

    let messages = build_prompt(&config, "What is this?", "**Title:** Rust");

    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    assert_eq!(messages[0].content, "You summarize and process URLs for users.");
    assert_eq!(messages[1].content, "What is this?");
    assert_eq!(messages[2].content, "**Title:** Rust");
}

#[test]
fn context_as_system_message() {
    let config = ChatConfig {
        system_prompt: "Be brief.".to_string(),
        context_role: ContextRole::System,
    };

    let messages = build_prompt(&config, "What is this?", "ctx");

    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::System, Role::User]);
    assert_eq!(messages[0].content, "Be brief.");
    assert_eq!(messages[1].content, "ctx");
    assert_eq!(messages[2].content, "What is this?");
}
