// Prompt assembly from retrieved matches

#[cfg(test)]
mod tests;

use crate::completion::ChatMessage;
use crate::config::{ChatConfig, ContextRole};
use crate::database::QueryMatch;

pub const MATCH_SEPARATOR: &str = "\n\n---\n\n";

/// Render one match as the labelled block the model sees
#[inline]
pub fn format_match(query_match: &QueryMatch) -> String {
    let metadata = &query_match.metadata;
    format!(
        "**Title:** {}\n**Description:** {}\n**Snippet:** {}\n**URL:** {}",
        metadata.title, metadata.description, metadata.snippet, metadata.url
    )
}

/// All matches in order; empty string when there are none
#[inline]
pub fn format_results(matches: &[QueryMatch]) -> String {
    matches
        .iter()
        .map(format_match)
        .collect::<Vec<_>>()
        .join(MATCH_SEPARATOR)
}

/// Messages for the completion call
///
/// With [`ContextRole::Assistant`] the context follows the user message as an
/// assistant turn. With [`ContextRole::System`] it goes in a second system
/// message ahead of the user message.
#[inline]
pub fn build_prompt(config: &ChatConfig, user_message: &str, context: &str) -> Vec<ChatMessage> {
    let system = ChatMessage::system(config.system_prompt.as_str());
    let user = ChatMessage::user(user_message);

    match config.context_role {
        ContextRole::Assistant => vec![system, user, ChatMessage::assistant(context)],
        ContextRole::System => vec![system, ChatMessage::system(context), user],
    }
}
