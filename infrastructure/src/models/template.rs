//! Plain-text chat template shared by the compiled-in backends.

use chatbot_domain::session::TemplateTurn;

/// Render `Role: message` blocks separated by a blank line.
///
/// Messages are whitespace-trimmed; an open turn renders as `Role:`.
pub fn render_plain(turns: &[TemplateTurn]) -> String {
    turns
        .iter()
        .map(|turn| match &turn.message {
            Some(message) => format!("{}: {}", turn.role, message.trim()),
            None => format!("{}:", turn.role),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
