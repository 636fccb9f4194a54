//! Session presentation port
//!
//! Defines the interface for showing a conversation as it happens.

use chatbot_domain::Role;

/// Callbacks for displaying a running session
///
/// Implementations live in the presentation layer. Streaming callbacks
/// receive text in the order the model produced it; tool output only ever
/// arrives through [`on_turn_message`](Self::on_turn_message) with
/// [`Role::System`].
pub trait SessionPresenter: Send + Sync {
    /// Called before the first fragment of an assistant reply.
    fn on_assistant_start(&self);

    /// Called for each piece of visible reply text.
    fn on_text(&self, text: &str);

    /// Called when the assistant reply has been fully generated.
    fn on_assistant_end(&self);

    /// Called with a complete message fed back to the model.
    fn on_turn_message(&self, role: Role, message: &str);

    // ==================== Think Mode Callbacks ====================

    /// Called for each piece of thought text in a think-mode reply.
    fn on_thought(&self, _text: &str) {}

    /// Called once the thought section of a reply is closed.
    fn on_thought_end(&self) {}
}

/// Presenter that shows nothing
pub struct NoPresenter;

impl SessionPresenter for NoPresenter {
    fn on_assistant_start(&self) {}
    fn on_text(&self, _text: &str) {}
    fn on_assistant_end(&self) {}
    fn on_turn_message(&self, _role: Role, _message: &str) {}
}
