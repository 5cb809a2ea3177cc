use super::*;

/// Recommendation screen: conversation with the repair assistant.
#[derive(Debug, Clone, Default)]
pub struct RecommendationState {
    /// Conversation as last returned by the backend
    pub history: Vec<ChatMessage>,
    pub input: TextInput,
    /// Message sent and awaiting a reply
    pub outgoing: Option<String>,
    pub error: Option<String>,
    /// Lines scrolled up from the bottom of the conversation
    pub scroll_back: u16,
}

impl App {
    /// Handle keyboard input on the recommendation screen.
    pub(super) fn handle_recommendation_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_chat(),
            KeyCode::PageUp | KeyCode::Up => {
                let scroll_back = &mut self.recommendation.scroll_back;
                *scroll_back = scroll_back.saturating_add(1);
            }
            KeyCode::PageDown | KeyCode::Down => {
                let scroll_back = &mut self.recommendation.scroll_back;
                *scroll_back = scroll_back.saturating_sub(1);
            }
            _ => {
                self.recommendation.input.handle_key(key);
            }
        }
    }

    fn submit_chat(&mut self) {
        let message = self.recommendation.input.value().trim().to_string();
        if message.is_empty() {
            return;
        }
        self.recommendation.error = None;
        self.recommendation.outgoing = Some(message.clone());
        self.queue(PendingAction::Chat(message));
    }

    pub(super) fn finish_chat(&mut self, message: &str) {
        self.recommendation.outgoing = None;
        match self.backend.chat(message, &self.recommendation.history) {
            Ok(history) => {
                tracing::debug!(turns = history.len(), "Chat history updated");
                self.recommendation.history = history;
                self.recommendation.input.clear();
                self.recommendation.scroll_back = 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                self.recommendation.error = Some(format!(
                    "Sorry, I couldn't get a response: {}",
                    describe_error(&e)
                ));
            }
        }
    }
}
