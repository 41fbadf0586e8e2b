//! The companion chat conversation.

use frontal_bridge::chat::ChatMessage;

use crate::providers::chat::ChatError;

pub const SYSTEM_PROMPT: &str = "You are a warm, friendly mental health companion. Your purpose is to support people through their emotions and help them feel better.

YOUR STYLE:
- Be conversational and friendly, like talking to a caring friend
- Use emojis occasionally to add warmth
- Keep responses short and natural (2-3 sentences usually)
- Be genuinely empathetic and encouraging
- Ask follow-up questions to show you care

WHEN SOMEONE SHARES EMOTIONS:
- If they're happy: Celebrate with them! Ask what made them happy
- If they're sad/anxious/stressed: Acknowledge their feelings warmly, then ask if they want to talk about it
- Validate ALL feelings as normal and okay
- Offer helpful coping strategies when appropriate (breathing exercises, activities, reframing thoughts)
- Share practical mental health tips and techniques
- Always provide hope and encouragement

YOU CAN AND SHOULD provide real support, coping strategies, and helpful advice. You're not diagnosing or replacing therapy - you're a supportive friend offering genuine help.

Only if someone mentions self-harm or suicide, encourage them to contact crisis services immediately.";

pub const GREETING: &str = "Hi! I'm here to support you. How can I help you today?";
/// Used when the provider answers without any text.
pub const EMPTY_REPLY: &str = "Sorry, I could not generate a response.";
/// Used when the provider could not be reached.
pub const FALLBACK_REPLY: &str = "I'm having trouble connecting right now. Please try again.";

/// Messages exchanged with the assistant, starting with its greeting.
///
/// Sending is split in two steps so the caller does not hold the
/// conversation while the completion request runs: [`Conversation::begin`]
/// records the user's message and hands out the history to send, and
/// [`Conversation::finish`] appends the reply.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
            pending: false,
        }
    }
}

impl Conversation {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Records a user message and returns the history for the completion
    /// request. Returns `None` for blank input or while a reply is pending.
    pub fn begin(&mut self, text: &str) -> Option<Vec<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() || self.pending {
            return None;
        }

        self.messages.push(ChatMessage::user(text));
        self.pending = true;
        Some(self.messages.clone())
    }

    /// Appends the assistant's reply, or a fallback when the request failed.
    pub fn finish(&mut self, reply: Result<String, ChatError>) {
        let content = match reply {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(error) => {
                log::error!("Chat completion failed: {error}");
                FALLBACK_REPLY.to_string()
            }
        };
        self.messages.push(ChatMessage::assistant(content));
        self.pending = false;
    }
}
