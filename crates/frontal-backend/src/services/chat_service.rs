use frontal_bridge::MessageFromBackend;

use crate::conversation::SYSTEM_PROMPT;

async fn send_history(context: &super::AppContextHandle) {
    let (messages, pending) = {
        let state = context.state.read().await;
        (
            state.conversation.messages().to_vec(),
            state.conversation.is_pending(),
        )
    };
    context
        .send(MessageFromBackend::ChatHistoryUpdate { messages, pending })
        .await;
}

/// Handles [`frontal_bridge::MessageToBackend::SendChatMessage`]: appends the
/// message, asks the completion provider once and appends its reply.
pub async fn handle_send_message(context: super::AppContextHandle, text: String) {
    let (history, chat) = {
        let mut state = context.state.write().await;
        let history = state.conversation.begin(&text);
        (history, state.collaborators.chat.clone())
    };
    let Some(history) = history else {
        log::debug!("Ignoring a blank chat message or one sent while a reply is pending");
        return;
    };
    send_history(&context).await;

    let reply = chat.complete(SYSTEM_PROMPT, &history).await;
    context.state.write().await.conversation.finish(reply);
    send_history(&context).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{FALLBACK_REPLY, GREETING};
    use frontal_bridge::chat::ChatMessage;

    use crate::services::test_support::Harness;

    fn histories(messages: Vec<MessageFromBackend>) -> Vec<(Vec<ChatMessage>, bool)> {
        messages
            .into_iter()
            .filter_map(|message| match message {
                MessageFromBackend::ChatHistoryUpdate { messages, pending } => {
                    Some((messages, pending))
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_message_and_reply_are_appended() {
        let mut harness = Harness::new();
        handle_send_message(harness.context.clone(), "I slept badly".into()).await;

        let updates = histories(harness.drain());
        assert_eq!(updates.len(), 2);
        assert!(updates[0].1);
        let (messages, pending) = &updates[1];
        assert!(!pending);
        assert_eq!(
            messages,
            &vec![
                ChatMessage::assistant(GREETING),
                ChatMessage::user("I slept badly"),
                ChatMessage::assistant("echo: I slept badly"),
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let mut harness = Harness::new();
        handle_send_message(harness.context.clone(), "   ".into()).await;
        assert!(harness.drain().is_empty());
    }

    #[tokio::test]
    async fn test_failure_becomes_fallback_reply() {
        let mut harness = Harness::new();
        handle_send_message(harness.context.clone(), "offline".into()).await;

        let updates = histories(harness.drain());
        let last = updates.last().unwrap().0.last().unwrap().clone();
        assert_eq!(last, ChatMessage::assistant(FALLBACK_REPLY));
    }
}
