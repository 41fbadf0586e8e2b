/// Handles an incoming configuration request (see
/// [`frontal_bridge::MessageToBackend::ConfigurationRequest`]).
pub async fn handle_config_request(context: super::AppContextHandle) {
    let config = {
        let state = context.state.read().await;
        state.config.clone()
    };
    context
        .send(frontal_bridge::MessageFromBackend::ConfigurationResponse(
            config,
        ))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Harness;
    use frontal_bridge::MessageFromBackend;

    #[tokio::test]
    async fn test_config_is_sent_back() {
        let mut harness = Harness::new();
        handle_config_request(harness.context.clone()).await;

        let messages = harness.drain();
        assert!(matches!(
            messages.as_slice(),
            [MessageFromBackend::ConfigurationResponse(config)] if config.chat.model == "gpt-4"
        ));
    }
}
