use frontal_bridge::{MessageFromBackend, navigation::Route};

use crate::navigation::resolve_route;

/// Handles [`frontal_bridge::MessageToBackend::Navigate`], applying the
/// access policy for the signed-in user.
pub async fn handle_navigate(context: super::AppContextHandle, requested: Route) {
    let user = {
        let state = context.state.read().await;
        state.collaborators.auth.current_user()
    };
    let route = resolve_route(requested, user.as_ref());
    if route != requested {
        log::info!("Redirecting {requested} to {route}");
    }
    show(context, route).await;
}

/// Switches the current screen. Entering the relaxation screen mounts a
/// media session and leaving it tears the session down.
pub(crate) async fn show(context: super::AppContextHandle, route: Route) {
    let previous = {
        let mut state = context.state.write().await;
        std::mem::replace(&mut state.route, route)
    };

    if previous == Route::Relax && route != Route::Relax {
        super::media_service::handle_close_session(context.clone()).await;
    }
    if route == Route::Relax && previous != Route::Relax {
        super::media_service::handle_open_session(context.clone()).await;
    }

    context.send(MessageFromBackend::NavigationResponse(route)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::auth::AuthProvider;
    use crate::services::test_support::Harness;
    use frontal_bridge::session::MediaKind;

    fn routes(messages: &[MessageFromBackend]) -> Vec<Route> {
        messages
            .iter()
            .filter_map(|message| match message {
                MessageFromBackend::NavigationResponse(route) => Some(*route),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_progress_requires_sign_in() {
        let mut harness = Harness::new();
        handle_navigate(harness.context.clone(), Route::PhysicalHealth).await;

        harness.auth.sign_in("calm@frontal.app", "secret").await.unwrap();
        handle_navigate(harness.context.clone(), Route::PhysicalHealth).await;

        assert_eq!(
            routes(&harness.drain()),
            vec![Route::Login, Route::PhysicalHealth]
        );
        assert_eq!(harness.context.state.read().await.route, Route::PhysicalHealth);
    }

    #[tokio::test]
    async fn test_relax_screen_owns_the_session() {
        let mut harness = Harness::new();
        handle_navigate(harness.context.clone(), Route::Relax).await;
        let session = {
            let state = harness.context.state.read().await;
            state.relax.as_ref().unwrap().session.clone()
        };
        session
            .subscribe()
            .wait_for(|snapshot| snapshot.audio_uri.is_some() && snapshot.video_uri.is_some())
            .await
            .unwrap();

        // navigating to the same screen keeps the session
        handle_navigate(harness.context.clone(), Route::Relax).await;
        handle_navigate(harness.context.clone(), Route::Chat).await;

        assert!(session.is_closed());
        assert!(harness.context.state.read().await.relax.is_none());
        assert!(harness.media.live(MediaKind::Audio).is_empty());
        assert_eq!(
            routes(&harness.drain()),
            vec![Route::Relax, Route::Relax, Route::Chat]
        );
    }
}
