use frontal_bridge::{
    MessageFromBackend,
    navigation::Route,
    notification::NotificationType,
};

use crate::navigation::resolve_route;
use crate::providers::auth::is_valid_email;

/// Forwards auth state changes to the frontend until the provider goes away
/// or the frontend disconnects.
pub async fn forward_auth_state(context: super::AppContextHandle) {
    let mut subscription = {
        let state = context.state.read().await;
        state.collaborators.auth.subscribe()
    };
    while let Some(user) = subscription.next().await {
        if context.tx.is_closed() {
            break;
        }
        context.send(MessageFromBackend::AuthStateChanged(user)).await;
    }
}

pub async fn handle_sign_in(context: super::AppContextHandle, email: String, password: String) {
    let auth = {
        let state = context.state.read().await;
        state.collaborators.auth.clone()
    };

    match auth.sign_in(email.trim(), &password).await {
        Ok(user) => {
            log::debug!("Signed in as {}", user.id);
            super::navigation_service::show(context, Route::Home).await;
        }
        Err(error) => {
            log::warn!("Sign in failed: {error}");
            context
                .send_notification(NotificationType::Error, error.sign_in_message())
                .await;
        }
    }
}

pub async fn handle_sign_up(context: super::AppContextHandle, email: String, password: String) {
    let auth = {
        let state = context.state.read().await;
        state.collaborators.auth.clone()
    };

    match auth.sign_up(email.trim(), &password).await {
        Ok(user) => {
            context
                .send_notification(
                    NotificationType::Success,
                    format!("Account created for {}.", user.email),
                )
                .await;
            super::navigation_service::show(context, Route::Home).await;
        }
        Err(error) => {
            log::warn!("Sign up failed: {error}");
            context
                .send_notification(NotificationType::Error, error.sign_up_message())
                .await;
        }
    }
}

pub async fn handle_reset_password(context: super::AppContextHandle, email: String) {
    let email = email.trim();
    if !is_valid_email(email) {
        context
            .send_notification(NotificationType::Error, "Please enter a valid email address.")
            .await;
        return;
    }

    let auth = {
        let state = context.state.read().await;
        state.collaborators.auth.clone()
    };
    match auth.reset_password(email).await {
        Ok(()) => {
            context
                .send_notification(
                    NotificationType::Success,
                    format!("Password reset email sent to {email}."),
                )
                .await;
        }
        Err(error) => {
            log::warn!("Password reset failed: {error}");
            context
                .send_notification(
                    NotificationType::Error,
                    format!("Password reset failed: {error}"),
                )
                .await;
        }
    }
}

/// Signs out and leaves any screen that needs an account.
pub async fn handle_sign_out(context: super::AppContextHandle) {
    let (auth, route) = {
        let state = context.state.read().await;
        (state.collaborators.auth.clone(), state.route)
    };
    auth.sign_out().await;

    let allowed = resolve_route(route, None);
    if allowed != route {
        super::navigation_service::show(context, allowed).await;
    }
}
