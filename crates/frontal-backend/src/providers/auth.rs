//! Email/password accounts backed by the Firebase Identity Toolkit REST API.

use async_trait::async_trait;
use frontal_bridge::{auth::User, config::AuthConfig};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Minimum password length accepted on sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Input rejected before contacting the provider.
    #[error("{0}")]
    Validation(&'static str),
    #[error("authentication is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The provider answered with an error code such as `EMAIL_EXISTS`.
    #[error("{0}")]
    Provider(String),
}

impl AuthError {
    /// Provider code without the optional detail suffix
    /// (`"WEAK_PASSWORD : Password should be..."` becomes `"WEAK_PASSWORD"`).
    fn code(&self) -> Option<&str> {
        match self {
            AuthError::Provider(message) => message.split([' ', ':']).next(),
            _ => None,
        }
    }

    /// Text shown to the user when signing in fails.
    pub fn sign_in_message(&self) -> String {
        let reason = match self.code() {
            Some("INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND") => {
                "Incorrect email or password.".to_string()
            }
            Some("USER_DISABLED") => "This account has been disabled.".to_string(),
            Some("TOO_MANY_ATTEMPTS_TRY_LATER") => {
                "Too many attempts. Please try again later.".to_string()
            }
            _ => self.to_string(),
        };
        format!("Login Failed: {reason}")
    }

    /// Text shown to the user when creating an account fails.
    pub fn sign_up_message(&self) -> String {
        let reason = match self.code() {
            Some("EMAIL_EXISTS") => {
                "This email is already registered. Please sign in instead.".to_string()
            }
            Some("INVALID_EMAIL") => "Please enter a valid email address.".to_string(),
            Some("WEAK_PASSWORD") => {
                "Password is too weak. Please use a stronger password.".to_string()
            }
            _ => self.to_string(),
        };
        format!("Registration Failed: {reason}")
    }
}

/// Looks like `local@domain.tld` and contains no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(index, c)| c == '.' && index > 0 && index + 1 < domain.len())
}

/// Checks sign-up input locally so obviously bad requests never leave the
/// device.
pub fn validate_sign_up(email: &str, password: &str) -> Result<(), AuthError> {
    if !is_valid_email(email) {
        return Err(AuthError::Validation("Please enter a valid email address"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(
            "Password must be at least 6 characters long",
        ));
    }
    Ok(())
}

/// Scoped listener of the signed-in user.
///
/// The first call to [`AuthSubscription::next`] yields the current user;
/// later calls wait for changes. Dropping the subscription unsubscribes.
pub struct AuthSubscription {
    receiver: watch::Receiver<Option<User>>,
    delivered_initial: bool,
}

impl AuthSubscription {
    pub fn new(receiver: watch::Receiver<Option<User>>) -> Self {
        Self {
            receiver,
            delivered_initial: false,
        }
    }

    /// Next user value, or `None` once the provider is gone.
    pub async fn next(&mut self) -> Option<Option<User>> {
        if self.delivered_initial {
            self.receiver.changed().await.ok()?;
        }
        self.delivered_initial = true;
        Some(self.receiver.borrow_and_update().clone())
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        log::debug!("Auth state listener unsubscribed");
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Sends a password reset email.
    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;

    async fn sign_out(&self);

    fn current_user(&self) -> Option<User>;

    fn subscribe(&self) -> AuthSubscription;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
}

pub struct FirebaseAuth {
    client: reqwest::Client,
    config: AuthConfig,
    current: watch::Sender<Option<User>>,
}

impl FirebaseAuth {
    pub fn new(client: reqwest::Client, config: AuthConfig) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            client,
            config,
            current,
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<reqwest::Response, AuthError> {
        let api_key = self.config.api_key.as_deref().ok_or(AuthError::NotConfigured)?;
        let url = format!("{}/accounts:{action}", self.config.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        Err(AuthError::Provider(super::error_message(&body)))
    }

    async fn authenticate(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let request = CredentialsRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.post(action, &request).await?.json().await?;
        let user = User {
            id: account.local_id,
            email: account.email,
        };

        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.authenticate("signInWithPassword", email, password).await?;
        log::info!("User {} signed in", user.email);
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        validate_sign_up(email, password)?;
        let user = self.authenticate("signUp", email, password).await?;
        log::info!("User {} signed up", user.email);
        Ok(user)
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let request = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        self.post("sendOobCode", &request).await?;
        Ok(())
    }

    async fn sign_out(&self) {
        if let Some(user) = self.current.send_replace(None) {
            log::info!("User {} signed out", user.email);
        }
    }

    fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::new(self.current.subscribe())
    }
}
