//! Login, registration and logout.

use reqwest::{header, Method, StatusCode};
use tracing::{debug, info, warn};

use crate::auth::Credential;
use crate::models::{AccessToken, NewUser, User};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Exchange username and password for a bearer token and store it.
    ///
    /// A rejection leaves the token store untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        let request = self
            .request(Method::POST, "/token")
            .header(header::ACCEPT, "application/json")
            .form(&[("username", username), ("password", password)]);

        let sent = self.send_anonymous(request).await?;
        let response = self
            .check_response(sent, |status, body| match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Some(ApiError::AuthenticationFailed(ApiError::detail_message(body)))
                }
                StatusCode::UNPROCESSABLE_ENTITY => {
                    Some(ApiError::ValidationFailed(ApiError::detail_message(body)))
                }
                _ => None,
            })
            .await
            .inspect_err(|e| warn!(username, error = %e, "Login failed"))?;

        let token: AccessToken = Self::decode(response).await?;
        if token.access_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "login response carried an empty access_token".to_string(),
            ));
        }
        if let Some(kind) = token.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                debug!(token_type = kind, "Unexpected token type, using as bearer");
            }
        }

        let credential = Credential::new(token.access_token);
        self.token_store().set(credential.clone());
        info!(username, "Logged in");
        Ok(credential)
    }

    /// Create an account. No credential is issued; call `login` afterwards.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User, ApiError> {
        let new_user = validate_registration(username, email, password)?;

        let sent = self
            .send_anonymous(self.request(Method::POST, "/users/").json(&new_user))
            .await?;
        let response = self
            .check_response(sent, |status, body| {
                status.is_client_error().then(|| {
                    let reason = ApiError::detail_message(body);
                    if reason.is_empty() {
                        ApiError::ValidationFailed("registration was rejected".to_string())
                    } else {
                        ApiError::ValidationFailed(reason)
                    }
                })
            })
            .await?;

        let user: User = Self::decode(response).await?;
        info!(user_id = user.id, username = %user.username, "Registered account");
        Ok(user)
    }

    /// Forget the held credential. Local only; never contacts the backend.
    pub fn logout(&self) {
        self.token_store().clear();
        info!("Logged out");
    }

    pub fn is_logged_in(&self) -> bool {
        self.token_store().is_present()
    }
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<NewUser, ApiError> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() {
        return Err(ApiError::ValidationFailed("username is required".to_string()));
    }
    if password.is_empty() {
        return Err(ApiError::ValidationFailed("password is required".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(ApiError::ValidationFailed(format!("invalid email address: {:?}", email))),
    }
    Ok(NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    })
}
