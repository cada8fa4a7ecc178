use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use shared::{
    error::ValidationError,
    protocol::{AuthResponse, LoginRequest, RegisterRequest, UserProfile},
};
use tracing::{info, warn};

use crate::{
    error::ClientError,
    http::{read_json, ApiEndpoint},
};

const MIN_PASSWORD_LEN: usize = 8;

/// What pages need to know about the visitor.
pub trait AuthState: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn access_token(&self) -> Option<String>;
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError>;
}

pub struct HttpAuthBackend {
    endpoint: ApiEndpoint,
}

impl HttpAuthBackend {
    pub fn new(endpoint: ApiEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let res = self
            .endpoint
            .post("/api/auth/login")?
            .json(request)
            .send()
            .await?;
        read_json(res).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let res = self
            .endpoint
            .post("/api/auth/register")?
            .json(request)
            .send()
            .await?;
        read_json(res).await
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    exp: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub user: UserProfile,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Builds a session from a login/register response.
    ///
    /// The token's `exp` claim is read without checking the signature; the
    /// server remains the authority on validity. Tokens that are not JWTs are
    /// kept as opaque bearer tokens with no known expiry.
    pub fn from_response(response: AuthResponse) -> Self {
        let expires_at = match read_expiry(&response.access_token) {
            Ok(expires_at) => expires_at,
            Err(err) => {
                warn!("access token claims unreadable, treating as opaque: {err}");
                None
            }
        };
        Self {
            access_token: response.access_token,
            user: response.user,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

fn read_expiry(token: &str) -> Result<Option<DateTime<Utc>>, ClientError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data
        .claims
        .exp
        .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)))
}

/// Holds the signed-in visitor for the session.
pub struct AuthContext {
    backend: Arc<dyn AuthBackend>,
    session: RwLock<Option<AuthSession>>,
}

impl AuthContext {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            backend,
            session: RwLock::new(None),
        }
    }

    pub fn http(endpoint: ApiEndpoint) -> Self {
        Self::new(Arc::new(HttpAuthBackend::new(endpoint)))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingField(if email.is_empty() {
                "email"
            } else {
                "password"
            })
            .into());
        }

        let response = self
            .backend
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        Ok(self.start_session(response))
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, ClientError> {
        validate_registration(&request)?;
        let response = self.backend.register(&request).await?;
        Ok(self.start_session(response))
    }

    pub fn logout(&self) {
        if let Some(session) = self.write_session().take() {
            info!(user_id = session.user.id.0, "signed out");
        }
    }

    pub fn set_session(&self, session: AuthSession) {
        *self.write_session() = Some(session);
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.active_session().map(|session| session.user)
    }

    fn start_session(&self, response: AuthResponse) -> UserProfile {
        let session = AuthSession::from_response(response);
        let user = session.user.clone();
        info!(user_id = user.id.0, email = %user.email, "signed in");
        self.set_session(session);
        user
    }

    fn active_session(&self) -> Option<AuthSession> {
        let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
        session
            .as_ref()
            .filter(|session| !session.is_expired_at(Utc::now()))
            .cloned()
    }

    fn write_session(&self) -> std::sync::RwLockWriteGuard<'_, Option<AuthSession>> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthState for AuthContext {
    fn is_authenticated(&self) -> bool {
        self.active_session().is_some()
    }

    fn access_token(&self) -> Option<String> {
        self.active_session().map(|session| session.access_token)
    }
}

/// Same rules the server enforces on registration, checked before the
/// round trip.
pub fn validate_registration(request: &RegisterRequest) -> Result<(), ValidationError> {
    let required = [
        ("email", &request.email),
        ("password", &request.password),
        ("first_name", &request.first_name),
        ("last_name", &request.last_name),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    validate_email(&request.email)?;
    validate_password(&request.password)
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let domain_ok = domain.rsplit_once('.').is_some_and(|(host, tld)| {
        !host.is_empty()
            && host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || ".-".contains(c))
            && tld.len() >= 2
            && tld.chars().all(|c| c.is_ascii_alphabetic())
    });

    if local_ok && domain_ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(char::is_numeric) {
        return Err(ValidationError::PasswordMissingDigit);
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(ValidationError::PasswordMissingUppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(ValidationError::PasswordMissingLowercase);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
