use super::*;
use axum::{http::StatusCode, routing::post, Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use shared::{domain::UserId, error::ErrorBody};
use tokio::net::TcpListener;

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: i64,
}

fn token_expiring_at(exp: i64) -> String {
    encode(
        &Header::default(),
        &TestClaims {
            sub: "1".into(),
            exp,
        },
        &EncodingKey::from_secret(b"jwt-secret-key"),
    )
    .expect("token")
}

fn profile() -> UserProfile {
    UserProfile {
        id: UserId(1),
        email: "test@example.com".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
        company: None,
        phone: None,
        created_at: None,
        is_verified: false,
        mfa_enabled: false,
    }
}

fn auth_response(access_token: String) -> AuthResponse {
    AuthResponse {
        message: "Login successful".into(),
        access_token,
        user: profile(),
    }
}

async fn handle_login(
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorBody>)> {
    if payload.email == "test@example.com" && payload.password == "TestPass123" {
        let exp = (Utc::now() + chrono::Duration::hours(24)).timestamp();
        Ok(Json(auth_response(token_expiring_at(exp))))
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("Invalid credentials")),
        ))
    }
}

async fn spawn_auth_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route("/api/auth/login", post(handle_login));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[test]
fn fresh_context_is_not_authenticated() {
    let ctx = AuthContext::http(ApiEndpoint::new("http://127.0.0.1:9").expect("endpoint"));
    assert!(!ctx.is_authenticated());
    assert!(ctx.access_token().is_none());
    assert!(ctx.current_user().is_none());
}

#[test]
fn expired_token_does_not_authenticate() {
    let ctx = AuthContext::http(ApiEndpoint::new("http://127.0.0.1:9").expect("endpoint"));
    let past = (Utc::now() - chrono::Duration::minutes(5)).timestamp();
    ctx.set_session(AuthSession::from_response(auth_response(token_expiring_at(past))));

    assert!(!ctx.is_authenticated());
    assert!(ctx.access_token().is_none());
}

#[test]
fn opaque_token_is_accepted_without_expiry() {
    let session = AuthSession::from_response(auth_response("not-a-jwt".into()));
    assert!(session.expires_at.is_none());
    assert!(!session.is_expired_at(Utc::now()));
}

#[test]
fn logout_drops_session() {
    let ctx = AuthContext::http(ApiEndpoint::new("http://127.0.0.1:9").expect("endpoint"));
    ctx.set_session(AuthSession::from_response(auth_response("opaque".into())));
    assert!(ctx.is_authenticated());

    ctx.logout();
    assert!(!ctx.is_authenticated());
}

#[tokio::test]
async fn login_stores_session_from_server() {
    let server_url = spawn_auth_server().await;
    let ctx = AuthContext::http(ApiEndpoint::new(&server_url).expect("endpoint"));

    let user = ctx
        .login("test@example.com", "TestPass123")
        .await
        .expect("login");
    assert_eq!(user.email, "test@example.com");
    assert!(ctx.is_authenticated());
    assert!(ctx.access_token().is_some());
}

#[tokio::test]
async fn rejected_login_surfaces_server_message() {
    let server_url = spawn_auth_server().await;
    let ctx = AuthContext::http(ApiEndpoint::new(&server_url).expect("endpoint"));

    let err = ctx
        .login("test@example.com", "wrong")
        .await
        .expect_err("should fail");
    assert_eq!(err.server_message(), Some("Invalid credentials"));
    assert!(!ctx.is_authenticated());
}

#[tokio::test]
async fn login_without_password_is_rejected_locally() {
    let ctx = AuthContext::http(ApiEndpoint::new("http://127.0.0.1:9").expect("endpoint"));
    let err = ctx
        .login("test@example.com", "")
        .await
        .expect_err("should fail");
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::MissingField("password"))
    ));
}

#[test]
fn registration_rules_match_server() {
    let mut request = RegisterRequest {
        email: "test@example.com".into(),
        password: "TestPass123".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
        ..Default::default()
    };
    assert_eq!(validate_registration(&request), Ok(()));

    request.last_name = " ".into();
    assert_eq!(
        validate_registration(&request),
        Err(ValidationError::MissingField("last_name"))
    );
}

#[test]
fn email_shape_is_checked() {
    assert_eq!(validate_email("someone@synthai.co.za"), Ok(()));
    assert_eq!(validate_email("no-at-sign"), Err(ValidationError::InvalidEmail));
    assert_eq!(validate_email("a@host"), Err(ValidationError::InvalidEmail));
    assert_eq!(validate_email("a@host.c"), Err(ValidationError::InvalidEmail));
    assert_eq!(validate_email("@host.com"), Err(ValidationError::InvalidEmail));
}

#[test]
fn password_strength_reports_first_failing_rule() {
    assert_eq!(validate_password("Ab1"), Err(ValidationError::PasswordTooShort));
    assert_eq!(
        validate_password("Abcdefgh"),
        Err(ValidationError::PasswordMissingDigit)
    );
    assert_eq!(
        validate_password("abcdefg1"),
        Err(ValidationError::PasswordMissingUppercase)
    );
    assert_eq!(
        validate_password("ABCDEFG1"),
        Err(ValidationError::PasswordMissingLowercase)
    );
    assert_eq!(validate_password("TestPass123"), Ok(()));
}

#[test]
fn non_ascii_digit_satisfies_digit_rule() {
    assert_eq!(validate_password("Abcdefg\u{663}"), Ok(()));
}

#[tokio::test]
async fn weak_password_registration_never_reaches_server() {
    let ctx = AuthContext::http(ApiEndpoint::new("http://127.0.0.1:9").expect("endpoint"));
    let err = ctx
        .register(RegisterRequest {
            email: "new@example.com".into(),
            password: "short".into(),
            first_name: "New".into(),
            last_name: "User".into(),
            ..Default::default()
        })
        .await
        .expect_err("should fail");
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::PasswordTooShort)
    ));
    assert!(!ctx.is_authenticated());
}
