// Common test utilities shared by the integration tests
// Tests run against the database in DATABASE_URL and skip themselves when none is reachable

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use jobboard_backend::{
    app::AppState,
    app_config::AppConfig,
    build_router,
    db::{create_diesel_pool, DieselDatabaseConfig, DieselPool},
    migrations,
    models::{NewUser, Profile, User, UserRole},
    services::{email::sender::MemoryTransport, EmailService},
    utils::hash_password,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "Secret1!";

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub diesel_pool: DieselPool,
    pub mailbox: MemoryTransport,
}

fn set_default_var(key: &str, value: &str) {
    if std::env::var(key).is_err() {
        std::env::set_var(key, value);
    }
}

/// Setup test application, or `None` when no database is available
pub async fn setup_test_app() -> Option<TestApp> {
    dotenv::from_filename(".env.test").ok();
    dotenv::dotenv().ok();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return None;
    }

    set_default_var("JWT_SECRET", "integration-access-secret-at-least-32-chars");
    set_default_var("REFRESH_TOKEN_SECRET", "integration-refresh-secret-at-least-32-chars");
    set_default_var("FRONTEND_URL", "http://localhost:3000");
    set_default_var("BCRYPT_COST", "4");
    std::env::set_var("EMAIL_PROVIDER", "log");
    std::env::set_var("REQUIRE_EMAIL_VERIFICATION", "true");

    let config = AppConfig::from_env().expect("Failed to load test config");

    let diesel_pool = match create_diesel_pool(DieselDatabaseConfig::from(&config.database)).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: database unavailable ({})", e);
            return None;
        },
    };
    migrations::run_migrations(&config.database_url)
        .await
        .expect("Failed to run migrations");

    let mailbox = MemoryTransport::new();
    let email_service = EmailService::with_transport(config.email.clone(), Arc::new(mailbox.clone()))
        .expect("Failed to create email service");

    let state = AppState::new(Arc::new(config), diesel_pool.clone(), email_service);
    let app = build_router(state.clone());

    Some(TestApp {
        app,
        state,
        diesel_pool,
        mailbox,
    })
}

/// Generate a unique email so tests never collide
pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, Uuid::new_v4().simple())
}

/// Pull the token that follows `marker` out of an email body
pub fn token_after(html: &str, marker: &str) -> Option<String> {
    let start = html.find(marker)? + marker.len();
    let token: String = html[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    (!token.is_empty()).then_some(token)
}

impl TestApp {
    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "POST", uri)
    }

    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "GET", uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "PUT", uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "DELETE", uri)
    }

    /// Verification token from the latest mail sent to `email`
    pub fn verification_token(&self, email: &str) -> String {
        let mail = self.mailbox.last_to(email).expect("no verification mail");
        token_after(&mail.html, "/verify-email/").expect("no token in verification mail")
    }

    pub fn reset_token(&self, email: &str) -> String {
        let mail = self.mailbox.last_to(email).expect("no reset mail");
        token_after(&mail.html, "/reset-password/").expect("no token in reset mail")
    }

    /// Sign up, verify and sign in. Returns the session payload.
    pub async fn register_verified(&self, email: &str, role: &str, full_name: &str) -> Value {
        let response = self
            .post("/api/auth/signup")
            .json(&json!({
                "email": email,
                "password": TEST_PASSWORD,
                "role": role,
                "fullName": full_name
            }))
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let token = self.verification_token(email);
        let response = self
            .get(&format!("/api/auth/verify-email/{}", token))
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        self.sign_in(email, TEST_PASSWORD).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Value {
        let response = self
            .post("/api/auth/signin")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await;
        body["data"].clone()
    }

    /// Access token for a fresh verified account with `role`
    pub async fn access_token_for(&self, prefix: &str, role: &str) -> String {
        let email = unique_email(prefix);
        let session = self.register_verified(&email, role, "Test User").await;
        session["accessToken"].as_str().unwrap().to_string()
    }

    /// Admins cannot self-register; insert one directly and sign in
    pub async fn admin_token(&self) -> String {
        let email = unique_email("admin");
        let mut conn = self.diesel_pool.get().await.unwrap();
        let user = User::create(
            &mut conn,
            NewUser {
                email: email.clone(),
                password_hash: hash_password(TEST_PASSWORD, 4).unwrap(),
                role: UserRole::Admin,
                is_email_verified: true,
                email_verification_token: None,
            },
        )
        .await
        .unwrap();
        Profile::create_empty(&mut conn, user.id, "Site Admin").await.unwrap();
        drop(conn);

        let session = self.sign_in(&email, TEST_PASSWORD).await;
        session["accessToken"].as_str().unwrap().to_string()
    }
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: &'static str,
    uri: String,
    bearer: Option<String>,
    body: Option<Vec<u8>>,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &'static str, uri: &str) -> Self {
        Self {
            app,
            method,
            uri: uri.to_string(),
            bearer: None,
            body: None,
        }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_vec(body).unwrap());
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        if let Some(token) = &self.bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match self.body {
            Some(bytes) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(bytes))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.app.clone().oneshot(request).await.unwrap();
        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}

/// POST /api/companies and return the new id
pub async fn create_company(app: &TestApp, token: &str, name: &str) -> String {
    let response = app
        .post("/api/companies")
        .bearer(token)
        .json(&json!({
            "name": name,
            "description": "We build things",
            "industry": "Software",
            "location": "Berlin"
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await;
    body["data"]["id"].as_str().unwrap().to_string()
}

/// POST /api/jobs and return the new id
pub async fn create_job(app: &TestApp, token: &str, title: &str) -> String {
    let response = app
        .post("/api/jobs")
        .bearer(token)
        .json(&json!({
            "title": title,
            "description": "Write and review code",
            "location": "Remote",
            "jobType": "FULL_TIME",
            "salaryMin": 50000,
            "salaryMax": 90000
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await;
    body["data"]["id"].as_str().unwrap().to_string()
}

/// POST /api/jobs/{id}/apply and return the application id
pub async fn apply(app: &TestApp, token: &str, job_id: &str) -> String {
    let response = app
        .post(&format!("/api/jobs/{}/apply", job_id))
        .bearer(token)
        .json(&json!({ "coverLetter": "I would love to join" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await;
    body["data"]["id"].as_str().unwrap().to_string()
}

pub async fn set_status(app: &TestApp, token: &str, application_id: &str, status: &str) {
    let response = app
        .put(&format!("/api/applications/{}/status", application_id))
        .bearer(token)
        .json(&json!({ "status": status }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
