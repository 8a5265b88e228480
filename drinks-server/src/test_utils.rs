use crate::config::Settings;
use crate::create_app;
use crate::models::Drink;
use crate::state::AppState;
use crate::store::memory::InMemoryStore;
use crate::store::{DrinkStore, Store};
use axum::body::Body;
use axum::Router;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Key id under which the mock identity provider publishes the signing key
pub const SIGNING_KEY_ID: &str = "test-signing-key";
/// Key id the mock identity provider never publishes
pub const FOREIGN_KEY_ID: &str = "test-foreign-key";

const SIGNING_KEY_PEM: &[u8] = include_bytes!("test_keys/signing_key.pem");
const FOREIGN_KEY_PEM: &[u8] = include_bytes!("test_keys/foreign_key.pem");

/// Public half of `SIGNING_KEY_PEM`
const SIGNING_KEY_MODULUS: &str = "5I6G3nrBKy_wW1SKeS28FSJLWgFxh1895w8LlJ7BV2njCnCbQguLxBpUzJYWGoopX7Ac_YoNU_gMm9XHQXkiNhvTGlSyUYuFJ8c8HKNXvI1wW2OSUUqeuuOCzTiRwY3lSUx5ARfnYLRO844WWMg6fqXlINGgqfDLoHbhUn5qrD2Dqetr7lpmreSVRgweDWVcOjeBI6KZ7QiXELl57Q8y7R6sETRx5_-Kg7Zg2AVduSIOz-CIc6AX4c5oJF8xK-jiMaduwfzaVlEBgKrt-QjomoVjCi_h5_v5GmneTQAalZnj2leBFQeqz87u4vN_IucPIUECpI3QJ_qrPphY88VLow";

const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Permissions granted to the manager role
pub const MANAGER: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

/// Permissions granted to the barista role
pub const BARISTA: &[&str] = &["get:drinks-detail"];

/// Key set document published by the mock identity provider
pub fn jwks_document() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "kid": SIGNING_KEY_ID,
            "use": "sig",
            "alg": "RS256",
            "n": SIGNING_KEY_MODULUS,
            "e": "AQAB"
        }]
    })
}

/// Test fixture for setting up a complete test environment with a mocked identity provider.
///
/// The mock serves the key set for `SIGNING_KEY_ID`, so tokens from [`TokenBuilder`]
/// verify against the application under test.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///     let token = TokenBuilder::new(MANAGER).sign();
///
///     let response = fixture.post("/drinks", Some(&token), &json!({...})).await;
///     response.assert_ok();
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Shared state behind the router
    pub state: AppState,
    /// Configuration settings
    pub settings: Settings,
    /// Mock server for the identity provider's key set
    pub jwks_mock: MockServer,
}

impl TestFixture {
    /// Creates a fixture backed by an empty in-memory store
    pub async fn new() -> Self {
        Self::with_store(Store::InMemory(InMemoryStore::new())).await
    }

    /// Creates a fixture backed by the given store
    pub async fn with_store(store: Store) -> Self {
        let fixture = Self::without_signing_keys_and_store(store).await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_document()))
            .mount(&fixture.jwks_mock)
            .await;
        fixture
    }

    /// Creates a fixture whose identity provider publishes no key set
    pub async fn without_signing_keys() -> Self {
        Self::without_signing_keys_and_store(Store::InMemory(InMemoryStore::new())).await
    }

    async fn without_signing_keys_and_store(store: Store) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let jwks_mock = MockServer::start().await;
        let settings = Settings::for_test_with_mocks(&jwks_mock);
        let state = AppState::new(settings.clone(), store).expect("Failed to build app state");
        let app = create_app(state.clone()).await;

        Self {
            app,
            state,
            settings,
            jwks_mock,
        }
    }

    /// Initializes the test logger; repeated calls are ignored
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Everything currently in the store, bypassing the HTTP layer
    pub async fn drinks(&self) -> Vec<Drink> {
        self.state.store.list().await.expect("Failed to list drinks")
    }

    /// Creates a request builder with a JSON content type and an optional bearer token
    pub fn request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        token: Option<&str>,
    ) -> http::request::Builder {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder
    }

    pub async fn get(&self, uri: impl AsRef<str>, token: Option<&str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri, token)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        token: Option<&str>,
        body: &T,
    ) -> TestResponse {
        self.send_json(Method::POST, uri, token, body).await
    }

    pub async fn patch<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        token: Option<&str>,
        body: &T,
    ) -> TestResponse {
        self.send_json(Method::PATCH, uri, token, body).await
    }

    pub async fn delete(&self, uri: impl AsRef<str>, token: Option<&str>) -> TestResponse {
        let request = self
            .request_builder(Method::DELETE, uri, token)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    async fn send_json<T: Serialize>(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        token: Option<&str>,
        body: &T,
    ) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(method, uri, token)
            .body(Body::from(json_body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Sends a request with a verbatim `Authorization` header value and body
    pub async fn send_raw(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        authorization: Option<&str>,
        body: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json");
        if let Some(authorization) = authorization {
            builder = builder.header("Authorization", authorization);
        }
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_default();
        let request = builder.body(body).expect("Failed to build request");
        self.send(request).await
    }

    /// Sends a request and returns a TestResponse.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Non-JSON bodies (e.g. the Scalar page) become an empty object
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| json!({}))
        } else {
            json!({})
        };

        TestResponse { status, json }
    }
}

/// Mints RS256 tokens the way the identity provider would
pub struct TokenBuilder {
    permissions: Option<Value>,
    key_id: Option<String>,
    foreign_key: bool,
    expired: bool,
    audience: String,
    issuer: String,
}

impl TokenBuilder {
    /// A valid token for the test settings carrying `permissions`
    pub fn new(permissions: &[&str]) -> Self {
        Self {
            permissions: Some(json!(permissions)),
            key_id: Some(SIGNING_KEY_ID.to_string()),
            foreign_key: false,
            expired: false,
            audience: "drinks".to_string(),
            issuer: "https://drinks-test.eu.auth0.com/".to_string(),
        }
    }

    pub fn without_key_id(mut self) -> Self {
        self.key_id = None;
        self
    }

    pub fn key_id(mut self, kid: &str) -> Self {
        self.key_id = Some(kid.to_string());
        self
    }

    /// Signs with a key the identity provider never published
    pub fn signed_with_foreign_key(mut self) -> Self {
        self.foreign_key = true;
        self
    }

    pub fn expired(mut self) -> Self {
        self.expired = true;
        self
    }

    pub fn audience(mut self, audience: &str) -> Self {
        self.audience = audience.to_string();
        self
    }

    pub fn issuer(mut self, issuer: &str) -> Self {
        self.issuer = issuer.to_string();
        self
    }

    pub fn without_permissions(mut self) -> Self {
        self.permissions = None;
        self
    }

    /// Replaces the `permissions` claim with an arbitrary JSON value
    pub fn permissions_claim(mut self, value: Value) -> Self {
        self.permissions = Some(value);
        self
    }

    pub fn sign(self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Clock before epoch")
            .as_secs();
        let exp = if self.expired { now - 3600 } else { now + 3600 };

        let mut claims = json!({
            "iss": self.issuer,
            "aud": self.audience,
            "sub": "auth0|test-user",
            "iat": now,
            "exp": exp,
        });
        if let Some(permissions) = self.permissions {
            claims["permissions"] = permissions;
        }

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id;

        let pem = if self.foreign_key {
            FOREIGN_KEY_PEM
        } else {
            SIGNING_KEY_PEM
        };
        let key = EncodingKey::from_rsa_pem(pem).expect("Invalid test key");
        encode(&header, &claims, &key).expect("Failed to sign token")
    }
}

/// Response from a test request that provides convenient access to status and JSON body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Shorthand for `assert_status(StatusCode::OK)`
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Converts the response body to the specified type.
    ///
    /// # Panics
    ///
    /// Panics if deserialization fails.
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}
