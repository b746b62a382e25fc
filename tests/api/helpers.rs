use once_cell::sync::Lazy;
use secrecy::Secret;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profile_form::configuration::{get_configuration, SessionStoreSettings};
use profile_form::startup::Application;
use profile_form::telemetry::{get_subscriber, init_subscriber};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to initialize tracing.");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).expect("Failed to initialize tracing.");
    };
});

pub const CHANGE_PASSWORD_PATH: &str = "/v1/accounts:update";
pub const SIGN_IN_PATH: &str = "/v1/accounts:signInWithPassword";

pub struct TestUser {
    pub email: String,
    pub password: String,
    pub id_token: String,
}

impl TestUser {
    pub fn generate() -> Self {
        Self {
            email: format!("{}@example.com", Uuid::new_v4()),
            password: Uuid::new_v4().to_string(),
            id_token: format!("id-token-{}", Uuid::new_v4()),
        }
    }
}

pub struct TestApp {
    pub address: String,
    pub identity_server: MockServer,
    pub api_token: String,
    pub api_client: reqwest::Client,
    pub test_user: TestUser,
}

impl TestApp {
    /// Makes the identity provider accept the test user's credentials.
    pub async fn mock_sign_in(&self, expires_in: &str) {
        Mock::given(method("POST"))
            .and(path(SIGN_IN_PATH))
            .and(body_json(serde_json::json!({
                "email": &self.test_user.email,
                "password": &self.test_user.password,
                "returnSecureToken": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "identitytoolkit#VerifyPasswordResponse",
                "localId": "test-user-id",
                "email": &self.test_user.email,
                "displayName": "",
                "idToken": &self.test_user.id_token,
                "registered": true,
                "refreshToken": "refresh-token",
                "expiresIn": expires_in,
            })))
            .mount(&self.identity_server)
            .await;
    }

    pub async fn login(&self) -> reqwest::Response {
        self.mock_sign_in("3600").await;

        self.post_login(&serde_json::json!({
            "email": &self.test_user.email,
            "password": &self.test_user.password,
        }))
        .await
    }

    pub async fn post_login<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(&format!("{}/login", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_login_html(&self) -> String {
        self.api_client
            .get(&format!("{}/login", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
            .text()
            .await
            .unwrap()
    }

    pub async fn get_profile(&self) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/profile", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_profile_html(&self) -> String {
        self.get_profile().await.text().await.unwrap()
    }

    pub async fn post_change_password<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(&format!("{}/profile/password", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_api_password<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(&format!("{}/api/password", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_logout(&self) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/profile/logout", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let identity_server = MockServer::start().await;
    let api_token = Uuid::new_v4().to_string();

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = 0;
        c.identity_provider.change_password_url =
            format!("{}{}?key=", identity_server.uri(), CHANGE_PASSWORD_PATH);
        c.identity_provider.sign_in_url =
            format!("{}{}?key=", identity_server.uri(), SIGN_IN_PATH);
        c.identity_provider.api_token = Secret::new(api_token.clone());
        c.identity_provider.timeout_milliseconds = 2000;
        c.session_store = SessionStoreSettings::Cookie;
        c
    };

    let application = Application::build(configuration)
        .await
        .expect("Failed to build application.");
    let port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        identity_server,
        api_token,
        api_client,
        test_user: TestUser::generate(),
    }
}

pub fn provider_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(serde_json::json!({
        "error": {
            "code": 400,
            "message": message,
            "errors": [{ "message": message, "domain": "global", "reason": "invalid" }],
        }
    }))
}

pub fn password_changed() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "kind": "identitytoolkit#SetAccountInfoResponse",
        "localId": "test-user-id",
        "email": "ignored@example.com",
        "passwordHash": "UkVEQUNURUQ=",
        "providerUserInfo": [],
    }))
}

pub fn assert_is_redirect_to(response: &reqwest::Response, location: &str) {
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(response.headers().get("Location").unwrap(), location)
}
