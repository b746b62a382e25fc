use crate::helpers::{assert_is_redirect_to, provider_error, spawn_app, SIGN_IN_PATH};

use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn an_error_flash_message_is_set_on_failure() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .respond_with(provider_error("INVALID_LOGIN_CREDENTIALS"))
        .expect(1)
        .mount(&app.identity_server)
        .await;

    let response = app
        .post_login(&serde_json::json!({
            "email": "unknown@example.com",
            "password": "password",
        }))
        .await;

    assert_is_redirect_to(&response, "/login");

    let html_page = app.get_login_html().await;
    assert!(html_page.contains("<p><i>Authentication failed</i></p>"));

    let html_page = app.get_login_html().await;
    assert!(!html_page.contains("Authentication failed"));
}

#[tokio::test]
async fn an_invalid_email_never_reaches_the_identity_provider() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.identity_server)
        .await;

    let response = app
        .post_login(&serde_json::json!({
            "email": "not-an-email",
            "password": "password",
        }))
        .await;

    assert_is_redirect_to(&response, "/login");
    assert!(app.get_login_html().await.contains("Authentication failed"));
}

#[tokio::test]
async fn redirect_to_profile_after_login_success() {
    let app = spawn_app().await;

    let response = app.login().await;
    assert_is_redirect_to(&response, "/profile");

    let html_page = app.get_profile_html().await;
    assert!(html_page.contains(&format!("Signed in as {}", app.test_user.email)));
}

#[tokio::test]
async fn login_fails_with_500_if_the_identity_provider_is_down() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&app.identity_server)
        .await;

    let response = app
        .post_login(&serde_json::json!({
            "email": &app.test_user.email,
            "password": &app.test_user.password,
        }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn logout_clears_session_state() {
    let app = spawn_app().await;

    let response = app.login().await;
    assert_is_redirect_to(&response, "/profile");

    let response = app.post_logout().await;
    assert_is_redirect_to(&response, "/login");

    let html_page = app.get_login_html().await;
    assert!(html_page.contains("<p><i>You have successfully logged out.</i></p>"));

    let response = app.get_profile().await;
    assert_is_redirect_to(&response, "/login");
}

#[tokio::test]
async fn an_expired_session_counts_as_logged_out() {
    let app = spawn_app().await;

    app.mock_sign_in("0").await;
    let response = app
        .post_login(&serde_json::json!({
            "email": &app.test_user.email,
            "password": &app.test_user.password,
        }))
        .await;
    assert_is_redirect_to(&response, "/profile");

    let response = app.get_profile().await;
    assert_is_redirect_to(&response, "/login");
}

#[tokio::test]
async fn a_locked_or_disabled_account_cannot_log_in() {
    let rejections = vec![
        "TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled",
        "USER_DISABLED : The user account has been disabled by an administrator.",
    ];

    for rejection in rejections {
        let app = spawn_app().await;

        Mock::given(method("POST"))
            .and(path(SIGN_IN_PATH))
            .respond_with(provider_error(rejection))
            .expect(1)
            .mount(&app.identity_server)
            .await;

        let response = app
            .post_login(&serde_json::json!({
                "email": &app.test_user.email,
                "password": &app.test_user.password,
            }))
            .await;

        assert_is_redirect_to(&response, "/login");
        assert!(
            app.get_login_html().await.contains("<p><i>Authentication failed</i></p>"),
            "{} was not reported as a failed login",
            rejection,
        );

        let response = app.get_profile().await;
        assert_is_redirect_to(&response, "/login");
    }
}

#[tokio::test]
async fn an_out_of_range_token_lifetime_fails_the_login_with_500() {
    for expires_in in ["9223372036854775807", "-60"] {
        let app = spawn_app().await;

        app.mock_sign_in(expires_in).await;
        let response = app
            .post_login(&serde_json::json!({
                "email": &app.test_user.email,
                "password": &app.test_user.password,
            }))
            .await;
        assert_eq!(response.status().as_u16(), 500, "expiresIn {}", expires_in);

        let response = app.get_profile().await;
        assert_is_redirect_to(&response, "/login");
    }
}

#[tokio::test]
async fn a_malformed_email_from_the_identity_provider_is_never_rendered() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "localId": "test-user-id",
            "email": "<script>alert(1)</script>@example.com",
            "idToken": &app.test_user.id_token,
            "expiresIn": "3600",
        })))
        .expect(1)
        .mount(&app.identity_server)
        .await;

    app.post_login(&serde_json::json!({
        "email": &app.test_user.email,
        "password": &app.test_user.password,
    }))
    .await;

    let response = app.get_profile().await;
    assert_is_redirect_to(&response, "/login");

    let html_page = app.get_login_html().await;
    assert!(!html_page.contains("<script>"));
}
