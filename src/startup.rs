use crate::authentication::RejectAnonymousUsers;
use crate::configuration::{SessionStoreSettings, Settings};
use crate::identity_provider::IdentityProviderClient;
use crate::routes::profile::{change_password, log_out, profile_form};
use crate::routes::{change_password_api, health_check, home, login, login_form};

use actix_session::storage::{CookieSessionStore, RedisSessionStore, SessionStore};
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let identity_client = configuration.identity_provider.client()?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind to {}.", address))?;
        let port = listener.local_addr()?.port();

        let server = run(
            listener,
            identity_client,
            configuration.application.hmac_secret,
            configuration.session_store,
        )
        .await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub async fn run(
    listener: TcpListener,
    identity_client: IdentityProviderClient,
    hmac_secret: Secret<String>,
    session_store: SessionStoreSettings,
) -> Result<Server, anyhow::Error> {
    let identity_client = web::Data::new(identity_client);
    let secret_key = Key::from(hmac_secret.expose_secret().as_bytes());

    match session_store {
        SessionStoreSettings::Redis { uri } => {
            let redis_store = RedisSessionStore::new(uri.expose_secret()).await?;
            serve(listener, identity_client, secret_key, move || {
                redis_store.clone()
            })
        }
        SessionStoreSettings::Cookie => serve(
            listener,
            identity_client,
            secret_key,
            CookieSessionStore::default,
        ),
    }
}

fn serve<S, F>(
    listener: TcpListener,
    identity_client: web::Data<IdentityProviderClient>,
    secret_key: Key,
    session_store: F,
) -> Result<Server, anyhow::Error>
where
    S: SessionStore + 'static,
    F: Fn() -> S + Clone + Send + 'static,
{
    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(SessionMiddleware::new(session_store(), secret_key.clone()))
            .wrap(TracingLogger::default())
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .route("/login", web::get().to(login_form))
            .route("/login", web::post().to(login))
            .service(
                web::scope("/profile")
                    .wrap(RejectAnonymousUsers::redirect_to_login())
                    .route("", web::get().to(profile_form))
                    .route("/password", web::post().to(change_password))
                    .route("/logout", web::post().to(log_out)),
            )
            .service(
                web::scope("/api")
                    .wrap(RejectAnonymousUsers::unauthorized())
                    .route("/password", web::post().to(change_password_api)),
            )
            .app_data(identity_client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
