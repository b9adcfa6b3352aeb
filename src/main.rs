use actix_files::Files;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use formflow_console::api::ApiClient;
use formflow_console::auth::rate_limit::LoginThrottle;
use formflow_console::autosave::DraftSaves;
use formflow_console::config::AppConfig;
use formflow_console::handlers;

fn session_key(config: &AppConfig) -> Key {
    match config.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let config = AppConfig::from_env();

    let api = ApiClient::new(config.api_url.clone()).map_err(std::io::Error::other)?;
    let secret_key = session_key(&config);
    let throttle = LoginThrottle::default();
    let drafts = DraftSaves::new(config.autosave_delay);
    let bind_addr = config.bind_addr.clone();

    log::info!("Starting {} at http://{bind_addr} (backend {})", config.app_name, config.api_url);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
            .cookie_secure(false)
            .cookie_http_only(true)
            .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(api.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(throttle.clone()))
            .app_data(web::Data::new(drafts.clone()))
            // Static files
            .service(Files::new("/static", "./static"))
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
