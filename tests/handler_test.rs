//! HTTP-level tests: routing, the auth gate, CSRF, and a full login against
//! a mocked backend.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::json;

use formflow_console::api::ApiClient;
use formflow_console::auth::rate_limit::LoginThrottle;
use formflow_console::autosave::DraftSaves;
use formflow_console::config::AppConfig;
use formflow_console::handlers;

const BACKEND_TOKEN: &str = "jwt-abc";

fn test_config(api_url: &str) -> AppConfig {
    AppConfig {
        api_url: api_url.to_string(),
        ..AppConfig::default()
    }
}

/// Build the console app against `api_url`, as `main` wires it.
macro_rules! console {
    ($api_url:expr) => {{
        let config = test_config($api_url);
        let api = ApiClient::new(config.api_url.clone()).expect("Failed to build client");
        test::init_service(
            App::new()
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .app_data(web::Data::new(api))
                .app_data(web::Data::new(DraftSaves::new(config.autosave_delay)))
                .app_data(web::Data::new(LoginThrottle::default()))
                .app_data(web::Data::new(config))
                .configure(handlers::configure),
        )
        .await
    }};
}

/// Open the login page; yields the session cookie and its CSRF token.
macro_rules! open_login {
    ($app:expr) => {{
        let resp = test::call_service($app, test::TestRequest::get().uri("/login").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp).expect("Login page should start a session");
        let token = csrf_from(&body_text(resp).await);
        (cookie, token)
    }};
}

fn location(resp: &ServiceResponse) -> Option<&str> {
    resp.headers().get("Location").and_then(|v| v.to_str().ok())
}

fn session_cookie(resp: &ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "id")
        .map(|c| c.into_owned())
}

fn csrf_from(html: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker).expect("Login page should carry a CSRF token") + marker.len();
    html[start..].chars().take_while(|c| *c != '"').collect()
}

async fn body_text(resp: ServiceResponse) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

#[actix_web::test]
async fn test_protected_pages_redirect_to_login() {
    let app = console!("http://127.0.0.1:1");

    for uri in ["/dashboard", "/forms", "/menus", "/submissions", "/account"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&resp), Some("/login"), "{uri}");
    }
}

#[actix_web::test]
async fn test_root_redirects_to_dashboard() {
    let app = console!("http://127.0.0.1:1");
    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/dashboard"));
}

#[actix_web::test]
async fn test_login_page_renders_with_csrf_token() {
    let app = console!("http://127.0.0.1:1");
    let (_, token) = open_login!(&app);

    assert_eq!(token.len(), 64);
}

#[actix_web::test]
async fn test_login_rejects_wrong_csrf_token() {
    let app = console!("http://127.0.0.1:1");
    let (cookie, _) = open_login!(&app);

    let req = test::TestRequest::post()
        .uri("/login")
        .cookie(cookie)
        .set_form(vec![("email", "ana@example.com"), ("password", "segredo"), ("csrf_token", "forjado")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_failed_login_shows_backend_message() {
    let mut backend = mockito::Server::new_async().await;
    backend
        .mock("POST", "/Auth/login")
        .with_status(401)
        .with_body(r#"{"message":"Credenciais inválidas"}"#)
        .create_async()
        .await;

    let app = console!(&backend.url());
    let (cookie, token) = open_login!(&app);

    let req = test::TestRequest::post()
        .uri("/login")
        .cookie(cookie)
        .set_form(vec![("email", "ana@example.com"), ("password", "errada"), ("csrf_token", token.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Credenciais inválidas"));
}

#[actix_web::test]
async fn test_login_then_dashboard() {
    let mut backend = mockito::Server::new_async().await;
    let login = backend
        .mock("POST", "/Auth/login")
        .match_body(mockito::Matcher::Json(json!({ "email": "ana@example.com", "password": "segredo" })))
        .with_status(200)
        .with_body(
            json!({
                "token": BACKEND_TOKEN,
                "user": { "id": 10, "name": "Ana", "email": "ana@example.com", "role": "admin" }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let bearer = format!("Bearer {BACKEND_TOKEN}");
    backend
        .mock("GET", "/Forms")
        .match_header("authorization", bearer.as_str())
        .with_body(r#"[{"id":1,"name":"Férias","schemaJson":"{}","version":"1","isLatest":true}]"#)
        .create_async()
        .await;
    backend
        .mock("GET", "/Menus")
        .match_header("authorization", bearer.as_str())
        .with_body(r#"{"itens":[{"id":3,"name":"Relatórios","contentType":"route","urlOrPath":"/relatorios","order":1}]}"#)
        .create_async()
        .await;
    backend
        .mock("GET", "/SubmissoesFormulario/estatisticas")
        .with_status(500)
        .create_async()
        .await;

    let app = console!(&backend.url());
    let (cookie, token) = open_login!(&app);

    let req = test::TestRequest::post()
        .uri("/login")
        .cookie(cookie)
        .set_form(vec![("email", "ana@example.com"), ("password", "segredo"), ("csrf_token", token.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/dashboard"));
    let cookie = session_cookie(&resp).expect("Login should renew the session");
    login.assert_async().await;

    let req = test::TestRequest::get().uri("/dashboard").cookie(cookie.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Ana"));
    assert!(html.contains("Relatórios"));

    // Logged in: the login page bounces back and unknown routes are 404.
    let req = test::TestRequest::get().uri("/login").cookie(cookie.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), Some("/dashboard"));

    let req = test::TestRequest::get().uri("/nao-existe").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_json_endpoints_require_json_content_type() {
    let mut backend = mockito::Server::new_async().await;
    backend
        .mock("POST", "/Auth/login")
        .with_body(
            json!({
                "token": BACKEND_TOKEN,
                "user": { "id": 10, "name": "Ana", "email": "ana@example.com", "role": "admin" }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let writes = backend.mock("PUT", mockito::Matcher::Any).expect(0).create_async().await;

    let app = console!(&backend.url());
    let (cookie, token) = open_login!(&app);
    let req = test::TestRequest::post()
        .uri("/login")
        .cookie(cookie)
        .set_form(vec![("email", "ana@example.com"), ("password", "segredo"), ("csrf_token", token.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp).expect("Login should renew the session");

    let req = test::TestRequest::post()
        .uri("/menus/reorder")
        .cookie(cookie)
        .set_form(vec![("parentId", ""), ("orderedIds", "1")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    writes.assert_async().await;
}
