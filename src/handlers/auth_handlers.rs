use std::net::{IpAddr, Ipv4Addr};

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::api::ApiClient;
use crate::auth::rate_limit::LoginThrottle;
use crate::auth::session::{flash, is_logged_in, store_login};
use crate::auth::{csrf, validate};
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::models::user::{LoginRequest, RegisterRequest, queries};
use crate::templates_structs::{LoginTemplate, RegisterTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn client_ip(req: &HttpRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn login_template(config: &AppConfig, session: &Session, error: Option<String>, email: &str) -> LoginTemplate {
    LoginTemplate {
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(session),
        error,
        email: email.to_string(),
    }
}

pub async fn login_page(config: web::Data<AppConfig>, session: Session) -> Result<HttpResponse, AppError> {
    if is_logged_in(&session) {
        return Ok(redirect("/dashboard"));
    }
    render(login_template(&config, &session, None, ""))
}

pub async fn login_submit(
    req: HttpRequest,
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    throttle: web::Data<LoginThrottle>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Throttle check BEFORE any backend call
    let ip = client_ip(&req);
    if throttle.is_blocked(ip) {
        let error = "Muitas tentativas de login. Tente novamente mais tarde.".to_string();
        return render(login_template(&config, &session, Some(error), &form.email));
    }

    let errors = validate::collect([
        validate::validate_email(&form.email),
        validate::validate_required(&form.password, "Senha", 256),
    ]);
    if let Some(first) = errors.into_iter().next() {
        return render(login_template(&config, &session, Some(first), &form.email));
    }

    let request = LoginRequest {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    };
    match queries::login(&api, &request).await {
        Ok(response) => {
            throttle.clear(ip);
            store_login(&session, &response.token, &response.user)?;
            log::info!("user {} logged in", response.user.id);
            Ok(redirect("/dashboard"))
        }
        Err(e) => {
            if e.status().is_some() {
                throttle.record_failure(ip);
            }
            log::warn!("login failed for {}: {e}", request.email);
            render(login_template(&config, &session, Some(e.message().to_string()), &form.email))
        }
    }
}

pub async fn register_page(config: web::Data<AppConfig>, session: Session) -> Result<HttpResponse, AppError> {
    if is_logged_in(&session) {
        return Ok(redirect("/dashboard"));
    }
    render(RegisterTemplate {
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(&session),
        errors: vec![],
        name: String::new(),
        email: String::new(),
    })
}

pub async fn register_submit(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors = validate::collect([
        validate::validate_required(&form.name, "Nome", 100),
        validate::validate_email(&form.email),
        validate::validate_password(&form.password),
    ]);
    if form.password != form.confirm_password {
        errors.push("As senhas não conferem.".to_string());
    }

    if errors.is_empty() {
        let request = RegisterRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        match queries::register(&api, &request).await {
            Ok(()) => {
                flash(&session, "Cadastro realizado. Faça login para continuar.");
                return Ok(redirect("/login"));
            }
            Err(e) => errors.push(e.message().to_string()),
        }
    }

    render(RegisterTemplate {
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(&session),
        errors,
        name: form.name.clone(),
        email: form.email.clone(),
    })
}

pub async fn logout(session: Session, form: web::Form<CsrfOnly>) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(redirect("/login"))
}
