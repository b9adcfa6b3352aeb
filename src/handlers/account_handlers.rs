use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::api::ApiClient;
use crate::auth::session::{api_for, current_user, flash, store_user};
use crate::auth::{csrf, validate};
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::models::user::{ProfileUpdate, SessionUser, queries};
use crate::templates_structs::{AccountTemplate, PageContext};

#[derive(Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub csrf_token: String,
}

pub async fn form(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    let api = api_for(&session, &api)?;
    let ctx = PageContext::build(&session, &api, &config, "/account").await?;
    render(AccountTemplate {
        ctx,
        errors: vec![],
        name: user.name,
        email: user.email,
    })
}

pub async fn submit(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<ProfileForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let user = current_user(&session)?;
    let api = api_for(&session, &api)?;

    let changing_password = !form.new_password.is_empty();
    let mut errors = validate::collect([
        validate::validate_required(&form.name, "Nome", 100),
        validate::validate_email(&form.email),
    ]);
    if changing_password {
        errors.extend(validate::validate_required(&form.current_password, "Senha atual", 256));
        errors.extend(validate::validate_password(&form.new_password));
        if form.new_password != form.confirm_password {
            errors.push("As senhas não conferem.".to_string());
        }
    }

    if errors.is_empty() {
        let update = ProfileUpdate {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            current_password: changing_password.then(|| form.current_password.clone()),
            new_password: changing_password.then(|| form.new_password.clone()),
        };
        match queries::update_profile(&api, &update).await {
            Ok(returned) => {
                let updated = returned.unwrap_or(SessionUser {
                    name: update.name,
                    email: update.email,
                    ..user
                });
                store_user(&session, &updated)?;
                flash(&session, "Perfil atualizado.");
                return Ok(redirect("/account"));
            }
            Err(e) => errors.push(e.message().to_string()),
        }
    }

    let ctx = PageContext::build(&session, &api, &config, "/account").await?;
    render(AccountTemplate {
        ctx,
        errors,
        name: form.name.clone(),
        email: form.email.clone(),
    })
}
