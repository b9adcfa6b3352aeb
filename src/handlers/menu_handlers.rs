use actix_session::Session;
use actix_web::{HttpResponse, http::StatusCode, web};
use serde::Deserialize;

use crate::api::{ApiClient, ApiError};
use crate::auth::session::{api_for, current_user, flash, flash_error, require_elevated};
use crate::auth::{csrf, validate};
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::menu::{self, ContentType, MenuInput, MenuItem, build_tree, flatten};
use crate::templates_structs::{
    ContentTypeOption, EmbedTemplate, MenuFormTemplate, MenuListTemplate, MenuRow, PageContext, ParentOption,
};

#[derive(Deserialize)]
pub struct MenuForm {
    pub name: String,
    pub content_type: String,
    #[serde(default)]
    pub url_or_path: String,
    #[serde(default)]
    pub roles_allowed: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub order: String,
    pub is_active: Option<String>,
    pub is_visible: Option<String>,
    #[serde(default)]
    pub icon: String,
    pub csrf_token: String,
}

/// JSON body of a drag-and-drop reorder.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub parent_id: Option<i64>,
    pub ordered_ids: Vec<i64>,
}

fn parse_input(form: &MenuForm, editing: Option<i64>) -> Result<MenuInput, Vec<String>> {
    let mut errors = validate::collect([validate::validate_required(&form.name, "Nome", 100)]);

    let content_type = ContentType::parse(&form.content_type);
    if content_type.is_none() {
        errors.push("Tipo de conteúdo inválido.".to_string());
    }
    let url_or_path = form.url_or_path.trim().to_string();
    if url_or_path.is_empty() {
        errors.push("URL ou caminho é obrigatório.".to_string());
    }
    if content_type == Some(ContentType::Form) && url_or_path.parse::<i64>().is_err() {
        errors.push("Para itens de formulário, informe o id do formulário.".to_string());
    }

    let parent_id = match form.parent_id.trim() {
        "" => None,
        raw => match raw.parse::<i64>() {
            Ok(id) if Some(id) == editing => {
                errors.push("Um item não pode ser pai de si mesmo.".to_string());
                None
            }
            Ok(id) => Some(id),
            Err(_) => {
                errors.push("Item pai inválido.".to_string());
                None
            }
        },
    };
    let order = match form.order.trim() {
        "" => 0,
        raw => raw.parse::<i32>().unwrap_or_else(|_| {
            errors.push("Ordem deve ser um número inteiro.".to_string());
            0
        }),
    };

    match content_type {
        Some(content_type) if errors.is_empty() => Ok(MenuInput {
            name: form.name.trim().to_string(),
            content_type,
            url_or_path,
            roles_allowed: form.roles_allowed.trim().to_string(),
            parent_id,
            order,
            is_active: form.is_active.is_some(),
            is_visible: form.is_visible.is_some(),
            icon: Some(form.icon.trim().to_string()).filter(|i| !i.is_empty()),
        }),
        _ => Err(errors),
    }
}

fn parent_options(items: &[MenuItem], selected: Option<i64>, exclude: Option<i64>) -> Vec<ParentOption> {
    let tree = build_tree(items);
    flatten(&tree)
        .into_iter()
        .filter(|(_, item)| Some(item.id) != exclude)
        .map(|(depth, item)| ParentOption {
            id: item.id,
            label: format!("{}{}", "— ".repeat(depth), item.name),
            selected: Some(item.id) == selected,
        })
        .collect()
}

struct FormPage {
    action: String,
    title: String,
    editing: Option<i64>,
}

async fn render_form(
    session: &Session,
    api: &ApiClient,
    config: &AppConfig,
    page: FormPage,
    values: MenuInput,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let items = menu::find_all(api).await.unwrap_or_else(|e| {
        log::warn!("parent menu list unavailable: {e}");
        Vec::new()
    });
    let ctx = PageContext::build(session, api, config, "/menus").await?;
    render(MenuFormTemplate {
        ctx,
        form_action: page.action,
        form_title: page.title,
        name: values.name,
        content_types: ContentTypeOption::all(values.content_type),
        url_or_path: values.url_or_path,
        roles_allowed: values.roles_allowed,
        parents: parent_options(&items, values.parent_id, page.editing),
        order: values.order,
        is_active: values.is_active,
        is_visible: values.is_visible,
        icon: values.icon.unwrap_or_default(),
        errors,
    })
}

/// Echo a rejected form back with whatever could be read from it.
fn echo(form: &MenuForm) -> MenuInput {
    MenuInput {
        name: form.name.clone(),
        content_type: ContentType::parse(&form.content_type).unwrap_or_default(),
        url_or_path: form.url_or_path.clone(),
        roles_allowed: form.roles_allowed.clone(),
        parent_id: form.parent_id.trim().parse().ok(),
        order: form.order.trim().parse().unwrap_or(0),
        is_active: form.is_active.is_some(),
        is_visible: form.is_visible.is_some(),
        icon: Some(form.icon.clone()),
    }
}

pub async fn list(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    let api = api_for(&session, &api)?;
    let mut ctx = PageContext::build(&session, &api, &config, "/menus").await?;

    let rows = match menu::find_all(&api).await {
        Ok(items) => {
            let tree = build_tree(&items);
            flatten(&tree).into_iter().map(|(depth, item)| MenuRow::new(depth, item)).collect()
        }
        Err(e) => {
            ctx.flash_error = Some(e.message().to_string());
            Vec::new()
        }
    };
    render(MenuListTemplate { ctx, rows })
}

pub async fn new_form(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    let api = api_for(&session, &api)?;
    let blank = MenuInput {
        name: String::new(),
        content_type: ContentType::Route,
        url_or_path: String::new(),
        roles_allowed: String::new(),
        parent_id: None,
        order: 0,
        is_active: true,
        is_visible: true,
        icon: None,
    };
    let page = FormPage {
        action: "/menus".to_string(),
        title: "Novo item de menu".to_string(),
        editing: None,
    };
    render_form(&session, &api, &config, page, blank, vec![]).await
}

pub async fn create(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<MenuForm>,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let api = api_for(&session, &api)?;

    let errors = match parse_input(&form, None) {
        Ok(input) => match menu::create(&api, &input).await {
            Ok(()) => {
                flash(&session, "Item de menu criado.");
                return Ok(redirect("/menus"));
            }
            Err(e) => vec![e.message().to_string()],
        },
        Err(errors) => errors,
    };

    let page = FormPage {
        action: "/menus".to_string(),
        title: "Novo item de menu".to_string(),
        editing: None,
    };
    render_form(&session, &api, &config, page, echo(&form), errors).await
}

pub async fn edit_form(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    let id = path.into_inner();
    let api = api_for(&session, &api)?;
    let item = menu::find_by_id(&api, id).await?;

    let values = MenuInput {
        name: item.name,
        content_type: item.content_type,
        url_or_path: item.url_or_path,
        roles_allowed: item.roles_allowed.unwrap_or_default(),
        parent_id: item.parent_id,
        order: item.order,
        is_active: item.is_active,
        is_visible: item.is_visible,
        icon: item.icon,
    };
    let page = FormPage {
        action: format!("/menus/{id}"),
        title: "Editar item de menu".to_string(),
        editing: Some(id),
    };
    render_form(&session, &api, &config, page, values, vec![]).await
}

pub async fn update(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<MenuForm>,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let api = api_for(&session, &api)?;

    let errors = match parse_input(&form, Some(id)) {
        Ok(input) => match menu::update(&api, id, &input).await {
            Ok(()) => {
                flash(&session, "Item de menu atualizado.");
                return Ok(redirect("/menus"));
            }
            Err(e) => vec![e.message().to_string()],
        },
        Err(errors) => errors,
    };

    let page = FormPage {
        action: format!("/menus/{id}"),
        title: "Editar item de menu".to_string(),
        editing: Some(id),
    };
    render_form(&session, &api, &config, page, echo(&form), errors).await
}

pub async fn delete(
    api: web::Data<ApiClient>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let api = api_for(&session, &api)?;

    match menu::delete(&api, id).await {
        Ok(()) => flash(&session, "Item de menu excluído."),
        Err(e) => flash_error(&session, e.message()),
    }
    Ok(redirect("/menus"))
}

/// JSON reorder endpoint. Responds with the canonical list after the
/// attempt, so the page can redraw from it whether or not the writes landed.
pub async fn reorder(
    api: web::Data<ApiClient>,
    session: Session,
    body: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    let api = api_for(&session, &api)?;
    let mut items = menu::find_all(&api).await?;

    match menu::reorder(&api, &mut items, body.parent_id, &body.ordered_ids).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true, "items": items }))),
        Err(e) => {
            let status = match &e {
                ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::Rejected { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                _ => StatusCode::BAD_GATEWAY,
            };
            Ok(HttpResponse::build(status).json(serde_json::json!({
                "ok": false,
                "message": e.message(),
                "items": items,
            })))
        }
    }
}

/// Iframe menu entries render inside the console chrome.
pub async fn embed(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let role = current_user(&session)?.role();
    let api = api_for(&session, &api)?;

    let item = menu::find_by_id(&api, id).await?;
    if item.content_type != ContentType::Iframe || !item.is_active {
        return Err(AppError::NotFound);
    }
    if !item.is_visible_to(role) {
        return Err(AppError::PermissionDenied(format!("menu {id}")));
    }

    let ctx = PageContext::build(&session, &api, &config, &format!("/embed/{id}")).await?;
    render(EmbedTemplate {
        ctx,
        title: item.name,
        url: item.url_or_path,
    })
}
