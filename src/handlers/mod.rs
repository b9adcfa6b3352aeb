pub mod account_handlers;
pub mod auth_handlers;
pub mod dashboard;
pub mod form_handlers;
pub mod menu_handlers;
pub mod submission_handlers;

use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, web};

use crate::auth::middleware::{require_auth, require_json_content_type};
use crate::errors;

/// Register every console route. Shared state (`ApiClient`, `AppConfig`,
/// `LoginThrottle`, `DraftSaves`) is expected as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/register", web::get().to(auth_handlers::register_page))
        .route("/register", web::post().to(auth_handlers::register_submit))
        // Root redirect
        .route("/", web::get().to(|| async {
            HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish()
        }))
        // Protected routes
        .service(
            web::scope("")
                .wrap(from_fn(require_auth))
                .route("/dashboard", web::get().to(dashboard::index))
                .route("/logout", web::post().to(auth_handlers::logout))
                // Account
                .route("/account", web::get().to(account_handlers::form))
                .route("/account", web::post().to(account_handlers::submit))
                // Forms: /forms/new BEFORE /forms/{id}
                .route("/forms", web::get().to(form_handlers::list))
                .route("/forms/new", web::get().to(form_handlers::new_form))
                .route("/forms", web::post().to(form_handlers::create))
                .route("/forms/{id}", web::get().to(form_handlers::detail))
                .route("/forms/{id}/edit", web::get().to(form_handlers::edit_form))
                .route("/forms/{id}", web::post().to(form_handlers::update))
                .route("/forms/{id}/delete", web::post().to(form_handlers::delete))
                .route("/forms/{id}/fill", web::get().to(form_handlers::fill_form))
                .route("/forms/{id}/fill", web::post().to(form_handlers::fill_submit))
                .route("/forms/{id}/submissions", web::get().to(form_handlers::submissions))
                // Menus: JSON reorder and /menus/new BEFORE /menus/{id}
                .service(
                    web::resource("/menus/reorder")
                        .wrap(from_fn(require_json_content_type))
                        .route(web::post().to(menu_handlers::reorder)),
                )
                .route("/menus", web::get().to(menu_handlers::list))
                .route("/menus/new", web::get().to(menu_handlers::new_form))
                .route("/menus", web::post().to(menu_handlers::create))
                .route("/menus/{id}/edit", web::get().to(menu_handlers::edit_form))
                .route("/menus/{id}", web::post().to(menu_handlers::update))
                .route("/menus/{id}/delete", web::post().to(menu_handlers::delete))
                .route("/embed/{id}", web::get().to(menu_handlers::embed))
                // Submissions
                .route("/submissions", web::get().to(submission_handlers::list))
                .route("/my-submissions", web::get().to(submission_handlers::mine))
                .route("/submissions/{id}", web::get().to(submission_handlers::detail))
                .route("/submissions/{id}/edit", web::get().to(submission_handlers::edit_form))
                .route("/submissions/{id}", web::post().to(submission_handlers::update))
                .route("/submissions/{id}/actions/{action}", web::post().to(submission_handlers::action))
                .route("/submissions/{id}/delete", web::post().to(submission_handlers::delete))
                .service(
                    web::resource("/submissions/{id}/draft")
                        .wrap(from_fn(require_json_content_type))
                        .route(web::post().to(submission_handlers::autosave)),
                )
                .service(
                    web::resource("/submissions/{id}/draft/discard")
                        .wrap(from_fn(require_json_content_type))
                        .route(web::post().to(submission_handlers::discard_draft)),
                ),
        )
        // Default 404 handler (must be registered last)
        .default_service(web::to(errors::not_found));
}
