//! FormFlow console: a server-rendered administration UI for the FormFlow
//! REST backend. Forms, menus and submission workflows live in the backend;
//! this process renders pages, holds the session and calls the API.

pub mod api;
pub mod auth;
pub mod autosave;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod templates_structs;
