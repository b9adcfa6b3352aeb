pub mod dashboard;
pub mod envelope;
pub mod fields;
pub mod form;
pub mod menu;
pub mod pagination;
pub mod submission;
pub mod user;
