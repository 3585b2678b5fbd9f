//! Settings routes - favorites, joint accounts and currencies
//!
//! Structure:
//! - api.rs: `POST /settings/form`
//! - page.rs: `GET /settings`

pub mod api;
pub mod page;

pub use api::htmx_settings_form;
pub use page::page_settings;
