//! Import routes - reconciliation of a pending bank import
//!
//! Structure:
//! - api.rs: `POST /import/form`, `POST /import/submit`
//! - page.rs: `GET /import`

pub mod api;
pub mod page;

pub use api::{htmx_import_form, import_submit};
pub use page::page_import;
