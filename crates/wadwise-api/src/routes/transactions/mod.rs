//! Transaction routes - editor page and island round-trips
//!
//! Structure:
//! - api.rs: `POST /transaction/form`, `POST /transaction/submit`
//! - page.rs: `GET /transaction/edit`

pub mod api;
pub mod page;

pub use api::{htmx_transaction_form, transaction_submit};
pub use page::page_transaction_edit;
