//! Account routes - overview, selector dialog, account edit and delete
//!
//! Structure:
//! - api.rs: Selector dialog fragment and the delete confirmation step
//! - page.rs: Account overview and account edit pages

pub mod api;
pub mod page;

pub use api::{htmx_account_delete, htmx_account_select};
pub use page::{page_account_edit, page_account_view};
