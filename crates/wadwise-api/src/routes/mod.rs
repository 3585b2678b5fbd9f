//! Route modules for the API server
//!
//! Each module follows the same structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: HTMX island round-trips and fragments
//! - page.rs: Full page rendering

pub mod accounts;
pub mod import;
pub mod settings;
pub mod transactions;
