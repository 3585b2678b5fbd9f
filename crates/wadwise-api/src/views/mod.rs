//! View functions rendering core form state to HTML
//!
//! Each island view has three parts: `restore` rebuilds the reactive form
//! from posted fields, an action step mutates it, and `render` turns it
//! back into markup carrying the full state in (mostly hidden) inputs.

pub mod account_edit;
pub mod account_view;
pub mod import;
pub mod selector;
pub mod settings;
pub mod transaction;

use rust_decimal::Decimal;
use wadwise_config::Config;
use wadwise_core::AccountMap;

use crate::islands::IslandContext;
use crate::Snapshot;

/// Rendering inputs shared by every view
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub snapshot: &'a Snapshot,
    pub config: &'a Config,
}

impl<'a> ViewContext<'a> {
    pub fn new(snapshot: &'a Snapshot, config: &'a Config) -> Self {
        Self { snapshot, config }
    }

    pub fn accounts(&self) -> &'a AccountMap {
        &self.snapshot.accounts
    }

    pub fn title(&self, id: &str) -> String {
        self.snapshot.accounts.title(id)
    }

    pub fn currencies(&self) -> Vec<String> {
        self.snapshot.data.currencies(&self.config.currency.default_list)
    }

    pub fn places(&self) -> u32 {
        self.config.currency.decimal_places
    }

    /// Absolute URL of a backend path, used as the real form POST target
    pub fn backend(&self, path: &str) -> String {
        self.config.backend.url(path)
    }
}

impl<'a> From<&IslandContext<'a>> for ViewContext<'a> {
    fn from(ctx: &IslandContext<'a>) -> Self {
        Self::new(ctx.snapshot, ctx.config)
    }
}

/// Amount as typed into an input: no trailing zeros, zero stays `0`
pub fn amount_text(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// `(code, code)` options for a currency `<select>`
pub fn currency_options(currencies: &[String], selected: &str) -> Vec<(String, String)> {
    let mut options: Vec<(String, String)> = currencies.iter().map(|c| (c.clone(), c.clone())).collect();
    if !selected.is_empty() && !currencies.iter().any(|c| c == selected) {
        options.push((selected.to_string(), selected.to_string()));
    }
    options
}
