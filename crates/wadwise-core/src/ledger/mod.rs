//! Transaction editing
//!
//! A [`TransactionForm`] wraps either a [`SimpleForm`] (one source into a
//! fixed destination, with target/no-op/via modes) or a [`SplitForm`]
//! (arbitrary legs) together with the description and date fields, and
//! produces the submission posted to the backend.

pub mod balance;
pub mod ops;
pub mod simple;
pub mod split;
pub mod submit;

pub use balance::{BalanceQuery, BalanceSheet, BalanceSource, StaticBalances};
pub use ops::{op2, Amount, Operation, Payload, SimpleTransfer};
pub use simple::{Mode, SimpleForm, TargetLine};
pub use split::{SplitForm, SplitRow};
pub use submit::{SubmitAction, Submission};

use chrono::NaiveDate;
use log::debug;

use crate::bootstrap::FormDefaults;
use crate::error::{CoreError, CoreResult};
use crate::reactive::Signal;

pub enum Editor {
    Simple(SimpleForm),
    Split(SplitForm),
}

pub struct TransactionForm {
    tid: Option<String>,
    dest: String,
    editor: Editor,
    pub desc: Signal<String>,
    pub date: Signal<NaiveDate>,
    pub date_time: Signal<String>,
}

impl TransactionForm {
    /// Build the editor the defaults ask for.
    ///
    /// `default_account` seeds an empty source and the via account.
    pub fn from_defaults(defaults: &FormDefaults, cur_list: &[String], default_account: &str) -> Self {
        let editor = if defaults.split {
            Editor::Split(SplitForm::new(&defaults.ops, cur_list.to_vec()))
        } else {
            let src = if defaults.src.is_empty() { default_account } else { &defaults.src };
            let cur = if defaults.cur.is_empty() {
                cur_list.first().map(String::as_str).unwrap_or_default()
            } else {
                &defaults.cur
            };
            Editor::Simple(SimpleForm::new(src, &defaults.dest, defaults.amount.0, cur, default_account))
        };

        Self {
            tid: defaults.tid.clone(),
            dest: defaults.dest.clone(),
            editor,
            desc: Signal::new(defaults.desc.clone()),
            date: Signal::new(defaults.date),
            date_time: Signal::new(defaults.date_time.clone()),
        }
    }

    pub fn tid(&self) -> Option<&str> {
        self.tid.as_deref()
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn simple(&self) -> Option<&SimpleForm> {
        match &self.editor {
            Editor::Simple(form) => Some(form),
            Editor::Split(_) => None,
        }
    }

    pub fn split(&self) -> Option<&SplitForm> {
        match &self.editor {
            Editor::Split(form) => Some(form),
            Editor::Simple(_) => None,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self.editor, Editor::Split(_))
    }

    pub fn is_error(&self) -> bool {
        match &self.editor {
            Editor::Simple(form) => form.is_error(),
            Editor::Split(form) => form.is_error(),
        }
    }

    pub fn submit_disabled(&self) -> bool {
        self.is_error()
    }

    /// Submit controls to offer, primary first
    pub fn actions(&self) -> Vec<SubmitAction> {
        let mut actions = vec![SubmitAction::Save];
        if self.tid.is_some() {
            actions.extend(SubmitAction::EXISTING);
        }
        actions
    }

    pub fn serialized(&self) -> String {
        match &self.editor {
            Editor::Simple(form) => form.serialized(),
            Editor::Split(form) => form.serialized(),
        }
    }

    pub fn submission(&self, action: SubmitAction) -> CoreResult<Submission> {
        if self.is_error() {
            debug!("Rejected submission for {}: form has errors", self.dest);
            return Err(CoreError::ValidationError {
                message: "a transaction needs two different accounts".to_string(),
            });
        }
        if action != SubmitAction::Save && self.tid.is_none() {
            return Err(CoreError::ValidationError {
                message: format!("'{}' is only available for stored transactions", action),
            });
        }

        Ok(Submission {
            ops: self.serialized(),
            desc: self.desc.get(),
            date: self.date.get().format("%Y-%m-%d").to_string(),
            date_time: self.date_time.get(),
            action,
        })
    }
}
