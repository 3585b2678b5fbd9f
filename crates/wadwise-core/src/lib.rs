//! Form engine and account browsing for the wadwise bookkeeping UI
//!
//! Everything here is framework-free: reactive cells drive the transaction,
//! import and settings forms, and the account map backs the selector. The
//! HTTP layer rebuilds these forms from posted fields on every request.

pub mod account_edit;
pub mod account_view;
pub mod accounts;
pub mod bootstrap;
pub mod error;
pub mod import;
pub mod ledger;
pub mod reactive;
pub mod selector;
pub mod settings;

pub use account_edit::{AccountEditForm, DeleteConfirmation, DeleteRequest};
pub use account_view::{AccountTotals, AccountView};
pub use accounts::{Account, AccountMap, AccountRecord, AccountType, JointAccount, Tone, JOINT_SUFFIX};
pub use bootstrap::{AppData, FormDefaults};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use import::{ImportBatch, ImportList, ImportRecord, ImportRow};
pub use ledger::{
    BalanceQuery, BalanceSheet, BalanceSource, Editor, Mode, Operation, Payload, SimpleForm, SplitForm,
    SubmitAction, Submission, TransactionForm,
};
pub use reactive::{batch, untrack, Computed, Effect, Signal};
pub use selector::{AccountSelector, AccountTree, Selection, SelectorOptions, TreeView};
pub use settings::{FavsForm, JointCard, JointForm};
