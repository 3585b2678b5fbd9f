//! Page bootstrap payload
//!
//! Everything the forms need is delivered once as JSON: the account list,
//! the currency list, settings, stored transactions and the pending import
//! batch. The server reloads it on demand; nothing is written back.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wadwise_config::Config;

use crate::account_view::AccountTotals;
use crate::accounts::{AccountMap, AccountRecord, JointAccount};
use crate::error::{CoreError, CoreResult};
use crate::import::ImportBatch;
use crate::ledger::ops::{Amount, Operation};

/// Initial values of a transaction form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefaults {
    #[serde(default)]
    pub tid: Option<String>,
    #[serde(default)]
    pub src: String,
    pub dest: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub cur: String,
    #[serde(default)]
    pub ops: Vec<Operation>,
    #[serde(default)]
    pub desc: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub date_time: String,
    #[serde(default)]
    pub split: bool,
}

impl FormDefaults {
    /// Defaults for a new transaction into `dest`
    pub fn new_for(dest: &str, cur: &str, now: NaiveDateTime) -> Self {
        Self {
            tid: None,
            src: String::new(),
            dest: dest.to_string(),
            amount: Amount(Decimal::ZERO),
            cur: cur.to_string(),
            ops: vec![
                Operation::new("", Decimal::ZERO, cur, false),
                Operation::new(dest, Decimal::ZERO, cur, false),
            ],
            desc: String::new(),
            date: now.date(),
            date_time: now.format("%H:%M").to_string(),
            split: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
    #[serde(default)]
    pub cur_list: Vec<String>,
    #[serde(default)]
    pub joint_accounts: Vec<JointAccount>,
    #[serde(default)]
    pub fav_accounts: Vec<String>,
    /// Account preselected as source and via account of new transactions
    #[serde(default)]
    pub default_account: String,
    #[serde(default)]
    pub transactions: HashMap<String, FormDefaults>,
    #[serde(default)]
    pub import: Option<ImportBatch>,
    /// Precomputed totals per account id
    #[serde(default)]
    pub totals: HashMap<String, AccountTotals>,
}

impl AppData {
    pub fn load(path: &Path) -> CoreResult<Self> {
        debug!("Loading bootstrap payload from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let data = Self::from_json(&raw)?;
        info!(
            "Loaded {} accounts, {} transactions from {}",
            data.accounts.len(),
            data.transactions.len(),
            path.display()
        );
        Ok(data)
    }

    /// Load from `data.bootstrap`, filling an empty currency list from
    /// `currency.default_list`
    pub fn load_configured(config: &Config) -> CoreResult<Self> {
        let mut data = Self::load(&config.data.bootstrap)?;
        data.cur_list = data.currencies(&config.currency.default_list);
        Ok(data)
    }

    pub fn from_json(raw: &str) -> CoreResult<Self> {
        serde_json::from_str(raw).map_err(CoreError::from)
    }

    /// Currency list, falling back to `default` when the payload has none
    pub fn currencies(&self, default: &[String]) -> Vec<String> {
        if self.cur_list.is_empty() {
            default.to_vec()
        } else {
            self.cur_list.clone()
        }
    }

    pub fn account_map(&self) -> AccountMap {
        AccountMap::from_records(
            self.accounts.clone(),
            self.joint_accounts.iter().map(|j| j.parent.clone()),
        )
    }

    pub fn transaction(&self, tid: &str) -> CoreResult<&FormDefaults> {
        self.transactions
            .get(tid)
            .ok_or_else(|| CoreError::TransactionNotFound { id: tid.to_string() })
    }
}
