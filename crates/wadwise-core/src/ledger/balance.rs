//! Current balance lookups against the backend
//!
//! `GET <balance endpoint>?date=<YYYY-MM-DD>&aid=<id>` answers
//! `{"result": {"<cur>": <amount>, ...}}`; a missing currency means zero.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::ledger::ops::Amount;

/// Per-currency balance of one account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub result: HashMap<String, Amount>,
}

impl BalanceSheet {
    pub fn from_amounts<'a>(amounts: impl IntoIterator<Item = (&'a str, Decimal)>) -> Self {
        Self {
            result: amounts
                .into_iter()
                .map(|(cur, amount)| (cur.to_string(), Amount(amount)))
                .collect(),
        }
    }

    pub fn amount(&self, currency: &str) -> Decimal {
        self.result.get(currency).map(|a| a.0).unwrap_or(Decimal::ZERO)
    }
}

/// A balance request issued when entering target mode.
///
/// `generation` identifies the toggle that issued it; responses for an older
/// generation are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceQuery {
    pub generation: u64,
    pub date: NaiveDate,
    pub aid: String,
    pub currency: String,
}

/// Source of current balances
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balance(&self, date: NaiveDate, aid: &str) -> CoreResult<BalanceSheet>;
}

/// Fixed balances, keyed by account id
#[derive(Debug, Clone, Default)]
pub struct StaticBalances {
    balances: HashMap<String, BalanceSheet>,
}

impl StaticBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, aid: &str, sheet: BalanceSheet) -> Self {
        self.balances.insert(aid.to_string(), sheet);
        self
    }
}

#[async_trait]
impl BalanceSource for StaticBalances {
    async fn balance(&self, _date: NaiveDate, aid: &str) -> CoreResult<BalanceSheet> {
        Ok(self.balances.get(aid).cloned().unwrap_or_default())
    }
}
