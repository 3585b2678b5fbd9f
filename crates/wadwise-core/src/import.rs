//! Bank statement import reconciliation
//!
//! Each candidate row gets a destination account and a description before
//! import, or is excluded by marking it seen.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wadwise_utils::{format_amount, generate_id, sum_amounts};

use crate::ledger::ops::Amount;
use crate::reactive::{batch, Computed, Signal};

pub const SEEN: &str = "seen";

/// Candidate transaction as delivered in the bootstrap payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub date_str: String,
    #[serde(default)]
    pub name: String,
    pub amount: Amount,
    #[serde(default)]
    pub cur: String,
    #[serde(default)]
    pub category: String,
    /// Fingerprint shared by similar transactions
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub dest: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// Pending import for one source account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub src: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub balance: HashMap<String, Amount>,
    #[serde(default)]
    pub transactions: Vec<ImportRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub id: String,
    pub kind: String,
    pub date_str: String,
    pub name: String,
    pub amount: Decimal,
    pub cur: String,
    pub category: String,
    pub key: Option<String>,
    pub dest: Signal<String>,
    pub desc: Signal<String>,
    pub seen: Signal<bool>,
}

impl ImportRow {
    pub fn from_record(record: &ImportRecord) -> Self {
        Self {
            id: record.id.clone().unwrap_or_else(generate_id),
            kind: record.kind.clone(),
            date_str: record.date_str.clone(),
            name: record.name.clone(),
            amount: record.amount.0,
            cur: record.cur.clone(),
            category: record.category.clone(),
            key: record.key.clone().filter(|k| !k.is_empty()),
            dest: Signal::new(record.dest.clone()),
            desc: Signal::new(record.desc.clone()),
            seen: Signal::new(record.state.as_deref() == Some(SEEN)),
        }
    }

    /// Included and assigned to an account
    pub fn is_ok(&self) -> bool {
        !self.seen.get() && self.dest.with(|d| !d.is_empty())
    }
}

#[derive(Serialize)]
struct RowPayload {
    id: String,
    dest: String,
    desc: String,
    state: Option<&'static str>,
}

pub struct ImportList {
    src: String,
    name: String,
    balance: HashMap<String, Decimal>,
    rows: Signal<Vec<ImportRow>>,
    total: Computed<Decimal>,
    submit_ok: Computed<bool>,
    serialized: Computed<String>,
}

impl ImportList {
    pub fn new(batch: &ImportBatch) -> Self {
        let rows = Signal::new(batch.transactions.iter().map(ImportRow::from_record).collect::<Vec<_>>());

        let total = {
            let rows = rows.clone();
            Computed::new(move || {
                rows.with(|rows| sum_amounts(rows.iter().filter(|r| !r.seen.get()).map(|r| r.amount)))
            })
        };

        let submit_ok = {
            let rows = rows.clone();
            Computed::new(move || {
                rows.with(|rows| !rows.iter().any(|r| !r.seen.get() && r.dest.with(String::is_empty)))
            })
        };

        let serialized = {
            let rows = rows.clone();
            Computed::new(move || {
                let payload: Vec<RowPayload> = rows.with(|rows| {
                    rows.iter()
                        .map(|r| RowPayload {
                            id: r.id.clone(),
                            dest: r.dest.get(),
                            desc: r.desc.get(),
                            state: r.seen.get().then_some(SEEN),
                        })
                        .collect()
                });
                serde_json::to_string(&payload).unwrap_or_default()
            })
        };

        Self {
            src: batch.src.clone(),
            name: batch.name.clone(),
            balance: batch.balance.iter().map(|(k, v)| (k.clone(), v.0)).collect(),
            rows,
            total,
            submit_ok,
            serialized,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> Vec<ImportRow> {
        self.rows.get()
    }

    pub fn row(&self, idx: usize) -> Option<ImportRow> {
        self.rows.with(|rows| rows.get(idx).cloned())
    }

    pub fn len(&self) -> usize {
        self.rows.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the rows that will be imported
    pub fn total(&self) -> Decimal {
        self.total.get()
    }

    pub fn submit_ok(&self) -> bool {
        self.submit_ok.get()
    }

    /// JSON for the hidden `transactions` field
    pub fn serialized(&self) -> String {
        self.serialized.get()
    }

    pub fn balance(&self, cur: &str) -> Decimal {
        self.balance.get(cur).copied().unwrap_or(Decimal::ZERO)
    }

    /// `balance + total = new balance`
    pub fn balance_line(&self, cur: &str, places: u32) -> String {
        let balance = self.balance(cur);
        let total = self.total();
        format!(
            "{} + {} = {}",
            format_amount(balance, places),
            format_amount(total, places),
            format_amount(balance.saturating_add(total), places),
        )
    }

    /// Flip a row between included and seen
    pub fn toggle_state(&self, idx: usize) -> bool {
        match self.row(idx) {
            Some(row) => {
                row.seen.update(|seen| *seen = !*seen);
                true
            }
            None => false,
        }
    }

    /// Copy destination and description of row `idx` to every other row with
    /// the same key. Rows without a key are never touched.
    pub fn set_similar(&self, idx: usize) -> usize {
        let Some(source) = self.row(idx) else {
            return 0;
        };
        let Some(key) = source.key.as_deref() else {
            return 0;
        };
        let dest = source.dest.get_untracked();
        let desc = source.desc.get_untracked();

        batch(|| {
            self.rows.with(|rows| {
                let mut updated = 0;
                for (i, row) in rows.iter().enumerate() {
                    if i == idx || row.key.as_deref() != Some(key) {
                        continue;
                    }
                    row.dest.set(dest.clone());
                    row.desc.set(desc.clone());
                    updated += 1;
                }
                updated
            })
        })
    }

    /// Form fields in posting order
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![("src", self.src.clone()), ("transactions", self.serialized())]
    }
}
