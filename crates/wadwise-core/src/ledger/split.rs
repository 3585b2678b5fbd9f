//! Multi-leg transaction editor

use std::collections::HashSet;

use rust_decimal::Decimal;
use wadwise_utils::{parse_amount, sum_amounts};

use crate::ledger::ops::{Operation, Payload};
use crate::reactive::{Computed, Signal};

/// One editable leg
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRow {
    pub account: Signal<String>,
    pub amount: Signal<Decimal>,
    pub cur: Signal<String>,
}

impl SplitRow {
    pub fn new(account: &str, amount: Decimal, cur: &str) -> Self {
        Self {
            account: Signal::new(account.to_string()),
            amount: Signal::new(amount),
            cur: Signal::new(cur.to_string()),
        }
    }

    pub fn set_amount_text(&self, raw: &str) {
        self.amount.set(parse_amount(raw));
    }

    fn operation(&self) -> Operation {
        Operation {
            account: self.account.get(),
            amount: self.amount.get(),
            currency: self.cur.get(),
            is_primary: false,
        }
    }
}

/// Editor over an ordered list of legs.
///
/// Inserting or removing a leg replaces the whole list; the cells of the
/// surviving legs are kept.
pub struct SplitForm {
    cur_list: Vec<String>,
    rows: Signal<Vec<SplitRow>>,
    same_cur: Computed<bool>,
    total: Computed<Decimal>,
    is_error: Computed<bool>,
    payload: Computed<Payload>,
}

impl SplitForm {
    pub fn new(ops: &[Operation], cur_list: Vec<String>) -> Self {
        let rows = Signal::new(
            ops.iter()
                .map(|op| SplitRow::new(&op.account, op.amount, &op.currency))
                .collect::<Vec<_>>(),
        );

        let same_cur = {
            let rows = rows.clone();
            Computed::new(move || {
                rows.with(|rows| rows.iter().map(|r| r.cur.get()).collect::<HashSet<_>>().len() <= 1)
            })
        };

        let total = {
            let rows = rows.clone();
            Computed::new(move || rows.with(|rows| sum_amounts(rows.iter().map(|r| r.amount.get()))))
        };

        let is_error = {
            let rows = rows.clone();
            Computed::new(move || {
                let accounts: HashSet<String> = rows.with(|rows| {
                    rows.iter()
                        .map(|r| r.account.get())
                        .filter(|a| !a.is_empty())
                        .collect()
                });
                accounts.len() < 2
            })
        };

        let payload = {
            let rows = rows.clone();
            Computed::new(move || Payload::Ops(rows.with(|rows| rows.iter().map(SplitRow::operation).collect())))
        };

        Self {
            cur_list,
            rows,
            same_cur,
            total,
            is_error,
            payload,
        }
    }

    pub fn rows(&self) -> Vec<SplitRow> {
        self.rows.get()
    }

    pub fn row(&self, idx: usize) -> Option<SplitRow> {
        self.rows.with(|rows| rows.get(idx).cloned())
    }

    pub fn len(&self) -> usize {
        self.rows.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cur_list(&self) -> &[String] {
        &self.cur_list
    }

    /// Whether every leg uses the same currency
    pub fn same_cur(&self) -> bool {
        self.same_cur.get()
    }

    pub fn total(&self) -> Decimal {
        self.total.get()
    }

    pub fn is_error(&self) -> bool {
        self.is_error.get()
    }

    pub fn payload(&self) -> Payload {
        self.payload.get()
    }

    pub fn serialized(&self) -> String {
        self.payload.with(Payload::to_json)
    }

    /// Append a zero leg in the first listed currency
    pub fn add_row(&self) {
        let cur = self.cur_list.first().cloned().unwrap_or_default();
        let mut rows = self.rows.get_untracked();
        rows.push(SplitRow::new("", Decimal::ZERO, &cur));
        self.rows.set(rows);
    }

    pub fn remove_row(&self, idx: usize) -> bool {
        let mut rows = self.rows.get_untracked();
        if idx >= rows.len() {
            return false;
        }
        rows.remove(idx);
        self.rows.set(rows);
        true
    }

    /// Adjust leg `idx` so the legs sum to zero.
    ///
    /// Only available while all legs share a currency.
    pub fn fix_remainder(&self, idx: usize) -> bool {
        if !self.same_cur() {
            return false;
        }
        let Some(row) = self.row(idx) else {
            return false;
        };
        let total = self.total();
        row.amount.update(|amount| *amount = amount.saturating_sub(total));
        true
    }
}
