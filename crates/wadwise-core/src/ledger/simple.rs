//! Two-account transaction editor with its derived modes

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wadwise_utils::{format_amount, parse_amount};

use crate::error::CoreResult;
use crate::ledger::balance::{BalanceQuery, BalanceSheet, BalanceSource};
use crate::ledger::ops::{op2, Payload, SimpleTransfer};
use crate::reactive::{batch, Computed, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Simple,
    Target,
    NoOp,
    Via,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Simple, Mode::Target, Mode::NoOp, Mode::Via];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Target => "target",
            Mode::NoOp => "noop",
            Mode::Via => "via",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Simple => "Simple",
            Mode::Target => "Target",
            Mode::NoOp => "No-op",
            Mode::Via => "Via",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown mode: {}", s))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `current ± |diff| = target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLine {
    pub current: Decimal,
    pub diff: Decimal,
    pub target: Decimal,
}

impl TargetLine {
    /// `-` when the transaction lowers the balance
    pub fn sign(&self) -> char {
        if self.diff > Decimal::ZERO {
            '-'
        } else {
            '+'
        }
    }

    /// Left-hand side up to and including `=`
    pub fn lhs(&self, places: u32) -> String {
        format!(
            "{} {} {} =",
            format_amount(self.current, places),
            self.sign(),
            format_amount(self.diff.abs(), places)
        )
    }

    pub fn render(&self, places: u32) -> String {
        format!(
            "{} {}",
            self.lhs(places),
            format_amount(self.target, places),
        )
    }
}

impl fmt::Display for TargetLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(2))
    }
}

/// Editor for a transfer from `src` into a fixed `dest`.
///
/// The payload, error flag and target differential are derived cells and
/// always reflect the latest inputs.
pub struct SimpleForm {
    dest: String,
    pub mode: Signal<Mode>,
    pub src: Signal<String>,
    pub via: Signal<String>,
    pub amount: Signal<Decimal>,
    pub cur: Signal<String>,
    /// Balance of `src` before the transaction, known in target mode
    pub current: Signal<Decimal>,
    pub target: Signal<Decimal>,
    diff: Computed<Decimal>,
    payload: Computed<Payload>,
    serialized: Computed<String>,
    is_error: Computed<bool>,
    generation: Cell<u64>,
}

impl SimpleForm {
    pub fn new(src: &str, dest: &str, amount: Decimal, cur: &str, via: &str) -> Self {
        let mode = Signal::new(Mode::Simple);
        let src = Signal::new(src.to_string());
        let via = Signal::new(via.to_string());
        let amount = Signal::new(amount);
        let cur = Signal::new(cur.to_string());
        let current = Signal::new(Decimal::ZERO);
        let target = Signal::new(Decimal::ZERO);

        let diff = {
            let (current, target) = (current.clone(), target.clone());
            Computed::new(move || current.get().saturating_sub(target.get()))
        };

        let payload = {
            let (mode, src, via, amount, cur, diff) =
                (mode.clone(), src.clone(), via.clone(), amount.clone(), cur.clone(), diff.clone());
            let dest = dest.to_string();
            Computed::new(move || {
                let src = src.get();
                let cur = cur.get();
                match mode.get() {
                    Mode::Simple => Payload::Simple(SimpleTransfer::new(&src, &dest, amount.get(), &cur)),
                    Mode::Target => Payload::Simple(SimpleTransfer::new(&src, &dest, diff.get(), &cur)),
                    Mode::NoOp => {
                        let amt = amount.get();
                        let mut ops = op2(&dest, &dest, amt, &cur, true).to_vec();
                        ops.extend(op2(&src, &src, amt, &cur, false));
                        Payload::Ops(ops)
                    }
                    Mode::Via => {
                        let amt = amount.get();
                        let via = via.get();
                        let mut ops = op2(&src, &dest, amt, &cur, true).to_vec();
                        ops.extend(op2(&via, &via, amt, &cur, false));
                        Payload::Ops(ops)
                    }
                }
            })
        };

        let serialized = {
            let payload = payload.clone();
            Computed::new(move || payload.with(Payload::to_json))
        };

        let is_error = {
            let src = src.clone();
            let dest = dest.to_string();
            Computed::new(move || src.with(|s| *s == dest))
        };

        Self {
            dest: dest.to_string(),
            mode,
            src,
            via,
            amount,
            cur,
            current,
            target,
            diff,
            payload,
            serialized,
            is_error,
            generation: Cell::new(0),
        }
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn diff(&self) -> Decimal {
        self.diff.get()
    }

    pub fn payload(&self) -> Payload {
        self.payload.get()
    }

    /// JSON for the hidden `ops` field
    pub fn serialized(&self) -> String {
        self.serialized.get()
    }

    pub fn is_error(&self) -> bool {
        self.is_error.get()
    }

    pub fn target_line(&self) -> TargetLine {
        TargetLine {
            current: self.current.get(),
            diff: self.diff.get(),
            target: self.target.get(),
        }
    }

    pub fn set_amount_text(&self, raw: &str) {
        self.amount.set(parse_amount(raw));
    }

    pub fn set_target_text(&self, raw: &str) {
        self.target.set(parse_amount(raw));
    }

    /// Switch to `to`, or back to simple when `to` is already active.
    ///
    /// Entering target mode needs the current balance of `src` first: the
    /// mode is left unchanged and the returned query must be answered with
    /// `apply_balance`.
    pub fn toggle_mode(&self, to: Mode, date: NaiveDate) -> Option<BalanceQuery> {
        let mode = self.mode.get_untracked();
        if mode == to {
            self.mode.set(Mode::Simple);
            return None;
        }
        if to != Mode::Target {
            self.mode.set(to);
            return None;
        }

        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        Some(BalanceQuery {
            generation,
            date,
            aid: self.src.get_untracked(),
            currency: self.cur.get_untracked(),
        })
    }

    /// Complete a balance query issued by `toggle_mode`.
    ///
    /// A failed lookup counts as a zero balance. Answers to superseded
    /// queries are dropped and `false` is returned.
    pub fn apply_balance(&self, query: &BalanceQuery, result: CoreResult<BalanceSheet>) -> bool {
        if query.generation != self.generation.get() {
            debug!(
                "Dropping stale balance for {} (generation {}, latest {})",
                query.aid,
                query.generation,
                self.generation.get()
            );
            return false;
        }

        let current = match result {
            Ok(sheet) => sheet.amount(&query.currency),
            Err(e) => {
                warn!("Balance lookup for {} failed, assuming zero: {}", query.aid, e);
                Decimal::ZERO
            }
        };

        batch(|| {
            self.cur.set(query.currency.clone());
            self.current.set(current);
            self.mode.set(Mode::Target);
        });
        true
    }

    /// `toggle_mode` followed by the balance lookup when one is needed
    pub async fn toggle_mode_with(&self, to: Mode, date: NaiveDate, source: &dyn BalanceSource) {
        if let Some(query) = self.toggle_mode(to, date) {
            let result = source.balance(query.date, &query.aid).await;
            self.apply_balance(&query, result);
        }
    }
}
