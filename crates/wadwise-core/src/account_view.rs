//! Account overview
//!
//! Breadcrumb, per-currency totals, sub-account totals and the transactions
//! touching the account grouped by day. Totals come precomputed in the
//! bootstrap payload; the transaction list is derived from the stored
//! transactions.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wadwise_utils::{format_amount, format_number};

use crate::accounts::{Account, AccountMap, Tone};
use crate::bootstrap::{AppData, FormDefaults};
use crate::ledger::ops::Amount;

/// Amount per currency code
pub type CurrencyTotals = HashMap<String, Amount>;

/// Precomputed totals of one account, as sent by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountTotals {
    #[serde(default)]
    pub current_total: CurrencyTotals,
    /// Balance at the start of the month
    #[serde(default)]
    pub prev_total: CurrencyTotals,
    #[serde(default)]
    pub month_debit: CurrencyTotals,
    #[serde(default)]
    pub month_credit: CurrencyTotals,
    /// Net change this month
    #[serde(default)]
    pub month_total: CurrencyTotals,
}

/// Amount with thousands separators and fixed decimals
pub fn display_amount(value: Decimal, places: u32) -> String {
    format_number(format_amount(value, places))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalLine {
    pub currency: String,
    pub amount: Decimal,
}

impl TotalLine {
    pub fn display(&self, places: u32) -> String {
        display_amount(self.amount, places)
    }
}

/// Labelled group of non-zero per-currency amounts
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsBlock {
    pub label: &'static str,
    pub lines: Vec<TotalLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Crumb {
    pub aid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubAccount {
    pub aid: String,
    pub name: String,
    pub lines: Vec<TotalLine>,
}

/// One row of a transaction card
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub title: String,
    pub amount: Decimal,
    pub currency: String,
    pub tone: Tone,
    /// Secondary legs of a split are rendered muted
    pub muted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCard {
    pub tid: Option<String>,
    pub desc: String,
    pub split: bool,
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub transactions: Vec<TransactionCard>,
}

/// Everything the account page shows; `account` is `None` on the home view
#[derive(Debug, Clone)]
pub struct AccountView {
    pub account: Option<Account>,
    pub crumbs: Vec<Crumb>,
    pub is_joint: bool,
    pub status: Vec<TotalsBlock>,
    pub sub_accounts: Vec<SubAccount>,
    pub history: Vec<DateGroup>,
}

impl AccountView {
    /// View of `aid`, or of the root accounts when `aid` is `None`.
    /// Unknown ids fall back to the home view.
    pub fn new(data: &AppData, accounts: &AccountMap, aid: Option<&str>) -> Self {
        let account = aid.and_then(|aid| accounts.get(aid)).cloned();
        let order = CurrencyOrder::new(&data.cur_list);
        let empty = AccountTotals::default();
        let totals_of = |aid: &str| data.totals.get(aid).unwrap_or(&empty);

        let children: &[String] = match &account {
            Some(account) => &account.children,
            None => accounts.roots(),
        };
        let sub_accounts = children
            .iter()
            .filter_map(|aid| accounts.get(aid))
            .filter(|child| !child.is_hidden)
            .map(|child| {
                let totals = totals_of(&child.aid);
                let source = if child.is_sheet { &totals.current_total } else { &totals.month_total };
                SubAccount {
                    aid: child.aid.clone(),
                    name: child.name.clone(),
                    lines: order.lines(source, None),
                }
            })
            .collect();

        let Some(account) = account else {
            return Self {
                account: None,
                crumbs: Vec::new(),
                is_joint: false,
                status: Vec::new(),
                sub_accounts,
                history: Vec::new(),
            };
        };

        let crumbs = account
            .parents
            .iter()
            .chain(std::iter::once(&account.aid))
            .filter_map(|aid| accounts.get(aid))
            .map(|a| Crumb { aid: a.aid.clone(), name: a.name.clone() })
            .collect();

        let totals = totals_of(&account.aid);
        let status = if account.is_sheet {
            let moving = order.moving(totals);
            [
                TotalsBlock { label: "Balance", lines: order.lines(&totals.current_total, None) },
                TotalsBlock { label: "Month start", lines: order.lines(&totals.prev_total, Some(moving.as_slice())) },
                TotalsBlock { label: "In", lines: order.lines(&totals.month_debit, Some(moving.as_slice())) },
                TotalsBlock { label: "Out", lines: order.lines(&totals.month_credit, Some(moving.as_slice())) },
            ]
            .into_iter()
            .filter(|block| !block.lines.is_empty())
            .collect()
        } else {
            let block = TotalsBlock { label: "This month", lines: order.lines(&totals.month_total, None) };
            if block.lines.is_empty() {
                Vec::new()
            } else {
                vec![block]
            }
        };

        let history = history(data, accounts, &account);
        Self {
            is_joint: accounts.is_joint(&account.aid),
            account: Some(account),
            crumbs,
            status,
            sub_accounts,
            history,
        }
    }

    pub fn aid(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.aid.as_str())
    }

    /// Placeholder accounts only group others and take no transactions
    pub fn accepts_transactions(&self) -> bool {
        self.account.as_ref().is_some_and(|a| !a.is_placeholder)
    }
}

/// Currencies in `cur_list` order, unknown codes after them alphabetically
struct CurrencyOrder<'a> {
    known: &'a [String],
}

impl<'a> CurrencyOrder<'a> {
    fn new(known: &'a [String]) -> Self {
        Self { known }
    }

    fn rank(&self, code: &str) -> (usize, String) {
        let pos = self.known.iter().position(|c| c == code).unwrap_or(self.known.len());
        (pos, code.to_string())
    }

    /// Non-zero amounts, optionally restricted to `only`
    fn lines(&self, totals: &CurrencyTotals, only: Option<&[String]>) -> Vec<TotalLine> {
        let mut lines: Vec<TotalLine> = totals
            .iter()
            .filter(|(_, amount)| !amount.0.is_zero())
            .filter(|(code, _)| only.map_or(true, |only| only.contains(code)))
            .map(|(code, amount)| TotalLine { currency: code.clone(), amount: amount.0 })
            .collect();
        lines.sort_by_key(|line| self.rank(&line.currency));
        lines
    }

    /// Currencies with any movement this month
    fn moving(&self, totals: &AccountTotals) -> Vec<String> {
        let nonzero = |map: &CurrencyTotals, code: &str| map.get(code).is_some_and(|a| !a.0.is_zero());
        totals
            .month_debit
            .keys()
            .chain(totals.month_credit.keys())
            .filter(|code| nonzero(&totals.month_debit, code) || nonzero(&totals.month_credit, code))
            .cloned()
            .collect()
    }
}

fn touches(tr: &FormDefaults, aid: &str) -> bool {
    if tr.split {
        tr.ops.iter().any(|op| op.account == aid)
    } else {
        tr.src == aid || tr.dest == aid
    }
}

fn card(tr: &FormDefaults, accounts: &AccountMap, account: &Account) -> TransactionCard {
    let own_tone = |amount: Decimal| Tone::of(account.account_type, amount);
    let legs = if tr.split {
        let mut ops = tr.ops.clone();
        ops.sort_by(|a, b| a.amount.cmp(&b.amount));
        ops.into_iter()
            .map(|op| Leg {
                title: accounts.title(&op.account),
                tone: if op.account == account.aid { own_tone(op.amount) } else { Tone::Neutral },
                muted: !op.is_primary,
                amount: op.amount,
                currency: op.currency,
            })
            .collect()
    } else {
        let (counterpart, amount) = if tr.dest == account.aid {
            (&tr.src, tr.amount.0)
        } else {
            (&tr.dest, -tr.amount.0)
        };
        vec![Leg {
            title: accounts.title(counterpart),
            amount,
            currency: tr.cur.clone(),
            tone: own_tone(amount),
            muted: false,
        }]
    };
    TransactionCard {
        tid: tr.tid.clone(),
        desc: tr.desc.clone(),
        split: tr.split,
        legs,
    }
}

/// Transactions touching `account`, newest day first
fn history(data: &AppData, accounts: &AccountMap, account: &Account) -> Vec<DateGroup> {
    let mut matching: Vec<&FormDefaults> = data.transactions.values().filter(|tr| touches(tr, &account.aid)).collect();
    matching.sort_by(|a, b| (b.date, &b.date_time, &b.tid).cmp(&(a.date, &a.date_time, &a.tid)));

    let mut groups: Vec<DateGroup> = Vec::new();
    for tr in matching {
        let entry = card(tr, accounts, account);
        match groups.last_mut() {
            Some(group) if group.date == tr.date => group.transactions.push(entry),
            _ => groups.push(DateGroup { date: tr.date, transactions: vec![entry] }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::tests::sample_map;
    use crate::ledger::ops::Operation;

    fn amounts(pairs: &[(&str, i64)]) -> CurrencyTotals {
        pairs.iter().map(|(c, v)| (c.to_string(), Amount(Decimal::new(*v, 0)))).collect()
    }

    fn simple(tid: &str, src: &str, dest: &str, amount: i64, date: &str, time: &str) -> FormDefaults {
        FormDefaults {
            tid: Some(tid.to_string()),
            src: src.to_string(),
            dest: dest.to_string(),
            amount: Amount(Decimal::new(amount, 0)),
            cur: "GBP".to_string(),
            ops: Vec::new(),
            desc: format!("{} desc", tid),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            date_time: time.to_string(),
            split: false,
        }
    }

    fn sample_data() -> AppData {
        let mut data = AppData {
            cur_list: vec!["GBP".to_string(), "EUR".to_string()],
            ..AppData::default()
        };
        data.totals.insert(
            "current".to_string(),
            AccountTotals {
                current_total: amounts(&[("EUR", 40), ("GBP", 1250), ("USD", 0)]),
                prev_total: amounts(&[("GBP", 1300), ("EUR", 40)]),
                month_debit: amounts(&[("GBP", 100)]),
                month_credit: amounts(&[("GBP", -150)]),
                month_total: amounts(&[("GBP", -50)]),
            },
        );
        data.totals.insert(
            "rent".to_string(),
            AccountTotals { month_total: amounts(&[("GBP", 800)]), ..AccountTotals::default() },
        );

        for tr in [
            simple("t1", "current", "rent", 800, "2024-03-01", "09:00"),
            simple("t2", "savings", "current", 100, "2024-03-05", "10:00"),
            simple("t3", "current", "food", 20, "2024-03-05", "18:30"),
            simple("t4", "cash", "food", 5, "2024-03-06", "12:00"),
        ] {
            data.transactions.insert(tr.tid.clone().unwrap(), tr);
        }
        let mut split = simple("t5", "", "food", 0, "2024-02-28", "");
        split.split = true;
        split.ops = vec![
            Operation::new("food", Decimal::new(30, 0), "GBP", true),
            Operation::new("current", Decimal::new(-50, 0), "GBP", true),
            Operation::new("rent", Decimal::new(20, 0), "GBP", false),
        ];
        data.transactions.insert("t5".to_string(), split);
        data
    }

    #[test]
    fn test_sheet_account_status() {
        let view = AccountView::new(&sample_data(), &sample_map(), Some("current"));
        let names: Vec<_> = view.crumbs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Assets", "Bank", "Current"]);

        let labels: Vec<_> = view.status.iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["Balance", "Month start", "In", "Out"]);
        let balance: Vec<_> = view.status[0].lines.iter().map(|l| l.currency.as_str()).collect();
        assert_eq!(balance, vec!["GBP", "EUR"]);
        // Month details only list currencies that moved
        assert_eq!(view.status[1].lines.len(), 1);
        assert_eq!(view.status[0].lines[0].display(2), "1,250.00");
        assert!(view.is_joint);
        assert!(view.accepts_transactions());
    }

    #[test]
    fn test_income_statement_account_shows_month() {
        let view = AccountView::new(&sample_data(), &sample_map(), Some("rent"));
        assert_eq!(view.status.len(), 1);
        assert_eq!(view.status[0].label, "This month");
        assert_eq!(view.status[0].lines[0].amount, Decimal::new(800, 0));

        let view = AccountView::new(&sample_data(), &sample_map(), Some("food"));
        assert!(view.status.is_empty());
    }

    #[test]
    fn test_home_lists_roots() {
        let view = AccountView::new(&sample_data(), &sample_map(), None);
        assert!(view.account.is_none());
        assert!(!view.accepts_transactions());
        let roots: Vec<_> = view.sub_accounts.iter().map(|s| s.aid.as_str()).collect();
        assert_eq!(roots, vec!["assets", "exp"]);
        assert!(view.history.is_empty());

        let unknown = AccountView::new(&sample_data(), &sample_map(), Some("nope"));
        assert!(unknown.account.is_none());
    }

    #[test]
    fn test_sub_account_totals() {
        let view = AccountView::new(&sample_data(), &sample_map(), Some("bank"));
        let subs: Vec<_> = view.sub_accounts.iter().map(|s| (s.name.as_str(), s.lines.len())).collect();
        assert_eq!(subs, vec![("Current", 2), ("Savings", 0)]);
        assert!(view.status.is_empty());
    }

    #[test]
    fn test_history_grouped_newest_first() {
        let view = AccountView::new(&sample_data(), &sample_map(), Some("current"));
        let days: Vec<_> = view.history.iter().map(|g| g.date.to_string()).collect();
        assert_eq!(days, vec!["2024-03-05", "2024-03-01", "2024-02-28"]);

        let tids: Vec<_> = view.history[0].transactions.iter().map(|t| t.tid.as_deref().unwrap()).collect();
        assert_eq!(tids, vec!["t3", "t2"]);

        let outgoing = &view.history[0].transactions[0].legs[0];
        assert_eq!(outgoing.title, "Expenses:Food");
        assert_eq!(outgoing.amount, Decimal::new(-20, 0));
        assert_eq!(outgoing.tone, Tone::Bad);

        let incoming = &view.history[0].transactions[1].legs[0];
        assert_eq!(incoming.title, "Assets:Bank:Savings");
        assert_eq!(incoming.amount, Decimal::new(100, 0));
        assert_eq!(incoming.tone, Tone::Good);
    }

    #[test]
    fn test_split_legs_sorted_and_toned_for_own_account() {
        let view = AccountView::new(&sample_data(), &sample_map(), Some("current"));
        let split = &view.history[2].transactions[0];
        assert!(split.split);
        let legs: Vec<_> = split.legs.iter().map(|l| (l.title.as_str(), l.tone, l.muted)).collect();
        assert_eq!(
            legs,
            vec![
                ("Assets:Bank:Current", Tone::Bad, false),
                ("Expenses:Rent", Tone::Neutral, true),
                ("Expenses:Food", Tone::Neutral, false),
            ]
        );
    }

    #[test]
    fn test_placeholder_takes_no_transactions() {
        let view = AccountView::new(&sample_data(), &sample_map(), Some("exp"));
        assert!(!view.accepts_transactions());
        assert!(view.history.is_empty());
    }

    #[test]
    fn test_display_amount() {
        assert_eq!(display_amount(Decimal::new(-1234567, 1), 2), "-123,456.70");
        assert_eq!(display_amount(Decimal::new(5, 0), 2), "5.00");
    }
}
