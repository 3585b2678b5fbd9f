//! Account forest loaded from the page bootstrap payload
//!
//! The map is built once at load time and is read-only afterwards. Every
//! account knows its ancestor chain (root first), its children in payload
//! order and its `:`-joined full name.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Suffix addressing the joint counterpart of an account
pub const JOINT_SUFFIX: &str = ".joint";

/// Label shown for an id that is not in the map
pub const UNKNOWN_ACCOUNT_LABEL: &str = "Select account";

/// Account type, serialized with the backend's single-letter codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "i")]
    Income,
    #[serde(rename = "e")]
    Expense,
    #[serde(rename = "q")]
    Equity,
    #[serde(rename = "a")]
    Asset,
    #[serde(rename = "l")]
    Liability,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::Income,
        AccountType::Expense,
        AccountType::Equity,
        AccountType::Asset,
        AccountType::Liability,
    ];

    /// Balance sheet accounts carry a running balance
    pub fn is_sheet(self) -> bool {
        matches!(self, AccountType::Equity | AccountType::Asset | AccountType::Liability)
    }

    pub fn code(self) -> &'static str {
        match self {
            AccountType::Income => "i",
            AccountType::Expense => "e",
            AccountType::Equity => "q",
            AccountType::Asset => "a",
            AccountType::Liability => "l",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccountType::Income => "Income",
            AccountType::Expense => "Expense",
            AccountType::Equity => "Equity",
            AccountType::Asset => "Asset",
            AccountType::Liability => "Liability",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "i" | "income" => Ok(AccountType::Income),
            "e" | "expense" | "expenses" => Ok(AccountType::Expense),
            "q" | "equity" => Ok(AccountType::Equity),
            "a" | "asset" | "assets" => Ok(AccountType::Asset),
            "l" | "liability" | "liabilities" => Ok(AccountType::Liability),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How a balance change should be coloured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Bad,
    Neutral,
}

impl Tone {
    pub fn of(account_type: AccountType, change: Decimal) -> Tone {
        if change.is_zero() {
            return Tone::Neutral;
        }
        let positive_is_good = account_type.is_sheet();
        if change.is_sign_positive() == positive_is_good {
            Tone::Good
        } else {
            Tone::Bad
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Good => "text-success",
            Tone::Bad => "text-error",
            Tone::Neutral => "",
        }
    }
}

/// Account as sent by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub aid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub is_placeholder: bool,
    #[serde(default)]
    pub is_hidden: Option<bool>,
}

/// Account with its position in the forest resolved
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub aid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub parent: Option<String>,
    pub desc: Option<String>,
    pub is_placeholder: bool,
    pub is_hidden: bool,
    /// Ancestor ids, root first, excluding the account itself
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub full_name: String,
    pub is_sheet: bool,
}

impl Account {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.parents.len()
    }
}

/// Joint account definition kept in the settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointAccount {
    pub parent: String,
    pub clear: String,
    pub joints: Vec<String>,
    pub assets: Vec<String>,
}

/// Immutable id → account lookup with an ordered root list
#[derive(Debug, Clone, Default)]
pub struct AccountMap {
    accounts: HashMap<String, Account>,
    order: Vec<String>,
    roots: Vec<String>,
    joint: HashSet<String>,
}

impl AccountMap {
    /// Build the forest from flat records.
    ///
    /// Records pointing at an unknown parent, or taking part in a parent
    /// cycle, are attached as roots.
    pub fn from_records(records: Vec<AccountRecord>, joint_parents: impl IntoIterator<Item = String>) -> Self {
        let mut order = Vec::with_capacity(records.len());
        let mut accounts: HashMap<String, Account> = HashMap::with_capacity(records.len());

        for record in records {
            if accounts.contains_key(&record.aid) {
                log::warn!("Duplicate account id in bootstrap payload: {}", record.aid);
                continue;
            }
            order.push(record.aid.clone());
            accounts.insert(record.aid.clone(), Account {
                is_sheet: record.account_type.is_sheet(),
                aid: record.aid,
                name: record.name,
                account_type: record.account_type,
                parent: record.parent,
                desc: record.desc,
                is_placeholder: record.is_placeholder,
                is_hidden: record.is_hidden.unwrap_or(false),
                parents: Vec::new(),
                children: Vec::new(),
                full_name: String::new(),
            });
        }

        let mut chains: HashMap<String, Vec<String>> = HashMap::new();
        for aid in &order {
            let chain = Self::ancestor_chain(aid, &accounts);
            chains.insert(aid.clone(), chain);
        }

        let mut roots = Vec::new();
        for aid in &order {
            let chain = chains.get(aid).cloned().unwrap_or_default();
            match chain.last() {
                Some(parent) => {
                    if let Some(parent) = accounts.get_mut(parent) {
                        parent.children.push(aid.clone());
                    }
                }
                None => {
                    let declared = accounts.get(aid).and_then(|a| a.parent.clone());
                    if let Some(parent) = declared {
                        log::warn!("Account {} has unresolvable parent {}, treating as root", aid, parent);
                    }
                    roots.push(aid.clone());
                }
            }
        }

        for aid in &order {
            let chain = chains.remove(aid).unwrap_or_default();
            let mut names: Vec<&str> = chain
                .iter()
                .filter_map(|p| accounts.get(p).map(|a| a.name.as_str()))
                .collect();
            let own = accounts.get(aid).map(|a| a.name.clone()).unwrap_or_default();
            names.push(&own);
            let full_name = names.join(":");
            if let Some(account) = accounts.get_mut(aid) {
                account.full_name = full_name;
                account.parents = chain;
            }
        }

        let joint = joint_parents
            .into_iter()
            .filter(|aid| accounts.contains_key(aid))
            .collect();

        Self {
            accounts,
            order,
            roots,
            joint,
        }
    }

    /// Resolve the ancestors of `aid`, root first; empty on a missing parent or a cycle
    fn ancestor_chain(aid: &str, accounts: &HashMap<String, Account>) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(aid.to_string());
        let mut current = accounts.get(aid).and_then(|a| a.parent.clone());
        while let Some(parent) = current {
            if !seen.insert(parent.clone()) {
                return Vec::new();
            }
            match accounts.get(&parent) {
                Some(account) => {
                    current = account.parent.clone();
                    chain.push(parent);
                }
                None => return Vec::new(),
            }
        }
        chain.reverse();
        chain
    }

    pub fn get(&self, aid: &str) -> Option<&Account> {
        self.accounts.get(aid)
    }

    pub fn contains(&self, aid: &str) -> bool {
        self.accounts.contains_key(aid)
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Accounts in payload order
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.order.iter().filter_map(|aid| self.accounts.get(aid))
    }

    /// Whether `aid` has a joint counterpart
    pub fn is_joint(&self, aid: &str) -> bool {
        self.joint.contains(aid)
    }

    /// Display title for a plain or `.joint` id
    pub fn title(&self, id: &str) -> String {
        if let Some(account) = self.accounts.get(id) {
            return account.full_name.clone();
        }
        if let Some(base) = id.strip_suffix(JOINT_SUFFIX) {
            if let Some(account) = self.accounts.get(base) {
                return format!("{} (joint)", account.full_name);
            }
        }
        UNKNOWN_ACCOUNT_LABEL.to_string()
    }

    /// `aid` and every account below it
    pub fn descendants(&self, aid: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut stack = vec![aid.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(account) = self.accounts.get(&current) {
                stack.extend(account.children.iter().rev().cloned());
            }
            result.push(current);
        }
        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(aid: &str, name: &str, kind: AccountType, parent: Option<&str>) -> AccountRecord {
        AccountRecord {
            aid: aid.to_string(),
            name: name.to_string(),
            account_type: kind,
            parent: parent.map(str::to_string),
            desc: None,
            is_placeholder: false,
            is_hidden: None,
        }
    }

    /// Assets > Bank > {Current, Savings}, Assets > Cash, Expenses > {Rent, Food}
    pub(crate) fn sample_map() -> AccountMap {
        let mut assets = record("assets", "Assets", AccountType::Asset, None);
        assets.is_placeholder = true;
        let mut expenses = record("exp", "Expenses", AccountType::Expense, None);
        expenses.is_placeholder = true;
        AccountMap::from_records(
            vec![
                assets,
                record("bank", "Bank", AccountType::Asset, Some("assets")),
                record("current", "Current", AccountType::Asset, Some("bank")),
                record("savings", "Savings", AccountType::Asset, Some("bank")),
                record("cash", "Cash", AccountType::Asset, Some("assets")),
                expenses,
                record("rent", "Rent", AccountType::Expense, Some("exp")),
                record("parent-rent", "Parents rent", AccountType::Expense, Some("exp")),
                record("food", "Food", AccountType::Expense, Some("exp")),
            ],
            vec!["current".to_string()],
        )
    }

    #[test]
    fn test_forest_structure() {
        let map = sample_map();
        assert_eq!(map.roots(), &["assets".to_string(), "exp".to_string()]);
        let current = map.get("current").unwrap();
        assert_eq!(current.parents, vec!["assets".to_string(), "bank".to_string()]);
        assert_eq!(current.full_name, "Assets:Bank:Current");
        assert_eq!(current.depth(), 2);
        assert!(current.is_sheet);
        assert_eq!(map.get("bank").unwrap().children, vec!["current".to_string(), "savings".to_string()]);
        assert!(!map.get("rent").unwrap().is_sheet);
    }

    #[test]
    fn test_title_lookup() {
        let map = sample_map();
        assert_eq!(map.title("rent"), "Expenses:Rent");
        assert_eq!(map.title("current.joint"), "Assets:Bank:Current (joint)");
        assert_eq!(map.title("nope"), UNKNOWN_ACCOUNT_LABEL);
        assert_eq!(map.title(""), UNKNOWN_ACCOUNT_LABEL);
    }

    #[test]
    fn test_unknown_parent_becomes_root() {
        let map = AccountMap::from_records(
            vec![record("x", "X", AccountType::Asset, Some("missing"))],
            Vec::new(),
        );
        assert_eq!(map.roots(), &["x".to_string()]);
        assert_eq!(map.get("x").unwrap().full_name, "X");
    }

    #[test]
    fn test_cycle_is_broken() {
        let map = AccountMap::from_records(
            vec![
                record("a", "A", AccountType::Asset, Some("b")),
                record("b", "B", AccountType::Asset, Some("a")),
            ],
            Vec::new(),
        );
        assert_eq!(map.roots().len(), 2);
    }

    #[test]
    fn test_joint_only_for_known_accounts() {
        let map = AccountMap::from_records(
            vec![record("a", "A", AccountType::Asset, None)],
            vec!["a".to_string(), "ghost".to_string()],
        );
        assert!(map.is_joint("a"));
        assert!(!map.is_joint("ghost"));
    }

    #[test]
    fn test_descendants() {
        let map = sample_map();
        assert_eq!(
            map.descendants("assets"),
            vec!["assets", "bank", "current", "savings", "cash"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_tone() {
        assert_eq!(Tone::of(AccountType::Asset, Decimal::new(5, 0)), Tone::Good);
        assert_eq!(Tone::of(AccountType::Asset, Decimal::new(-5, 0)), Tone::Bad);
        assert_eq!(Tone::of(AccountType::Expense, Decimal::new(5, 0)), Tone::Bad);
        assert_eq!(Tone::of(AccountType::Income, Decimal::new(-5, 0)), Tone::Good);
        assert_eq!(Tone::of(AccountType::Liability, Decimal::ZERO), Tone::Neutral);
    }

    #[test]
    fn test_account_type_codes() {
        let parsed: AccountType = serde_json::from_str("\"q\"").unwrap();
        assert_eq!(parsed, AccountType::Equity);
        assert_eq!("liabilities".parse::<AccountType>().unwrap(), AccountType::Liability);
        assert_eq!(AccountType::Asset.code(), "a");
    }
}
