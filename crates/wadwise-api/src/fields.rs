//! Posted form fields and island actions
//!
//! Islands are stateless: every round-trip posts all field values, including
//! hidden ones carrying UI state, plus an optional `action`. Repeated
//! widgets use indexed names (`account.0`, `account.1`, ...).

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wadwise_utils::parse_amount;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let mut pairs: Vec<(String, String)> = params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        pairs.sort();
        Self { pairs }
    }

    /// Decode an `application/x-www-form-urlencoded` body, keeping order
    /// and repeated names
    pub fn from_body(body: &str) -> Self {
        let decode = |raw: &str| {
            let spaced = raw.replace('+', " ");
            match urlencoding::decode(&spaced) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => spaced.clone(),
            }
        };
        let pairs = body
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (decode(k), decode(v)),
                None => (decode(pair), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// Every value posted under `name`, in order
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Last value posted under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value or empty string
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Non-blank value
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.value(name), "1" | "on" | "true" | "yes")
    }

    pub fn amount(&self, name: &str) -> Decimal {
        parse_amount(self.value(name))
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.value(name), "%Y-%m-%d").ok()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.pairs.retain(|(k, _)| k != name);
        self.pairs.push((name.to_string(), value.to_string()));
    }

    /// `prefix.0`, `prefix.1`, ... up to the first missing index
    pub fn indexed(&self, prefix: &str) -> Vec<String> {
        (0..)
            .map(|i| self.get(&format!("{}.{}", prefix, i)).map(str::to_string))
            .take_while(Option::is_some)
            .flatten()
            .collect()
    }

    pub fn action(&self) -> Action {
        Action::parse(self.value("action"))
    }

    /// Apply a `select:<field>:<id>` action to the posted values
    pub fn apply_select(&mut self, action: &Action) {
        if let (Some(field), Some(value)) = (action.select_field(), action.arg(1)) {
            self.set(field, value);
        }
    }
}

/// `name[:arg[:arg]]` posted by an island control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub args: Vec<String>,
}

impl Action {
    pub fn parse(raw: &str) -> Action {
        let mut parts = raw.trim().splitn(3, ':');
        let name = parts.next().unwrap_or("").to_string();
        Action {
            name,
            args: parts.map(str::to_string).collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.name.is_empty()
    }

    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }

    pub fn index(&self, idx: usize) -> Option<usize> {
        self.arg(idx).and_then(|a| a.parse().ok())
    }

    pub fn select_field(&self) -> Option<&str> {
        if self.name == "select" {
            self.arg(0)
        } else {
            None
        }
    }
}

/// `select:<field>:<id>`
pub fn select_action(field: &str, aid: &str) -> String {
    format!("select:{}:{}", field, aid)
}
