//! Settings forms: favorite accounts, joint accounts and the currency list

use std::collections::HashSet;

use serde::Serialize;
use wadwise_utils::generate_id;

use crate::accounts::JointAccount;
use crate::reactive::{batch, Computed, Signal};

fn signals(values: &[String]) -> Vec<Signal<String>> {
    values.iter().cloned().map(Signal::new).collect()
}

fn push_blank(list: &Signal<Vec<Signal<String>>>) {
    let mut items = list.get_untracked();
    items.push(Signal::new(String::new()));
    list.set(items);
}

fn remove_at<T: Clone>(list: &Signal<Vec<T>>, idx: usize) -> bool {
    let mut items = list.get_untracked();
    if idx >= items.len() {
        return false;
    }
    items.remove(idx);
    list.set(items);
    true
}

// ==================== Favorites ====================

pub struct FavsForm {
    favs: Signal<Vec<Signal<String>>>,
}

impl FavsForm {
    pub fn new(fav_accounts: &[String]) -> Self {
        Self {
            favs: Signal::new(signals(fav_accounts)),
        }
    }

    pub fn items(&self) -> Vec<Signal<String>> {
        self.favs.get()
    }

    pub fn add(&self) {
        push_blank(&self.favs);
    }

    pub fn remove(&self, idx: usize) -> bool {
        remove_at(&self.favs, idx)
    }

    /// Chosen accounts, blanks skipped
    pub fn accounts(&self) -> Vec<String> {
        self.favs.with(|favs| {
            favs.iter()
                .map(Signal::get)
                .filter(|aid| !aid.is_empty())
                .collect()
        })
    }

    /// One `acc` field per chosen account
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        self.accounts().into_iter().map(|aid| ("acc", aid)).collect()
    }
}

// ==================== Joint accounts ====================

/// Editable joint account definition.
///
/// `joints[0]` is the own share; party `p` owns `joints[p + 1]` and
/// `assets[p]`.
#[derive(Debug, Clone, PartialEq)]
pub struct JointCard {
    pub id: String,
    pub parent: Signal<String>,
    pub clear: Signal<String>,
    pub joints: Signal<Vec<Signal<String>>>,
    pub assets: Signal<Vec<Signal<String>>>,
}

#[derive(Serialize)]
struct CardPayload {
    id: String,
    parent: String,
    clear: String,
    joints: Vec<String>,
    assets: Vec<String>,
}

impl JointCard {
    pub fn new(account: &JointAccount) -> Self {
        Self {
            id: generate_id(),
            parent: Signal::new(account.parent.clone()),
            clear: Signal::new(account.clear.clone()),
            joints: Signal::new(signals(&account.joints)),
            assets: Signal::new(signals(&account.assets)),
        }
    }

    pub fn blank() -> Self {
        Self::new(&JointAccount {
            parent: String::new(),
            clear: String::new(),
            joints: vec![String::new(), String::new()],
            assets: vec![String::new()],
        })
    }

    pub fn parties(&self) -> usize {
        self.assets.with(Vec::len)
    }

    pub fn add_party(&self) {
        batch(|| {
            push_blank(&self.joints);
            push_blank(&self.assets);
        });
    }

    pub fn remove_party(&self, party: usize) -> bool {
        if party >= self.parties() {
            return false;
        }
        batch(|| {
            remove_at(&self.joints, party + 1);
            remove_at(&self.assets, party);
        });
        true
    }

    fn is_complete(&self) -> bool {
        let filled = |list: &Vec<Signal<String>>| list.iter().all(|s| s.with(|v| !v.is_empty()));
        self.parent.with(|v| !v.is_empty())
            && self.clear.with(|v| !v.is_empty())
            && self.joints.with(filled)
            && self.assets.with(filled)
    }

    fn payload(&self) -> CardPayload {
        let values = |list: &Vec<Signal<String>>| -> Vec<String> { list.iter().map(Signal::get).collect() };
        CardPayload {
            id: self.id.clone(),
            parent: self.parent.get(),
            clear: self.clear.get(),
            joints: self.joints.with(values),
            assets: self.assets.with(values),
        }
    }
}

pub struct JointForm {
    cards: Signal<Vec<JointCard>>,
    has_errors: Computed<bool>,
    serialized: Computed<String>,
}

impl JointForm {
    pub fn new(accounts: &[JointAccount]) -> Self {
        let cards = Signal::new(accounts.iter().map(JointCard::new).collect::<Vec<_>>());

        let has_errors = {
            let cards = cards.clone();
            Computed::new(move || !cards.with(|cards| cards.iter().all(JointCard::is_complete)))
        };

        let serialized = {
            let cards = cards.clone();
            Computed::new(move || {
                let payload: Vec<CardPayload> = cards.with(|cards| cards.iter().map(JointCard::payload).collect());
                serde_json::to_string(&payload).unwrap_or_default()
            })
        };

        Self {
            cards,
            has_errors,
            serialized,
        }
    }

    pub fn cards(&self) -> Vec<JointCard> {
        self.cards.get()
    }

    pub fn card(&self, idx: usize) -> Option<JointCard> {
        self.cards.with(|cards| cards.get(idx).cloned())
    }

    pub fn add(&self) {
        let mut cards = self.cards.get_untracked();
        cards.push(JointCard::blank());
        self.cards.set(cards);
    }

    pub fn remove(&self, idx: usize) -> bool {
        remove_at(&self.cards, idx)
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors.get()
    }

    /// JSON for the hidden `data` field
    pub fn serialized(&self) -> String {
        self.serialized.get()
    }
}

// ==================== Currencies ====================

/// Parse the currency textarea: one code per line, uppercased, blanks and
/// repeats dropped.
pub fn parse_currency_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(|line| line.trim().to_uppercase())
        .filter(|code| !code.is_empty() && seen.insert(code.clone()))
        .collect()
}

pub fn format_currency_list(codes: &[String]) -> String {
    codes.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favs() {
        let form = FavsForm::new(&["bank".to_string(), "cash".to_string()]);
        form.add();
        assert_eq!(form.items().len(), 3);
        assert_eq!(form.accounts(), vec!["bank".to_string(), "cash".to_string()]);
        assert!(form.remove(0));
        assert!(!form.remove(7));
        assert_eq!(form.to_fields(), vec![("acc", "cash".to_string())]);
    }

    #[test]
    fn test_new_card_needs_every_field() {
        let form = JointForm::new(&[]);
        assert!(!form.has_errors());
        form.add();
        assert!(form.has_errors());

        let card = form.card(0).unwrap();
        assert_eq!(card.joints.get().len(), 2);
        assert_eq!(card.parties(), 1);

        card.parent.set("house".to_string());
        card.clear.set("clear".to_string());
        for s in card.joints.get().iter().chain(card.assets.get().iter()) {
            s.set("x".to_string());
        }
        assert!(!form.has_errors());

        card.add_party();
        assert!(form.has_errors());
        assert!(card.remove_party(1));
        assert!(!form.has_errors());
    }

    #[test]
    fn test_remove_party_shifts_shares() {
        let form = JointForm::new(&[JointAccount {
            parent: "house".to_string(),
            clear: "clear".to_string(),
            joints: vec!["me".to_string(), "p1".to_string(), "p2".to_string()],
            assets: vec!["a1".to_string(), "a2".to_string()],
        }]);
        let card = form.card(0).unwrap();
        assert!(card.remove_party(0));
        assert!(!card.remove_party(5));

        let joints: Vec<String> = card.joints.get().iter().map(Signal::get).collect();
        let assets: Vec<String> = card.assets.get().iter().map(Signal::get).collect();
        assert_eq!(joints, vec!["me".to_string(), "p2".to_string()]);
        assert_eq!(assets, vec!["a2".to_string()]);

        let data: serde_json::Value = serde_json::from_str(&form.serialized()).unwrap();
        assert_eq!(data[0]["joints"][1], "p2");
        assert_eq!(data[0]["parent"], "house");
    }

    #[test]
    fn test_parse_currency_list() {
        assert_eq!(
            parse_currency_list(" gbp\n\nEUR\nGbp\r\nusd "),
            vec!["GBP".to_string(), "EUR".to_string(), "USD".to_string()]
        );
        assert!(parse_currency_list("\n \n").is_empty());
    }
}
