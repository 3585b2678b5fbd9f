//! Account tree browser and the selector dialog around it
//!
//! The browser shows either the disclosure tree (roots first, depth-first,
//! children only under expanded nodes) or, while a search string is set, a
//! flat sorted list of matches. Disclosure state is seeded from the current
//! selection and thrown away when the dialog closes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::accounts::{AccountMap, JOINT_SUFFIX};
use crate::reactive::Signal;

/// Selector behaviour flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorOptions {
    /// Allow picking placeholder/group accounts
    #[serde(default)]
    pub select_placeholder: bool,
    /// Hide the joint quick-select
    #[serde(default)]
    pub exclude_special: bool,
}

/// What the user picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Account(String),
    Joint(String),
}

impl Selection {
    /// Value reported back to the form
    pub fn value(&self) -> String {
        match self {
            Selection::Account(aid) => aid.clone(),
            Selection::Joint(aid) => format!("{}{}", aid, JOINT_SUFFIX),
        }
    }

    pub fn parse(value: &str) -> Selection {
        match value.strip_suffix(JOINT_SUFFIX) {
            Some(aid) => Selection::Joint(aid.to_string()),
            None => Selection::Account(value.to_string()),
        }
    }
}

/// One visible line of the disclosure tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub aid: String,
    pub name: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub selected: bool,
    /// Group accounts get an explicit select button
    pub can_select: bool,
    pub joint: bool,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub aid: String,
    pub full_name: String,
    pub selected: bool,
    pub joint: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeView {
    Tree(Vec<TreeRow>),
    Search(Vec<SearchRow>),
}

/// Disclosure tree over an account map
#[derive(Debug, Clone)]
pub struct AccountTree {
    accounts: Arc<AccountMap>,
    selected: String,
    unfolded: HashMap<String, bool>,
    options: SelectorOptions,
}

impl AccountTree {
    pub fn new(accounts: Arc<AccountMap>, selected: &str, options: SelectorOptions) -> Self {
        let mut tree = Self {
            accounts,
            selected: String::new(),
            unfolded: HashMap::new(),
            options,
        };
        tree.set_selected(selected);
        tree
    }

    /// Change the selection and re-seed disclosure from its ancestors
    pub fn set_selected(&mut self, selected: &str) {
        self.selected = selected.to_string();
        let base = selected.strip_suffix(JOINT_SUFFIX).unwrap_or(selected);
        self.unfolded = self
            .accounts
            .get(base)
            .map(|account| account.parents.iter().map(|p| (p.clone(), true)).collect())
            .unwrap_or_default();
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn options(&self) -> SelectorOptions {
        self.options
    }

    pub fn is_expanded(&self, aid: &str) -> bool {
        self.unfolded.get(aid).copied().unwrap_or(false)
    }

    /// Ids currently expanded, sorted
    pub fn expanded_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .unfolded
            .iter()
            .filter(|(_, open)| **open)
            .map(|(aid, _)| aid.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn collapse_all(&mut self) {
        self.unfolded.clear();
    }

    /// Restore disclosure state carried across a round-trip
    pub fn expand_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for aid in ids {
            if self.accounts.contains(aid) {
                self.unfolded.insert(aid.to_string(), true);
            }
        }
    }

    /// Click on a node: groups fold or unfold, leaves are selected
    pub fn toggle(&mut self, aid: &str) -> Option<Selection> {
        let account = self.accounts.get(aid)?;
        if account.has_children() {
            let open = self.is_expanded(aid);
            self.unfolded.insert(aid.to_string(), !open);
            None
        } else {
            Some(Selection::Account(aid.to_string()))
        }
    }

    fn joint_allowed(&self, aid: &str) -> bool {
        !self.options.exclude_special && self.accounts.is_joint(aid)
    }

    /// Visible rows of the disclosure tree
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.collect_rows(self.accounts.roots(), 0, &mut rows);
        rows
    }

    fn collect_rows(&self, ids: &[String], depth: usize, rows: &mut Vec<TreeRow>) {
        for aid in ids {
            let Some(account) = self.accounts.get(aid) else {
                continue;
            };
            let has_children = account.has_children();
            let expanded = has_children && self.is_expanded(aid);
            rows.push(TreeRow {
                aid: aid.clone(),
                name: account.name.clone(),
                depth,
                has_children,
                expanded,
                selected: self.selected == *aid,
                can_select: has_children && (!account.is_placeholder || self.options.select_placeholder),
                joint: self.joint_allowed(aid),
            });
            if expanded {
                self.collect_rows(&account.children, depth + 1, rows);
            }
        }
    }

    /// Case-insensitive substring search over full names, sorted by full name
    pub fn search(&self, query: &str) -> Vec<SearchRow> {
        let needle = query.to_lowercase();
        let mut rows: Vec<SearchRow> = self
            .accounts
            .iter()
            .filter(|account| !account.is_placeholder || self.options.select_placeholder)
            .filter(|account| account.full_name.to_lowercase().contains(&needle))
            .map(|account| SearchRow {
                aid: account.aid.clone(),
                full_name: account.full_name.clone(),
                selected: self.selected == account.aid,
                joint: self.joint_allowed(&account.aid),
            })
            .collect();
        rows.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        rows
    }

    /// Tree or search results depending on the query
    pub fn view(&self, query: &str) -> TreeView {
        if query.is_empty() {
            TreeView::Tree(self.rows())
        } else {
            TreeView::Search(self.search(query))
        }
    }
}

/// Open selector dialog state
#[derive(Debug, Clone)]
pub struct SelectorDialog {
    pub tree: AccountTree,
    pub search: String,
}

/// Account field bound to a reactive cell, with a picker dialog
pub struct AccountSelector {
    accounts: Arc<AccountMap>,
    value: Signal<String>,
    options: SelectorOptions,
    dialog: Option<SelectorDialog>,
}

impl AccountSelector {
    pub fn new(accounts: Arc<AccountMap>, value: Signal<String>, options: SelectorOptions) -> Self {
        Self {
            accounts,
            value,
            options,
            dialog: None,
        }
    }

    pub fn value(&self) -> &Signal<String> {
        &self.value
    }

    /// Text shown in the read-only field
    pub fn title(&self) -> String {
        self.value.with(|v| self.accounts.title(v))
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn dialog(&self) -> Option<&SelectorDialog> {
        self.dialog.as_ref()
    }

    pub fn open(&mut self) -> &mut SelectorDialog {
        let selected = self.value.get_untracked();
        let options = self.options;
        let accounts = self.accounts.clone();
        self.dialog.get_or_insert_with(|| SelectorDialog {
            tree: AccountTree::new(accounts, &selected, options),
            search: String::new(),
        })
    }

    /// Close the dialog, discarding search and disclosure state
    pub fn close(&mut self) {
        self.dialog = None;
    }

    pub fn set_search(&mut self, query: &str) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.search = query.to_string();
        }
    }

    /// Node click inside the dialog; commits and closes when a leaf was hit
    pub fn toggle(&mut self, aid: &str) -> Option<Selection> {
        let selection = self.dialog.as_mut()?.tree.toggle(aid)?;
        self.select(selection.clone());
        Some(selection)
    }

    pub fn select(&mut self, selection: Selection) {
        self.value.set(selection.value());
        self.close();
    }

    pub fn view(&self) -> Option<TreeView> {
        self.dialog.as_ref().map(|d| d.tree.view(&d.search))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::tests::sample_map;
    use crate::accounts::UNKNOWN_ACCOUNT_LABEL;

    fn tree(selected: &str, options: SelectorOptions) -> AccountTree {
        AccountTree::new(Arc::new(sample_map()), selected, options)
    }

    #[test]
    fn test_ancestors_of_selection_are_expanded() {
        let tree = tree("current", SelectorOptions::default());
        assert!(tree.is_expanded("assets"));
        assert!(tree.is_expanded("bank"));
        assert!(!tree.is_expanded("exp"));
        assert!(!tree.is_expanded("current"));

        let ids: Vec<String> = tree.rows().into_iter().map(|r| r.aid).collect();
        assert_eq!(ids, vec!["assets", "bank", "current", "savings", "cash", "exp"]);
    }

    #[test]
    fn test_row_depth_and_flags() {
        let rows = tree("current", SelectorOptions::default()).rows();
        let current = rows.iter().find(|r| r.aid == "current").unwrap();
        assert_eq!(current.depth, 2);
        assert!(current.selected);
        assert!(current.joint);
        let assets = rows.iter().find(|r| r.aid == "assets").unwrap();
        assert!(assets.has_children && assets.expanded);
        assert!(!assets.can_select);
        let bank = rows.iter().find(|r| r.aid == "bank").unwrap();
        assert!(bank.can_select);
    }

    #[test]
    fn test_toggle_group_and_leaf() {
        let mut tree = tree("", SelectorOptions::default());
        assert_eq!(tree.rows().len(), 2);
        assert_eq!(tree.toggle("exp"), None);
        assert!(tree.is_expanded("exp"));
        assert!(!tree.is_expanded("assets"));
        assert_eq!(tree.toggle("rent"), Some(Selection::Account("rent".to_string())));
        assert_eq!(tree.toggle("exp"), None);
        assert!(!tree.is_expanded("exp"));
        assert_eq!(tree.toggle("missing"), None);
    }

    #[test]
    fn test_restore_disclosure() {
        let mut tree = tree("current", SelectorOptions::default());
        tree.collapse_all();
        tree.expand_all(["exp", "missing"]);
        assert_eq!(tree.expanded_ids(), vec!["exp".to_string()]);
        let ids: Vec<String> = tree.rows().into_iter().map(|r| r.aid).collect();
        assert_eq!(ids, vec!["assets", "exp", "rent", "parent-rent", "food"]);
    }

    #[test]
    fn test_search_filters_and_sorts() {
        let tree = tree("", SelectorOptions::default());
        let hits: Vec<String> = tree.search("RENT").into_iter().map(|r| r.full_name).collect();
        assert_eq!(hits, vec!["Assets:Bank:Current", "Expenses:Parents rent", "Expenses:Rent"]);

        let groups: Vec<String> = tree.search("e").into_iter().map(|r| r.aid).collect();
        assert!(!groups.contains(&"exp".to_string()));
    }

    #[test]
    fn test_search_includes_placeholders_when_allowed() {
        let options = SelectorOptions { select_placeholder: true, exclude_special: false };
        let hits: Vec<String> = tree("", options).search("assets").into_iter().map(|r| r.aid).collect();
        assert_eq!(hits[0], "assets");
    }

    #[test]
    fn test_exclude_special_hides_joint() {
        let options = SelectorOptions { select_placeholder: false, exclude_special: true };
        let hits = tree("", options).search("current");
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].joint);
    }

    #[test]
    fn test_view_switches_on_query() {
        let tree = tree("", SelectorOptions::default());
        assert!(matches!(tree.view(""), TreeView::Tree(_)));
        assert!(matches!(tree.view("food"), TreeView::Search(ref rows) if rows.len() == 1));
    }

    #[test]
    fn test_unknown_selection_does_not_crash() {
        let tree = tree("ghost", SelectorOptions::default());
        assert_eq!(tree.rows().len(), 2);
        let selector = AccountSelector::new(
            Arc::new(sample_map()),
            Signal::new("ghost".to_string()),
            SelectorOptions::default(),
        );
        assert_eq!(selector.title(), UNKNOWN_ACCOUNT_LABEL);
    }

    #[test]
    fn test_selector_commits_and_discards_state() {
        let value = Signal::new("current".to_string());
        let mut selector = AccountSelector::new(Arc::new(sample_map()), value.clone(), SelectorOptions::default());
        selector.open();
        selector.set_search("foo");
        selector.close();
        assert!(selector.dialog().is_none());

        let dialog = selector.open();
        assert!(dialog.search.is_empty());
        assert_eq!(selector.toggle("exp"), None);
        assert!(selector.is_open());
        assert_eq!(selector.toggle("food"), Some(Selection::Account("food".to_string())));
        assert!(!selector.is_open());
        assert_eq!(value.get_untracked(), "food");
        assert_eq!(selector.title(), "Expenses:Food");
    }

    #[test]
    fn test_joint_selection_value() {
        let value = Signal::new(String::new());
        let mut selector = AccountSelector::new(Arc::new(sample_map()), value.clone(), SelectorOptions::default());
        selector.open();
        selector.select(Selection::Joint("current".to_string()));
        assert_eq!(value.get_untracked(), "current.joint");
        assert_eq!(Selection::parse("current.joint"), Selection::Joint("current".to_string()));

        let tree = AccountTree::new(Arc::new(sample_map()), "current.joint", SelectorOptions::default());
        assert!(tree.is_expanded("bank"));
    }
}
