//! Account create/edit form and confirmed deletion

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::accounts::{AccountMap, AccountRecord, AccountType};
use crate::error::{CoreError, CoreResult};

/// `is_hidden` choices: inherit from the parent, hide, show
pub const HIDDEN_OPTIONS: [(&str, &str); 3] = [("", "Inherit"), ("1", "Hide"), ("0", "Show")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEditForm {
    /// `None` while creating a new account
    pub aid: Option<String>,
    pub name: String,
    pub account_type: AccountType,
    pub parent: String,
    pub desc: String,
    pub is_hidden: Option<bool>,
    pub is_placeholder: bool,
}

impl AccountEditForm {
    /// Blank form for a new account, optionally under `parent`.
    ///
    /// The type is inherited from the parent when it is known.
    pub fn new_child(accounts: &AccountMap, parent: Option<&str>) -> Self {
        let parent_account = parent.and_then(|p| accounts.get(p));
        Self {
            aid: None,
            name: String::new(),
            account_type: parent_account.map(|p| p.account_type).unwrap_or(AccountType::Expense),
            parent: parent_account.map(|p| p.aid.clone()).unwrap_or_default(),
            desc: String::new(),
            is_hidden: None,
            is_placeholder: false,
        }
    }

    pub fn from_record(record: &AccountRecord) -> Self {
        Self {
            aid: Some(record.aid.clone()),
            name: record.name.clone(),
            account_type: record.account_type,
            parent: record.parent.clone().unwrap_or_default(),
            desc: record.desc.clone().unwrap_or_default(),
            is_hidden: record.is_hidden,
            is_placeholder: record.is_placeholder,
        }
    }

    pub fn is_new(&self) -> bool {
        self.aid.is_none()
    }

    pub fn hidden_value(&self) -> &'static str {
        match self.is_hidden {
            None => "",
            Some(true) => "1",
            Some(false) => "0",
        }
    }

    /// Candidate parents as `(value, title)`, sorted by title.
    ///
    /// The account itself and its descendants are left out; the first entry
    /// is the empty "top level" choice.
    pub fn parent_options(&self, accounts: &AccountMap) -> Vec<(String, String)> {
        let excluded: HashSet<String> = match &self.aid {
            Some(aid) => accounts.descendants(aid).into_iter().collect(),
            None => HashSet::new(),
        };
        let mut options: Vec<(String, String)> = accounts
            .iter()
            .filter(|a| !excluded.contains(&a.aid))
            .map(|a| (a.aid.clone(), a.full_name.clone()))
            .collect();
        options.sort_by(|a, b| a.1.cmp(&b.1));
        options.insert(0, (String::new(), "(top level)".to_string()));
        options
    }

    /// Form fields in posting order; an unchecked placeholder box is omitted
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("type", self.account_type.code().to_string()),
            ("parent", self.parent.clone()),
            ("desc", self.desc.clone()),
            ("is_hidden", self.hidden_value().to_string()),
        ];
        if self.is_placeholder {
            fields.push(("is_placeholder", "on".to_string()));
        }
        fields
    }

    /// First step of deleting: nothing is deleted until the returned
    /// confirmation is confirmed.
    pub fn request_delete(&self, accounts: &AccountMap) -> CoreResult<DeleteConfirmation> {
        let aid = self.aid.as_ref().ok_or_else(|| CoreError::ValidationError {
            message: "a new account cannot be deleted".to_string(),
        })?;
        Ok(DeleteConfirmation {
            aid: aid.clone(),
            title: accounts.title(aid),
        })
    }
}

/// Pending account deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub aid: String,
    pub title: String,
}

/// Confirmed account deletion, ready to post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub aid: String,
}

impl DeleteConfirmation {
    pub fn prompt(&self) -> String {
        format!("Delete {}?", self.title)
    }

    pub fn confirm(self) -> DeleteRequest {
        DeleteRequest { aid: self.aid }
    }

    pub fn cancel(self) {}

    /// Confirm when the user answered yes, otherwise report that
    /// confirmation is still required.
    pub fn resolve(self, confirmed: bool) -> CoreResult<DeleteRequest> {
        if confirmed {
            Ok(self.confirm())
        } else {
            Err(CoreError::ConfirmationRequired {
                action: self.prompt(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::tests::{record, sample_map};
    use crate::error::ErrorCode;

    #[test]
    fn test_parent_options_exclude_subtree() {
        let map = sample_map();
        let form = AccountEditForm::from_record(&record("bank", "Bank", AccountType::Asset, Some("assets")));
        let values: Vec<String> = form.parent_options(&map).into_iter().map(|(v, _)| v).collect();
        assert_eq!(values[0], "");
        assert!(values.contains(&"assets".to_string()));
        assert!(values.contains(&"cash".to_string()));
        assert!(!values.contains(&"bank".to_string()));
        assert!(!values.contains(&"current".to_string()));
        assert!(!values.contains(&"savings".to_string()));
    }

    #[test]
    fn test_new_child_inherits_type() {
        let map = sample_map();
        let form = AccountEditForm::new_child(&map, Some("bank"));
        assert_eq!(form.parent, "bank");
        assert_eq!(form.account_type, AccountType::Asset);
        assert!(form.is_new());
        assert_eq!(form.parent_options(&map).len(), map.len() + 1);
    }

    #[test]
    fn test_fields() {
        let mut form = AccountEditForm::from_record(&record("food", "Food", AccountType::Expense, Some("exp")));
        form.is_hidden = Some(true);
        let fields = form.to_fields();
        assert_eq!(fields[1], ("type", "e".to_string()));
        assert_eq!(fields[4], ("is_hidden", "1".to_string()));
        assert_eq!(fields.len(), 5);
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let map = sample_map();
        let form = AccountEditForm::from_record(&record("food", "Food", AccountType::Expense, Some("exp")));

        let pending = form.request_delete(&map).unwrap();
        assert_eq!(pending.prompt(), "Delete Expenses:Food?");
        let err = pending.clone().resolve(false).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfirmationRequired);
        assert_eq!(pending.resolve(true).unwrap(), DeleteRequest { aid: "food".to_string() });

        let new = AccountEditForm::new_child(&map, None);
        assert!(new.request_delete(&map).is_err());
    }
}
