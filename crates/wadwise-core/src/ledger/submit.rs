//! Form POST built from a transaction form

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which submit control was used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitAction {
    #[default]
    Save,
    Delete,
    Copy,
    CopyNow,
}

impl SubmitAction {
    /// Actions offered for an already stored transaction, in display order
    pub const EXISTING: [SubmitAction; 3] = [SubmitAction::Delete, SubmitAction::CopyNow, SubmitAction::Copy];

    /// Value of the `action` field; `None` for a plain save
    pub fn field_value(self) -> Option<&'static str> {
        match self {
            SubmitAction::Save => None,
            SubmitAction::Delete => Some("delete"),
            SubmitAction::Copy => Some("copy"),
            SubmitAction::CopyNow => Some("copy-now"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubmitAction::Save => "Save",
            SubmitAction::Delete => "Delete",
            SubmitAction::Copy => "Copy",
            SubmitAction::CopyNow => "Copy Now",
        }
    }
}

impl FromStr for SubmitAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "save" => Ok(SubmitAction::Save),
            "delete" => Ok(SubmitAction::Delete),
            "copy" => Ok(SubmitAction::Copy),
            "copy-now" => Ok(SubmitAction::CopyNow),
            other => Err(format!("unknown submit action: {}", other)),
        }
    }
}

impl fmt::Display for SubmitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_value().unwrap_or("save"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub ops: String,
    pub desc: String,
    pub date: String,
    pub date_time: String,
    pub action: SubmitAction,
}

impl Submission {
    /// Form fields in posting order
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("ops", self.ops.clone()),
            ("desc", self.desc.clone()),
            ("date", self.date.clone()),
            ("date_time", self.date_time.clone()),
        ];
        if let Some(action) = self.action.field_value() {
            fields.push(("action", action.to_string()));
        }
        fields
    }
}
