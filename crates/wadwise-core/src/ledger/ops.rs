//! Transaction legs and the `ops` submission payload
//!
//! The payload is either `{"simple": [src, dest, amount, cur]}` or
//! `{"ops": [[account, amount, cur, is_primary], ...]}`. Amounts travel as
//! JSON numbers. Legs decoded from three-element arrays default to
//! `is_primary = false`.

use rust_decimal::Decimal;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Monetary amount serialized as a JSON number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] pub Decimal);

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

/// One signed leg of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub account: String,
    pub amount: Decimal,
    pub currency: String,
    pub is_primary: bool,
}

impl Operation {
    pub fn new(account: &str, amount: Decimal, currency: &str, is_primary: bool) -> Self {
        Self {
            account: account.to_string(),
            amount,
            currency: currency.to_string(),
            is_primary,
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(4))?;
        seq.serialize_element(&self.account)?;
        seq.serialize_element(&Amount(self.amount))?;
        seq.serialize_element(&self.currency)?;
        seq.serialize_element(&self.is_primary)?;
        seq.end()
    }
}

struct OperationVisitor;

impl<'de> Visitor<'de> for OperationVisitor {
    type Value = Operation;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "an [account, amount, currency, is_primary?] array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Operation, A::Error> {
        let account: Option<String> = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let amount: Amount = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let currency: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(2, &self))?;
        let is_primary: Option<bool> = seq.next_element()?;
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}

        Ok(Operation {
            account: account.unwrap_or_default(),
            amount: amount.0,
            currency,
            is_primary: is_primary.unwrap_or(false),
        })
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(OperationVisitor)
    }
}

/// `[src, dest, amount, cur]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTransfer(pub String, pub String, pub Amount, pub String);

impl SimpleTransfer {
    pub fn new(src: &str, dest: &str, amount: Decimal, cur: &str) -> Self {
        SimpleTransfer(src.to_string(), dest.to_string(), Amount(amount), cur.to_string())
    }
}

/// Value of the hidden `ops` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Simple(SimpleTransfer),
    Ops(Vec<Operation>),
}

impl Payload {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Every leg, with simple transfers expanded into their two legs
    pub fn operations(&self) -> Vec<Operation> {
        match self {
            Payload::Simple(SimpleTransfer(src, dest, amount, cur)) => {
                op2(src, dest, amount.0, cur, false).to_vec()
            }
            Payload::Ops(ops) => ops.clone(),
        }
    }
}

/// Move `amount` from `src` to `dest`
pub fn op2(src: &str, dest: &str, amount: Decimal, cur: &str, is_primary: bool) -> [Operation; 2] {
    [
        Operation::new(src, -amount, cur, is_primary),
        Operation::new(dest, amount, cur, is_primary),
    ]
}
