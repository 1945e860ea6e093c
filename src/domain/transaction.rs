use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{error::LedgerError, money::Money};

const PARTIAL_MARKER: &str = "(partial settlement)";

/// Opaque transaction identifier, assigned once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Eight hex characters taken from a random v4 uuid.
    pub fn generate() -> Self {
        let mut raw = uuid::Uuid::new_v4().simple().to_string();
        raw.truncate(8);
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction of the debt relative to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// The user owes the person.
    Borrowed,
    /// The person owes the user.
    Lent,
}

impl TxKind {
    pub fn opposite(self) -> Self {
        match self {
            TxKind::Borrowed => TxKind::Lent,
            TxKind::Lent => TxKind::Borrowed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TxKind::Borrowed => "borrowed",
            TxKind::Lent => "lent",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "borrowed" => Ok(TxKind::Borrowed),
            "lent" => Ok(TxKind::Lent),
            other => Err(LedgerError::validation(format!(
                "unknown transaction kind: {other}"
            ))),
        }
    }
}

/// A single borrowed/lent record.
///
/// `amount` is what is still outstanding on this record; settlement can
/// shrink it but never to zero (a record that would reach zero is settled
/// instead). Once `is_settled` is true the record is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtTransaction {
    pub id: TxId,
    #[serde(rename = "type")]
    pub kind: TxKind,
    #[serde(rename = "person_name")]
    pub person: String,
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "date", deserialize_with = "document_date::deserialize")]
    pub transaction_date: NaiveDate,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "document_date::deserialize_opt"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "is_settled", default)]
    pub settled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DebtTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: TxId,
        kind: TxKind,
        person: impl Into<String>,
        amount: Money,
        description: impl Into<String>,
        transaction_date: NaiveDate,
        due_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            person: person.into(),
            amount,
            description: description.into(),
            transaction_date,
            due_date,
            settled: false,
            settled_date: None,
            settlement_amount: None,
            settlement_note: None,
            created_at,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn is_open_for(&self, person: &str) -> bool {
        !self.settled && self.person == person
    }

    /// Marks the whole outstanding amount as settled.
    pub fn settle_in_full(&mut self, note: Option<String>, now: DateTime<Utc>) {
        self.settled = true;
        self.settled_date = Some(now);
        self.settlement_amount = Some(self.amount);
        self.settlement_note = note;
    }

    /// Settles `portion` of this record by splitting it: `self` keeps the
    /// remainder (still unsettled) and the returned record carries the
    /// settled portion. Caller guarantees `0 < portion < self.amount`.
    pub fn split_settled(
        &mut self,
        portion: Money,
        new_id: TxId,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> DebtTransaction {
        debug_assert!(portion.is_positive() && portion < self.amount);
        self.amount -= portion;

        let description = if self.description.trim().is_empty() {
            PARTIAL_MARKER.to_string()
        } else {
            format!("{} {PARTIAL_MARKER}", self.description)
        };

        DebtTransaction {
            id: new_id,
            kind: self.kind,
            person: self.person.clone(),
            amount: portion,
            description,
            transaction_date: self.transaction_date,
            due_date: self.due_date,
            settled: true,
            settled_date: Some(now),
            settlement_amount: Some(portion),
            settlement_note: note,
            created_at: now,
        }
    }
}

/// Dates are written as `YYYY-MM-DD`. Older documents carry full RFC 3339
/// timestamps; those keep the calendar date of their own offset.
mod document_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, de::Error};

    fn parse(raw: &str) -> Result<NaiveDate, String> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
            .map_err(|e| format!("invalid date {raw:?}: {e}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse(&raw).map_err(D::Error::custom))
            .transpose()
    }
}
