use chrono::NaiveDate;

use crate::{
    common::money::Money,
    domain::transaction::{TxId, TxKind},
};

/// A ledger command sent from a front end (the CSV reader, tests) to the
/// processor.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    Add {
        kind: TxKind,
        person: String,
        amount: Money,
        description: String,
        date: NaiveDate,
        due_date: Option<NaiveDate>,
    },
    Settle {
        id: TxId,
        amount: Money,
        note: Option<String>,
    },
    SettlePerson {
        person: String,
        amount: Money,
        note: Option<String>,
    },
    Delete {
        id: TxId,
    },
}
