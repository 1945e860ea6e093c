use chrono::{NaiveDate, Utc};

use crate::{
    common::{error::LedgerError, money::Money},
    domain::{
        ledger::Ledger,
        transaction::{DebtTransaction, TxId, TxKind},
    },
    worker::handlers::{
        add::{self, NewTransaction},
        delete,
        settle::{self, SettleOutcome},
        settle_person,
    },
};

/// The mutating ledger operations. Each one stamps the current time and runs
/// its handler.
impl Ledger {
    pub fn add_transaction(
        &mut self,
        kind: TxKind,
        person: &str,
        amount: Money,
        description: &str,
        transaction_date: NaiveDate,
        due_date: Option<NaiveDate>,
    ) -> Result<DebtTransaction, LedgerError> {
        let new = NewTransaction {
            kind,
            person: person.to_string(),
            amount,
            description: description.to_string(),
            transaction_date,
            due_date,
        };
        add::handle(self, new, Utc::now())
    }

    /// Settles `amount` of one record, splitting it when `amount` is less
    /// than what is outstanding.
    pub fn settle_transaction(
        &mut self,
        id: &TxId,
        amount: Money,
        note: Option<&str>,
    ) -> Result<SettleOutcome, LedgerError> {
        settle::handle(self, id, amount, note.map(str::to_string), Utc::now())
    }

    /// Settles `amount` against the person's net position; zero settles the
    /// whole net position. Returns the amount applied.
    pub fn settle_for_person(
        &mut self,
        person: &str,
        amount: Money,
        note: Option<&str>,
    ) -> Result<Money, LedgerError> {
        settle_person::handle(self, person, amount, note.map(str::to_string), Utc::now())
    }

    pub fn delete_transaction(&mut self, id: &TxId) -> Result<DebtTransaction, LedgerError> {
        delete::handle(self, id)
    }
}
