use chrono::{DateTime, Utc};

use crate::{
    common::{error::LedgerError, money::Money},
    domain::{ledger::Ledger, transaction::TxId},
};

/// What settling a single record did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The record itself was settled for its whole amount.
    Full,
    /// The record was reduced and a new settled record was appended.
    Split { settled: TxId },
}

pub fn handle(
    ledger: &mut Ledger,
    id: &TxId,
    amount: Money,
    note: Option<String>,
    now: DateTime<Utc>,
) -> Result<SettleOutcome, LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::validation(format!(
            "settlement amount must be positive, got {amount}"
        )));
    }

    let outstanding = {
        let tx = ledger
            .find(id)
            .ok_or_else(|| LedgerError::not_found(format!("transaction {id}")))?;
        if tx.is_settled() {
            return Err(LedgerError::validation(format!(
                "transaction {id} is already settled"
            )));
        }
        tx.amount
    };
    if amount > outstanding {
        return Err(LedgerError::validation(format!(
            "settlement amount {amount} exceeds outstanding {outstanding} on transaction {id}"
        )));
    }

    if amount == outstanding {
        let tx = ledger
            .store_mut()
            .find_by_id_mut(id)
            .ok_or_else(|| LedgerError::not_found(format!("transaction {id}")))?;
        tx.settle_in_full(note, now);
        tracing::info!(id = %id, person = %tx.person, amount = %amount, "transaction settled");
        return Ok(SettleOutcome::Full);
    }

    let new_id = ledger.fresh_id();
    let split = {
        let tx = ledger
            .store_mut()
            .find_by_id_mut(id)
            .ok_or_else(|| LedgerError::not_found(format!("transaction {id}")))?;
        tx.split_settled(amount, new_id.clone(), note, now)
    };
    tracing::info!(
        id = %id,
        split_id = %new_id,
        person = %split.person,
        amount = %amount,
        "transaction partially settled"
    );
    ledger.store_mut().add(split);
    Ok(SettleOutcome::Split { settled: new_id })
}
