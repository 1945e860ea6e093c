use crate::{
    common::error::LedgerError,
    domain::{
        ledger::Ledger,
        transaction::{DebtTransaction, TxId},
    },
};

/// Removes a mistaken entry. Settled records can be deleted too; settlement
/// never calls this.
pub fn handle(ledger: &mut Ledger, id: &TxId) -> Result<DebtTransaction, LedgerError> {
    let removed = ledger
        .store_mut()
        .delete_by_id(id)
        .ok_or_else(|| LedgerError::not_found(format!("transaction {id}")))?;
    tracing::info!(id = %removed.id, person = %removed.person, "transaction deleted");
    Ok(removed)
}
