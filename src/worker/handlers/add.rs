use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    common::{error::LedgerError, money::Money},
    domain::{
        ledger::Ledger,
        netting,
        transaction::{DebtTransaction, TxKind},
    },
};

/// Caller-supplied fields of a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TxKind,
    pub person: String,
    pub amount: Money,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}

pub fn handle(
    ledger: &mut Ledger,
    new: NewTransaction,
    now: DateTime<Utc>,
) -> Result<DebtTransaction, LedgerError> {
    if new.person.trim().is_empty() {
        return Err(LedgerError::validation("person name must not be empty"));
    }
    if !new.amount.is_positive() {
        return Err(LedgerError::validation(format!(
            "amount must be positive, got {}",
            new.amount
        )));
    }

    // Person and global totals are bounded by the gross open amount.
    let open = netting::global_totals(ledger.store());
    let headroom = open
        .lent
        .checked_add(open.borrowed)
        .and_then(|gross| gross.checked_add(new.amount));
    if headroom.is_none() {
        return Err(LedgerError::validation(format!(
            "amount {} would overflow the ledger totals",
            new.amount
        )));
    }

    let tx = DebtTransaction::new(
        ledger.fresh_id(),
        new.kind,
        new.person,
        new.amount,
        new.description,
        new.transaction_date,
        new.due_date,
        now,
    );
    tracing::info!(
        id = %tx.id,
        kind = %tx.kind,
        person = %tx.person,
        amount = %tx.amount,
        "transaction added"
    );
    ledger.store_mut().add(tx.clone());
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_tx(person: &str, amount: Money) -> NewTransaction {
        NewTransaction {
            kind: TxKind::Borrowed,
            person: person.to_string(),
            amount,
            description: "lunch".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 10),
        }
    }

    #[test]
    fn add_appends_unsettled_record() {
        let mut ledger = Ledger::new();
        let now = Utc::now();

        let tx = handle(&mut ledger, new_tx("Ravi", Money::from_major(40)), now).unwrap();

        assert_eq!(ledger.store().len(), 1);
        let stored = ledger.find(&tx.id).expect("tx recorded");
        assert_eq!(stored, &tx);
        assert!(!stored.is_settled());
        assert!(stored.settled_date.is_none());
        assert!(stored.settlement_amount.is_none());
        assert!(stored.settlement_note.is_none());
        assert_eq!(stored.created_at, now);
        assert_eq!(stored.due_date, NaiveDate::from_ymd_opt(2024, 3, 10));
    }

    #[test]
    fn add_rejects_non_positive_amounts() {
        let mut ledger = Ledger::new();

        for amount in [Money::zero(), Money::from_major(-5)] {
            let err = handle(&mut ledger, new_tx("Ravi", amount), Utc::now()).unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)));
        }
        assert!(ledger.store().is_empty());
    }

    #[test]
    fn add_rejects_blank_person() {
        let mut ledger = Ledger::new();
        let err = handle(&mut ledger, new_tx("  ", Money::from_major(1)), Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger.store().is_empty());
    }

    #[test]
    fn add_rejects_amount_that_overflows_totals() {
        let mut ledger = Ledger::new();
        let huge = Money::from_major(900_000_000_000_000);
        let mut lent = new_tx("John", huge);
        lent.kind = TxKind::Lent;

        handle(&mut ledger, lent.clone(), Utc::now()).unwrap();
        let err = handle(&mut ledger, lent, Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        // the other side counts towards the gross open amount too
        let err = handle(&mut ledger, new_tx("Ravi", huge), Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        assert_eq!(ledger.store().len(), 1);
        assert_eq!(ledger.net_balance("John"), huge);
        assert_eq!(ledger.groups()[0].total_lent(), huge);
    }
}
