use std::io::Write;

use crate::domain::{groups::PersonGroup, transaction::DebtTransaction};

#[derive(serde::Serialize)]
/// Internal CSV output row for per-person balances.
///
/// Headers written (in this order): `person,total_lent,total_borrowed,net_balance`.
/// Monetary fields are formatted to 2 decimal places as strings.
struct BalanceRow<'a> {
    person: &'a str,
    total_lent: String,
    total_borrowed: String,
    net_balance: String,
}

#[derive(serde::Serialize)]
/// Internal CSV output row for a full transaction export.
struct TransactionRow<'a> {
    id: &'a str,
    kind: &'a str,
    person: &'a str,
    amount: String,
    description: &'a str,
    date: String,
    due_date: String,
    settled: bool,
    settled_date: String,
    settlement_amount: String,
    settlement_note: &'a str,
}

/// Writes one row per person group, keeping the groups' order.
///
/// # Errors
///
/// Returns a `csv::Error` if writing/serializing any row fails.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use debt_ledger::common::money::Money;
/// use debt_ledger::domain::{ledger::Ledger, transaction::TxKind};
/// use debt_ledger::io::writer::write_balances;
///
/// let mut ledger = Ledger::new();
/// let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// ledger.add_transaction(TxKind::Lent, "John", Money::from_major(1000), "", day, None).unwrap();
/// ledger.add_transaction(TxKind::Borrowed, "John", Money::from_major(300), "", day, None).unwrap();
///
/// let mut out = Vec::new();
/// write_balances(&mut out, &ledger.groups()).unwrap();
///
/// let s = String::from_utf8(out).unwrap();
/// assert_eq!(s, "person,total_lent,total_borrowed,net_balance\nJohn,1000.00,300.00,700.00\n");
/// ```
pub fn write_balances<W: Write>(writer: W, groups: &[PersonGroup<'_>]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for group in groups {
        wtr.serialize(BalanceRow {
            person: group.person,
            total_lent: group.total_lent().to_string_2dp(),
            total_borrowed: group.total_borrowed().to_string_2dp(),
            net_balance: group.net_balance().to_string_2dp(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes every field of the given transactions, settled ones included.
pub fn write_transactions<W: Write>(
    writer: W,
    txs: &[&DebtTransaction],
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for tx in txs {
        wtr.serialize(TransactionRow {
            id: tx.id.as_str(),
            kind: tx.kind.as_str(),
            person: &tx.person,
            amount: tx.amount.to_string_4dp(),
            description: &tx.description,
            date: tx.transaction_date.to_string(),
            due_date: tx.due_date.map(|d| d.to_string()).unwrap_or_default(),
            settled: tx.settled,
            settled_date: tx.settled_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
            settlement_amount: tx
                .settlement_amount
                .map(|m| m.to_string_4dp())
                .unwrap_or_default(),
            settlement_note: tx.settlement_note.as_deref().unwrap_or(""),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
