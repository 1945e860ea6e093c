use crate::{
    common::{error::LedgerError, event::LedgerCommand, money::Money},
    domain::transaction::{TxId, TxKind},
};
use chrono::NaiveDate;
use std::{io::Read, str::FromStr};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(serde::Deserialize)]
/// Internal CSV row representation matching the command headers. Columns a
/// command does not use stay empty.
struct CsvRow {
    op: String,
    id: Option<String>,
    kind: Option<String>,
    person: Option<String>,
    amount: Option<String>,
    description: Option<String>,
    date: Option<String>,
    due_date: Option<String>,
    note: Option<String>,
}

/// Reads ledger commands from a CSV reader.
///
/// Supported headers: `op,id,kind,person,amount,description,date,due_date,note`.
/// `op` is one of `add`, `settle`, `settle_person`, `delete` (case-insensitive).
/// Malformed rows come back as `LedgerError::Validation` carrying the row
/// number, so a caller can skip them and keep going.
///
/// # Examples
///
/// ```
/// use debt_ledger::io::reader::read_commands;
/// use debt_ledger::common::event::LedgerCommand;
/// use csv::ReaderBuilder;
///
/// let data = "op,id,kind,person,amount,description,date,due_date,note\n\
/// add,,lent,John,1000,rent,2024-05-01,,\n\
/// settle_person,,,John,0,,,,cash\n";
/// let mut rdr = ReaderBuilder::new().from_reader(data.as_bytes());
/// let commands: Vec<_> = read_commands(&mut rdr).collect();
///
/// assert!(matches!(commands[0], Ok(LedgerCommand::Add { .. })));
/// assert!(matches!(commands[1], Ok(LedgerCommand::SettlePerson { .. })));
/// ```
pub fn read_commands<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> impl Iterator<Item = Result<LedgerCommand, LedgerError>> + '_ {
    let headers = rdr.headers().cloned();
    rdr.records().map(move |res| {
        let headers = headers
            .as_ref()
            .map_err(|e| LedgerError::validation(format!("header: {e}")))?;
        let record = res.map_err(|e| LedgerError::validation(e.to_string()))?;
        // line the record starts on; quoted fields may span several
        let line = record.position().map_or(0, |pos| pos.line());
        let row: CsvRow = record
            .deserialize(Some(headers))
            .map_err(|e| LedgerError::validation(format!("line {line}: {e}")))?;
        parse_row(row).map_err(|e| match e {
            LedgerError::Validation(msg) => LedgerError::validation(format!("line {line}: {msg}")),
            other => other,
        })
    })
}

fn parse_row(row: CsvRow) -> Result<LedgerCommand, LedgerError> {
    let op = row.op.trim().to_ascii_lowercase();
    match op.as_str() {
        "add" => Ok(LedgerCommand::Add {
            kind: required(row.kind, "kind")?.parse::<TxKind>()?,
            person: required(row.person, "person")?,
            amount: parse_amount(&required(row.amount, "amount")?)?,
            description: present(row.description).unwrap_or_default(),
            date: parse_date(&required(row.date, "date")?)?,
            due_date: present(row.due_date)
                .map(|d| parse_date(&d))
                .transpose()?,
        }),
        "settle" => Ok(LedgerCommand::Settle {
            id: TxId::new(required(row.id, "id")?),
            amount: parse_amount(&required(row.amount, "amount")?)?,
            note: present(row.note),
        }),
        "settle_person" => Ok(LedgerCommand::SettlePerson {
            person: required(row.person, "person")?,
            amount: present(row.amount)
                .map(|a| parse_amount(&a))
                .transpose()?
                .unwrap_or_else(Money::zero),
            note: present(row.note),
        }),
        "delete" => Ok(LedgerCommand::Delete {
            id: TxId::new(required(row.id, "id")?),
        }),
        other => Err(LedgerError::validation(format!("unknown op: {other}"))),
    }
}

fn present(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required(field: Option<String>, name: &str) -> Result<String, LedgerError> {
    present(field).ok_or_else(|| LedgerError::validation(format!("missing {name}")))
}

fn parse_amount(raw: &str) -> Result<Money, LedgerError> {
    Money::from_str(raw).map_err(|e| LedgerError::validation(format!("bad amount {raw}: {e}")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| LedgerError::validation(format!("malformed date {raw}: {e}")))
}
