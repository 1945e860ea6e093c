use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::{
    common::{error::LedgerError, money::Money},
    domain::{groups::PersonGroup, ledger::Ledger, transaction::DebtTransaction},
};

pub const DEBTS_NOTE: &str = "Debts.md";

/// Renders the markdown debts summary: overview totals, then one section per
/// person with the largest amount owed to the user first. Per-person amounts
/// carry the `currency` prefix.
pub fn render_debts_summary(
    ledger: &Ledger,
    currency: &str,
    updated_at: DateTime<Utc>,
) -> String {
    let totals = ledger.global_totals();
    let mut people: Vec<PersonGroup<'_>> = ledger.groups();
    people.sort_by(|a, b| b.net_balance().cmp(&a.net_balance()));

    let stamp = updated_at.format("%Y-%m-%d %H:%M:%S");
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "---\ntags: [debtq, debts, lending, finance]\nupdated: {stamp}\n---\n\n\
         # Debts & Lending Summary\n\n\
         > Last Updated: {stamp}\n\n\
         ## Overview\n\n\
         | Metric | Amount |\n\
         |--------|--------|\n\
         | Total Lent (others owe you) | {} |\n\
         | Total Borrowed (you owe) | {} |\n\
         | **Net Position** | {} |\n\n\
         ---\n\n\
         ## By Person\n",
        totals.lent.to_string_2dp(),
        totals.borrowed.to_string_2dp(),
        totals.net().to_string_2dp(),
    );

    if people.is_empty() {
        out.push_str("\n*No pending debts*\n");
    }

    for person in &people {
        let net = person.net_balance();
        let headline = if net.is_positive() {
            format!("**Owes you: {}**", plain(net, currency))
        } else if net.is_negative() {
            format!("**You owe: {}**", plain(net.abs(), currency))
        } else {
            "**Settled**".to_string()
        };
        let _ = write!(out, "\n### {}\n\n{headline}\n", person.person);
        push_table(&mut out, "Lent", '+', currency, &person.lent);
        push_table(&mut out, "Borrowed", '-', currency, &person.borrowed);
        out.push_str("\n---\n");
    }

    out
}

fn plain(amount: Money, currency: &str) -> String {
    format!("{currency} {}", amount.to_string_2dp())
}

/// Keeps free text inside one table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn push_table(
    out: &mut String,
    title: &str,
    sign: char,
    currency: &str,
    txs: &[&DebtTransaction],
) {
    if txs.is_empty() {
        return;
    }
    let _ = write!(
        out,
        "\n**{title}:**\n| Date | Amount | Reason |\n|------|--------|--------|\n"
    );
    for tx in txs {
        let _ = writeln!(
            out,
            "| {} | {sign}{} | {} |",
            tx.transaction_date.format("%Y-%m-%d"),
            plain(tx.amount, currency),
            cell(&tx.description)
        );
    }
}

/// Writes `Debts.md` into `dir`, creating the directory when needed.
pub fn write_debts_summary(
    dir: &Path,
    ledger: &Ledger,
    currency: &str,
) -> Result<PathBuf, LedgerError> {
    fs::create_dir_all(dir)
        .map_err(|e| LedgerError::persistence(format!("creating {}: {e}", dir.display())))?;
    let path = dir.join(DEBTS_NOTE);
    fs::write(&path, render_debts_summary(ledger, currency, Utc::now()))
        .map_err(|e| LedgerError::persistence(format!("writing {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "debts summary written");
    Ok(path)
}
