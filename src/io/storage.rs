use std::{
    fs,
    io::ErrorKind,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

use crate::{
    common::error::LedgerError,
    domain::{
        ledger::{Ledger, SettlementPolicy},
        transaction::DebtTransaction,
    },
};

/// The whole on-disk document.
///
/// Only `debt_transactions` belongs to the ledger. Other top-level keys
/// (expenses, investments, savings) are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub debt_transactions: Vec<DebtTransaction>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl LedgerDocument {
    pub fn to_ledger(&self, policy: SettlementPolicy) -> Ledger {
        Ledger::from_transactions(self.debt_transactions.clone(), policy)
    }

    /// Replaces the document's transactions with the ledger's current state.
    pub fn sync_from(&mut self, ledger: &Ledger) {
        self.debt_transactions = ledger.transactions();
    }
}

/// Single-document JSON persistence. Every save overwrites the whole file;
/// the last writer wins.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the document. A missing file is a first run and yields an empty
    /// document; so does a path that runs through a regular file, which the
    /// next save reports.
    pub fn load(&self) -> Result<LedgerDocument, LedgerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                tracing::debug!(path = %self.path.display(), "no data file yet, starting empty");
                return Ok(LedgerDocument::default());
            }
            Err(e) => {
                return Err(LedgerError::persistence(format!(
                    "reading {}: {e}",
                    self.path.display()
                )));
            }
        };

        let doc: LedgerDocument = serde_json::from_str(&raw).map_err(|e| {
            LedgerError::persistence(format!("parsing {}: {e}", self.path.display()))
        })?;
        tracing::debug!(
            path = %self.path.display(),
            transactions = doc.debt_transactions.len(),
            "data file loaded"
        );
        Ok(doc)
    }

    pub fn save(&self, doc: &LedgerDocument) -> Result<(), LedgerError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                LedgerError::persistence(format!("creating {}: {e}", dir.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| LedgerError::persistence(format!("encoding document: {e}")))?;
        fs::write(&self.path, json).map_err(|e| {
            LedgerError::persistence(format!("writing {}: {e}", self.path.display()))
        })?;
        tracing::debug!(
            path = %self.path.display(),
            transactions = doc.debt_transactions.len(),
            "data file saved"
        );
        Ok(())
    }
}
