use crate::domain::transaction::{DebtTransaction, TxId};

/// Ordered collection of debt transactions.
///
/// Insertion order is storage order and is what settlement allocates
/// against by default. Lookups are linear scans; personal ledgers stay small.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionStore {
    txs: Vec<DebtTransaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self { txs: Vec::new() }
    }

    pub fn from_vec(txs: Vec<DebtTransaction>) -> Self {
        Self { txs }
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DebtTransaction> {
        self.txs.iter()
    }

    pub fn add(&mut self, tx: DebtTransaction) {
        self.txs.push(tx);
    }

    pub fn contains_id(&self, id: &TxId) -> bool {
        self.txs.iter().any(|tx| &tx.id == id)
    }

    pub fn find_by_id(&self, id: &TxId) -> Option<&DebtTransaction> {
        self.txs.iter().find(|tx| &tx.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: &TxId) -> Option<&mut DebtTransaction> {
        self.txs.iter_mut().find(|tx| &tx.id == id)
    }

    /// Storage positions of the unsettled records for `person`, in order.
    pub(crate) fn open_positions_for(&self, person: &str) -> Vec<usize> {
        self.txs
            .iter()
            .enumerate()
            .filter(|(_, tx)| tx.is_open_for(person))
            .map(|(pos, _)| pos)
            .collect()
    }

    pub(crate) fn get(&self, pos: usize) -> Option<&DebtTransaction> {
        self.txs.get(pos)
    }

    pub(crate) fn get_mut(&mut self, pos: usize) -> Option<&mut DebtTransaction> {
        self.txs.get_mut(pos)
    }

    pub fn all_unsettled(&self) -> Vec<&DebtTransaction> {
        self.txs.iter().filter(|tx| !tx.is_settled()).collect()
    }

    pub fn all_settled(&self) -> Vec<&DebtTransaction> {
        self.txs.iter().filter(|tx| tx.is_settled()).collect()
    }

    pub fn all_for_person(&self, person: &str) -> Vec<&DebtTransaction> {
        self.txs.iter().filter(|tx| tx.person == person).collect()
    }

    pub fn unsettled_for_person(&self, person: &str) -> Vec<&DebtTransaction> {
        self.txs.iter().filter(|tx| tx.is_open_for(person)).collect()
    }

    /// Removes and returns the record with `id`, keeping the order of the rest.
    pub fn delete_by_id(&mut self, id: &TxId) -> Option<DebtTransaction> {
        let pos = self.txs.iter().position(|tx| &tx.id == id)?;
        Some(self.txs.remove(pos))
    }
}
