use serde::{Deserialize, Serialize};

use crate::{
    common::money::Money,
    domain::{
        groups::{PersonGroup, group_by_person},
        netting::{self, Totals},
        store::TransactionStore,
        transaction::{DebtTransaction, TxId},
    },
};

/// Order in which person-level settlement walks a person's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationOrder {
    /// Insertion order of the store.
    #[default]
    Storage,
    /// Earliest `transaction_date` first; ties keep storage order.
    OldestFirst,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPolicy {
    #[serde(default)]
    pub allocation_order: AllocationOrder,
}

/// The owned ledger handle.
///
/// All mutation goes through `&mut Ledger`, so exactly one caller can change
/// it at a time. Persisting after a mutation is the caller's job. The
/// mutating operations live with their handlers in `worker::operations`.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    store: TransactionStore,
    policy: SettlementPolicy,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SettlementPolicy) -> Self {
        Self {
            store: TransactionStore::new(),
            policy,
        }
    }

    pub fn from_transactions(txs: Vec<DebtTransaction>, policy: SettlementPolicy) -> Self {
        Self {
            store: TransactionStore::from_vec(txs),
            policy,
        }
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut TransactionStore {
        &mut self.store
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    pub fn transactions(&self) -> Vec<DebtTransaction> {
        self.store.iter().cloned().collect()
    }

    /// A random id not yet used in this ledger.
    pub(crate) fn fresh_id(&self) -> TxId {
        loop {
            let id = TxId::generate();
            if !self.store.contains_id(&id) {
                return id;
            }
        }
    }

    pub fn find(&self, id: &TxId) -> Option<&DebtTransaction> {
        self.store.find_by_id(id)
    }

    pub fn net_balance(&self, person: &str) -> Money {
        netting::net_balance(&self.store, person)
    }

    pub fn totals_for(&self, person: &str) -> Totals {
        netting::totals_for(&self.store, person)
    }

    pub fn global_totals(&self) -> Totals {
        netting::global_totals(&self.store)
    }

    pub fn unsettled_for(&self, person: &str) -> Vec<&DebtTransaction> {
        self.store.unsettled_for_person(person)
    }

    pub fn all_for(&self, person: &str) -> Vec<&DebtTransaction> {
        self.store.all_for_person(person)
    }

    pub fn all_unsettled(&self) -> Vec<&DebtTransaction> {
        self.store.all_unsettled()
    }

    pub fn all_settled(&self) -> Vec<&DebtTransaction> {
        self.store.all_settled()
    }

    pub fn groups(&self) -> Vec<PersonGroup<'_>> {
        group_by_person(&self.store)
    }
}
