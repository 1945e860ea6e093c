use crate::{
    common::money::Money,
    domain::{
        store::TransactionStore,
        transaction::{DebtTransaction, TxKind},
    },
};

/// Lent/borrowed totals over unsettled records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub lent: Money,
    pub borrowed: Money,
}

impl Totals {
    /// Positive: they owe the user. Negative: the user owes them.
    pub fn net(&self) -> Money {
        self.lent - self.borrowed
    }

    pub fn record(&mut self, tx: &DebtTransaction) {
        match tx.kind {
            TxKind::Lent => self.lent += tx.amount,
            TxKind::Borrowed => self.borrowed += tx.amount,
        }
    }

    pub fn of_kind(&self, kind: TxKind) -> Money {
        match kind {
            TxKind::Lent => self.lent,
            TxKind::Borrowed => self.borrowed,
        }
    }
}

pub fn totals_for(store: &TransactionStore, person: &str) -> Totals {
    let mut totals = Totals::default();
    for tx in store.iter().filter(|tx| tx.is_open_for(person)) {
        totals.record(tx);
    }
    totals
}

pub fn total_lent(store: &TransactionStore, person: &str) -> Money {
    totals_for(store, person).lent
}

pub fn total_borrowed(store: &TransactionStore, person: &str) -> Money {
    totals_for(store, person).borrowed
}

pub fn net_balance(store: &TransactionStore, person: &str) -> Money {
    totals_for(store, person).net()
}

/// Totals across every person, for dashboards and report headers.
pub fn global_totals(store: &TransactionStore) -> Totals {
    let mut totals = Totals::default();
    for tx in store.iter().filter(|tx| !tx.is_settled()) {
        totals.record(tx);
    }
    totals
}
