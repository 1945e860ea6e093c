use crate::{
    common::money::Money,
    domain::{
        netting::Totals,
        store::TransactionStore,
        transaction::{DebtTransaction, TxKind},
    },
};

/// Unsettled records of one person, split by direction.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonGroup<'a> {
    pub person: &'a str,
    pub totals: Totals,
    pub lent: Vec<&'a DebtTransaction>,
    pub borrowed: Vec<&'a DebtTransaction>,
}

impl PersonGroup<'_> {
    pub fn total_lent(&self) -> Money {
        self.totals.lent
    }

    pub fn total_borrowed(&self) -> Money {
        self.totals.borrowed
    }

    pub fn net_balance(&self) -> Money {
        self.totals.net()
    }
}

/// Groups unsettled transactions by person in first-seen order.
///
/// A read-only projection; rebuild it after every mutation.
pub fn group_by_person(store: &TransactionStore) -> Vec<PersonGroup<'_>> {
    let mut groups: Vec<PersonGroup<'_>> = Vec::new();

    for tx in store.iter().filter(|tx| !tx.is_settled()) {
        let idx = match groups.iter().position(|g| g.person == tx.person) {
            Some(idx) => idx,
            None => {
                groups.push(PersonGroup {
                    person: &tx.person,
                    totals: Totals::default(),
                    lent: Vec::new(),
                    borrowed: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[idx];
        group.totals.record(tx);
        match tx.kind {
            TxKind::Lent => group.lent.push(tx),
            TxKind::Borrowed => group.borrowed.push(tx),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::domain::transaction::TxId;

    fn push(store: &mut TransactionStore, kind: TxKind, person: &str, amount: i64) {
        store.add(DebtTransaction::new(
            TxId::generate(),
            kind,
            person,
            Money::from_major(amount),
            "",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
            Utc::now(),
        ));
    }

    #[test]
    fn groups_keep_first_seen_order_and_totals() {
        let mut store = TransactionStore::new();
        push(&mut store, TxKind::Borrowed, "Ravi", 50);
        push(&mut store, TxKind::Lent, "John", 1000);
        push(&mut store, TxKind::Borrowed, "John", 300);
        push(&mut store, TxKind::Lent, "Ravi", 20);

        let groups = group_by_person(&store);
        let names: Vec<_> = groups.iter().map(|g| g.person).collect();
        assert_eq!(names, vec!["Ravi", "John"]);

        let john = &groups[1];
        assert_eq!(john.total_lent(), Money::from_major(1000));
        assert_eq!(john.total_borrowed(), Money::from_major(300));
        assert_eq!(john.net_balance(), Money::from_major(700));
        assert_eq!(john.lent.len(), 1);
        assert_eq!(john.borrowed.len(), 1);

        assert_eq!(groups[0].net_balance(), Money::from_major(-30));
    }

    #[test]
    fn fully_settled_people_drop_out() {
        let mut store = TransactionStore::new();
        push(&mut store, TxKind::Lent, "Asha", 10);
        let id = store.iter().next().unwrap().id.clone();
        store
            .find_by_id_mut(&id)
            .unwrap()
            .settle_in_full(None, Utc::now());

        assert!(group_by_person(&store).is_empty());
    }
}
