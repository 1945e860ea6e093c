use chrono::{DateTime, Utc};

use crate::{
    common::{error::LedgerError, money::Money},
    domain::{
        ledger::{AllocationOrder, Ledger},
        netting,
        transaction::TxKind,
    },
};

/// Settles an amount against a person's net position.
///
/// With a non-zero net balance the requested amount (zero meaning "all") is
/// clamped to `|net|` and paid off the dominant side. The opposite side is
/// offset in full up to `|net|`, and the same offset is also taken off the
/// dominant side, so the net balance moves by exactly the returned amount.
/// With a zero net balance every open record of the person is settled and the
/// gross amount of one side is returned.
pub fn handle(
    ledger: &mut Ledger,
    person: &str,
    amount: Money,
    note: Option<String>,
    now: DateTime<Utc>,
) -> Result<Money, LedgerError> {
    if amount.is_negative() {
        return Err(LedgerError::validation(format!(
            "settlement amount must not be negative, got {amount}"
        )));
    }

    let totals = netting::totals_for(ledger.store(), person);
    let net = totals.net();

    if net.is_zero() {
        let positions = ledger.store().open_positions_for(person);
        if positions.is_empty() {
            return Ok(Money::zero());
        }
        for pos in positions {
            if let Some(tx) = ledger.store_mut().get_mut(pos) {
                tx.settle_in_full(note.clone(), now);
            }
        }
        tracing::info!(person, amount = %totals.lent, "even balance settled on both sides");
        return Ok(totals.lent);
    }

    let dominant = if net.is_positive() {
        TxKind::Lent
    } else {
        TxKind::Borrowed
    };
    let opposite = dominant.opposite();
    let limit = net.abs();
    let target = if amount.is_zero() {
        limit
    } else {
        amount.min(limit)
    };
    let offset = totals.of_kind(opposite).min(limit);

    let offset_settled = allocate(ledger, person, opposite, offset, &note, now);
    let dominant_settled = allocate(ledger, person, dominant, target + offset, &note, now);
    debug_assert_eq!(offset_settled, offset);
    debug_assert_eq!(dominant_settled, target + offset);

    tracing::info!(
        person,
        side = %dominant,
        amount = %target,
        offset = %offset_settled,
        "person balance settled"
    );
    Ok(target)
}

/// Settles up to `budget` across the person's open records of `kind`.
/// Whole records are settled while they fit; the record that does not fit is
/// split. Returns what was settled.
fn allocate(
    ledger: &mut Ledger,
    person: &str,
    kind: TxKind,
    budget: Money,
    note: &Option<String>,
    now: DateTime<Utc>,
) -> Money {
    let mut positions: Vec<usize> = ledger
        .store()
        .open_positions_for(person)
        .into_iter()
        .filter(|&pos| ledger.store().get(pos).is_some_and(|tx| tx.kind == kind))
        .collect();
    if ledger.policy().allocation_order == AllocationOrder::OldestFirst {
        let store = ledger.store();
        positions.sort_by_key(|&pos| store.get(pos).map(|tx| tx.transaction_date));
    }

    let mut remaining = budget;
    for pos in positions {
        if !remaining.is_positive() {
            break;
        }
        let Some(outstanding) = ledger.store().get(pos).map(|tx| tx.amount) else {
            continue;
        };
        if outstanding <= remaining {
            if let Some(tx) = ledger.store_mut().get_mut(pos) {
                tx.settle_in_full(note.clone(), now);
                remaining -= outstanding;
            }
        } else {
            let new_id = ledger.fresh_id();
            if let Some(tx) = ledger.store_mut().get_mut(pos) {
                let split = tx.split_settled(remaining, new_id, note.clone(), now);
                remaining = Money::zero();
                ledger.store_mut().add(split);
            }
        }
    }

    budget - remaining
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{
        ledger::SettlementPolicy,
        transaction::{DebtTransaction, TxId},
    };

    fn m(v: i64) -> Money {
        Money::from_major(v)
    }

    fn add(ledger: &mut Ledger, kind: TxKind, person: &str, amount: i64, day: u32) -> TxId {
        ledger
            .add_transaction(
                kind,
                person,
                m(amount),
                "",
                NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
                None,
            )
            .unwrap()
            .id
    }

    fn settled_amounts(ledger: &Ledger) -> Vec<Money> {
        ledger.all_settled().iter().map(|tx| tx.amount).collect()
    }

    #[test]
    fn zero_amount_settles_whole_net_position() {
        let mut ledger = Ledger::new();
        add(&mut ledger, TxKind::Lent, "John", 400, 1);
        add(&mut ledger, TxKind::Lent, "John", 600, 2);
        add(&mut ledger, TxKind::Borrowed, "John", 300, 3);

        let settled = handle(&mut ledger, "John", Money::zero(), None, Utc::now()).unwrap();

        assert_eq!(settled, m(700));
        assert_eq!(ledger.net_balance("John"), Money::zero());
        assert!(ledger.unsettled_for("John").is_empty());
    }

    #[test]
    fn request_is_clamped_to_net_balance() {
        let mut ledger = Ledger::new();
        add(&mut ledger, TxKind::Borrowed, "Ravi", 250, 1);

        let settled = handle(&mut ledger, "Ravi", m(900), None, Utc::now()).unwrap();

        assert_eq!(settled, m(250));
        assert_eq!(ledger.net_balance("Ravi"), Money::zero());
    }

    #[test]
    fn partial_request_moves_net_by_exactly_the_amount() {
        let mut ledger = Ledger::new();
        let lent = add(&mut ledger, TxKind::Lent, "John", 1000, 1);
        add(&mut ledger, TxKind::Borrowed, "John", 300, 2);

        let settled = handle(&mut ledger, "John", m(200), Some("gpay".into()), Utc::now()).unwrap();

        assert_eq!(settled, m(200));
        assert_eq!(ledger.net_balance("John"), m(500));
        // borrowed side fully offset, 300 + 200 taken off the lent record
        let open = ledger.unsettled_for("John");
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, lent);
        assert_eq!(open[0].amount, m(500));

        let mut amounts = settled_amounts(&ledger);
        amounts.sort();
        assert_eq!(amounts, vec![m(300), m(500)]);
        assert!(
            ledger
                .all_settled()
                .iter()
                .all(|tx| tx.settlement_note.as_deref() == Some("gpay"))
        );
    }

    #[test]
    fn negative_net_pays_borrowed_side() {
        let mut ledger = Ledger::new();
        add(&mut ledger, TxKind::Borrowed, "Meera", 100, 1);
        add(&mut ledger, TxKind::Borrowed, "Meera", 100, 2);
        add(&mut ledger, TxKind::Lent, "Meera", 50, 3);

        let settled = handle(&mut ledger, "Meera", m(100), None, Utc::now()).unwrap();

        assert_eq!(settled, m(100));
        assert_eq!(ledger.net_balance("Meera"), m(-50));
        let open: Vec<&DebtTransaction> = ledger.unsettled_for("Meera");
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].kind, TxKind::Borrowed);
        assert_eq!(open[0].amount, m(50));
    }

    #[test]
    fn opposite_side_larger_than_net_is_split() {
        let mut ledger = Ledger::new();
        add(&mut ledger, TxKind::Lent, "Kai", 1000, 1);
        add(&mut ledger, TxKind::Borrowed, "Kai", 900, 2);

        let settled = handle(&mut ledger, "Kai", m(100), None, Utc::now()).unwrap();

        assert_eq!(settled, m(100));
        assert_eq!(ledger.net_balance("Kai"), Money::zero());
        let totals = ledger.totals_for("Kai");
        assert_eq!(totals.lent, m(800));
        assert_eq!(totals.borrowed, m(800));
    }

    #[test]
    fn even_balance_settles_all_records() {
        let mut ledger = Ledger::new();
        add(&mut ledger, TxKind::Lent, "Ravi", 100, 1);
        add(&mut ledger, TxKind::Borrowed, "Ravi", 100, 2);
        add(&mut ledger, TxKind::Lent, "Other", 5, 3);

        let settled = handle(&mut ledger, "Ravi", Money::zero(), Some("square".into()), Utc::now())
            .unwrap();

        assert_eq!(settled, m(100));
        assert!(ledger.unsettled_for("Ravi").is_empty());
        assert_eq!(ledger.all_settled().len(), 2);
        assert_eq!(ledger.unsettled_for("Other").len(), 1);
    }

    #[test]
    fn unknown_person_is_a_no_op() {
        let mut ledger = Ledger::new();
        add(&mut ledger, TxKind::Lent, "John", 10, 1);
        let before = ledger.transactions();

        let settled = handle(&mut ledger, "Nobody", m(10), None, Utc::now()).unwrap();

        assert_eq!(settled, Money::zero());
        assert_eq!(ledger.transactions(), before);
    }

    #[test]
    fn negative_request_is_rejected() {
        let mut ledger = Ledger::new();
        add(&mut ledger, TxKind::Lent, "John", 10, 1);
        let err = handle(&mut ledger, "John", m(-1), None, Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn storage_order_is_default() {
        let mut ledger = Ledger::new();
        let newer = add(&mut ledger, TxKind::Lent, "John", 100, 20);
        let older = add(&mut ledger, TxKind::Lent, "John", 100, 1);

        handle(&mut ledger, "John", m(100), None, Utc::now()).unwrap();

        assert!(ledger.find(&newer).unwrap().is_settled());
        assert!(!ledger.find(&older).unwrap().is_settled());
    }

    #[test]
    fn oldest_first_policy_settles_earliest_debt() {
        let mut ledger = Ledger::with_policy(SettlementPolicy {
            allocation_order: AllocationOrder::OldestFirst,
        });
        let newer = add(&mut ledger, TxKind::Lent, "John", 100, 20);
        let older = add(&mut ledger, TxKind::Lent, "John", 100, 1);

        handle(&mut ledger, "John", m(100), None, Utc::now()).unwrap();

        assert!(!ledger.find(&newer).unwrap().is_settled());
        assert!(ledger.find(&older).unwrap().is_settled());
    }

    #[test]
    fn only_the_split_record_gets_a_new_id() {
        let mut ledger = Ledger::new();
        let first = add(&mut ledger, TxKind::Lent, "John", 100, 1);
        let second = add(&mut ledger, TxKind::Lent, "John", 100, 2);

        handle(&mut ledger, "John", m(150), None, Utc::now()).unwrap();

        assert_eq!(ledger.store().len(), 3);
        assert!(ledger.find(&first).unwrap().is_settled());
        assert_eq!(ledger.find(&second).unwrap().amount, m(50));
        let split = ledger
            .all_settled()
            .into_iter()
            .find(|tx| tx.id != first)
            .unwrap();
        assert_ne!(split.id, second);
        assert_eq!(split.amount, m(50));
    }
}
