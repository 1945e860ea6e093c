use chrono::Utc;

use crate::{
    common::{error::LedgerError, event::LedgerCommand, money::Money},
    domain::{ledger::Ledger, transaction::TxId},
    worker::handlers::{
        add::{self, NewTransaction},
        delete,
        settle::{self, SettleOutcome},
        settle_person,
    },
};

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Added(TxId),
    Settled { id: TxId, outcome: SettleOutcome },
    SettledForPerson { person: String, amount: Money },
    Deleted(TxId),
}

impl Applied {
    /// Whether the ledger changed and therefore needs saving.
    pub fn mutated(&self) -> bool {
        match self {
            Applied::SettledForPerson { amount, .. } => !amount.is_zero(),
            _ => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct Processor {}
impl Processor {
    pub fn new() -> Self {
        Self {}
    }

    pub fn process(
        &mut self,
        ledger: &mut Ledger,
        command: LedgerCommand,
    ) -> Result<Applied, LedgerError> {
        let now = Utc::now();
        match command {
            LedgerCommand::Add {
                kind,
                person,
                amount,
                description,
                date,
                due_date,
            } => {
                let new = NewTransaction {
                    kind,
                    person,
                    amount,
                    description,
                    transaction_date: date,
                    due_date,
                };
                let tx = add::handle(ledger, new, now)?;
                Ok(Applied::Added(tx.id))
            }
            LedgerCommand::Settle { id, amount, note } => {
                let outcome = settle::handle(ledger, &id, amount, note, now)?;
                Ok(Applied::Settled { id, outcome })
            }
            LedgerCommand::SettlePerson {
                person,
                amount,
                note,
            } => {
                let amount = settle_person::handle(ledger, &person, amount, note, now)?;
                Ok(Applied::SettledForPerson { person, amount })
            }
            LedgerCommand::Delete { id } => {
                delete::handle(ledger, &id)?;
                Ok(Applied::Deleted(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::transaction::TxKind;

    fn add_cmd(kind: TxKind, person: &str, amount: i64) -> LedgerCommand {
        LedgerCommand::Add {
            kind,
            person: person.to_string(),
            amount: Money::from_major(amount),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            due_date: None,
        }
    }

    #[test]
    fn dispatches_each_command() {
        let mut ledger = Ledger::new();
        let mut processor = Processor::new();

        let Applied::Added(id) = processor
            .process(&mut ledger, add_cmd(TxKind::Lent, "John", 100))
            .unwrap()
        else {
            panic!("expected add");
        };

        let applied = processor
            .process(
                &mut ledger,
                LedgerCommand::Settle {
                    id: id.clone(),
                    amount: Money::from_major(40),
                    note: None,
                },
            )
            .unwrap();
        assert!(matches!(
            applied,
            Applied::Settled {
                outcome: SettleOutcome::Split { .. },
                ..
            }
        ));

        let applied = processor
            .process(
                &mut ledger,
                LedgerCommand::SettlePerson {
                    person: "John".to_string(),
                    amount: Money::zero(),
                    note: None,
                },
            )
            .unwrap();
        assert_eq!(
            applied,
            Applied::SettledForPerson {
                person: "John".to_string(),
                amount: Money::from_major(60)
            }
        );

        let applied = processor
            .process(&mut ledger, LedgerCommand::Delete { id: id.clone() })
            .unwrap();
        assert_eq!(applied, Applied::Deleted(id));
    }

    #[test]
    fn no_op_person_settlement_is_not_a_mutation() {
        let mut ledger = Ledger::new();
        let applied = Processor::new()
            .process(
                &mut ledger,
                LedgerCommand::SettlePerson {
                    person: "Ghost".to_string(),
                    amount: Money::zero(),
                    note: None,
                },
            )
            .unwrap();
        assert!(!applied.mutated());
    }

    #[test]
    fn errors_pass_through() {
        let mut ledger = Ledger::new();
        let err = Processor::new()
            .process(
                &mut ledger,
                LedgerCommand::Delete {
                    id: TxId::new("nope"),
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}
