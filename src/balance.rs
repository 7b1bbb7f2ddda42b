use std::collections::HashMap;

use crate::schemas::{Expense, Participant, ParticipantId};
use crate::split::{debtors, even_share};

pub type Balance = HashMap<ParticipantId, f64>;

/// Net position of every participant: positive means the trip owes them.
///
/// Only `SplitEvenly` expenses count. The payer is credited the whole amount
/// while only the other participants are debited their share, so the
/// balances do not have to add up to zero. A payer that is no longer a
/// participant still gets an entry, but only through an expense that counts:
/// their `SelfOnly` or `NamedBeneficiary` expenses, or any expense on a trip
/// with no participants, leave no entry for them.
pub fn compute_balances(participants: &[Participant], expenses: &[Expense]) -> Balance {
    let mut balance: Balance = participants
        .iter()
        .map(|participant| (participant.id.clone(), 0.0))
        .collect();

    for expense in expenses {
        let Some(share) = even_share(expense, participants) else {
            continue;
        };
        *balance.entry(expense.payer_id.clone()).or_insert(0.0) += expense.amount;
        for debtor in debtors(expense, participants) {
            *balance.entry(debtor.id.clone()).or_insert(0.0) -= share;
        }
    }
    balance
}
