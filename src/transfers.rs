use serde::{Deserialize, Serialize};

use crate::schemas::{Expense, Participant, ParticipantId};
use crate::split::{debtors, even_share};

/// A suggested payment from a debtor to the participant who paid.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: f64,
}

/// Who should pay whom, one transfer per debtor per even-split expense.
///
/// Transfers come out expense by expense in input order and, within an
/// expense, in participant-list order. Repeated pairs are not merged; see
/// [`crate::settle::consolidate_transfers`] for a netted view.
pub fn compute_transfers(participants: &[Participant], expenses: &[Expense]) -> Vec<Transfer> {
    let mut transfers = Vec::new();
    for expense in expenses {
        let Some(share) = even_share(expense, participants) else {
            continue;
        };
        transfers.extend(debtors(expense, participants).map(|debtor| Transfer {
            from: debtor.id.clone(),
            to: expense.payer_id.clone(),
            amount: share,
        }));
    }
    transfers
}
