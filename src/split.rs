use crate::schemas::{BeneficiaryRule, Expense, Participant};

/// The equal share each participant carries for an expense split among the
/// whole trip.
///
/// Returns `None` for expenses that do not take part in settlement: any rule
/// other than `SplitEvenly`, an empty participant list, or an amount that is
/// not a positive finite number.
pub fn even_share(expense: &Expense, participants: &[Participant]) -> Option<f64> {
    if expense.beneficiary != BeneficiaryRule::SplitEvenly {
        return None;
    }
    if participants.is_empty() || !expense.amount.is_finite() || expense.amount <= 0.0 {
        return None;
    }
    Some(expense.amount / participants.len() as f64)
}

/// Participants that owe the payer a share, in participant-list order.
pub fn debtors<'a>(
    expense: &'a Expense,
    participants: &'a [Participant],
) -> impl Iterator<Item = &'a Participant> + 'a {
    participants
        .iter()
        .filter(move |participant| participant.id != expense.payer_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trio() -> Vec<Participant> {
        vec![
            Participant::new("a", "Anna"),
            Participant::new("b", "Boris"),
            Participant::new("c", "Clara"),
        ]
    }

    #[test]
    fn share_divides_by_every_participant() {
        let expense = Expense::new("e1", 90.0, "a", BeneficiaryRule::SplitEvenly);
        assert_eq!(even_share(&expense, &trio()), Some(30.0));
    }

    #[test]
    fn other_rules_have_no_share() {
        let participants = trio();
        let own = Expense::new("e1", 90.0, "a", BeneficiaryRule::SelfOnly);
        let named = Expense::new(
            "e2",
            90.0,
            "a",
            BeneficiaryRule::NamedBeneficiary {
                name: "Boris".to_string(),
            },
        );
        assert_eq!(even_share(&own, &participants), None);
        assert_eq!(even_share(&named, &participants), None);
    }

    #[test]
    fn empty_trip_and_bad_amounts_have_no_share() {
        let expense = Expense::new("e1", 90.0, "a", BeneficiaryRule::SplitEvenly);
        assert_eq!(even_share(&expense, &[]), None);

        for amount in [0.0, -10.0, f64::INFINITY, f64::NAN] {
            let expense = Expense::new("e1", amount, "a", BeneficiaryRule::SplitEvenly);
            assert_eq!(even_share(&expense, &trio()), None);
        }
    }

    #[test]
    fn payer_is_not_a_debtor() {
        let participants = trio();
        let expense = Expense::new("e1", 90.0, "b", BeneficiaryRule::SplitEvenly);
        let ids: Vec<_> = debtors(&expense, &participants)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "c"]);
    }
}
