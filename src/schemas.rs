use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ExpenseError, TripError};

pub type ParticipantId = String;

const SELF_ONLY_LABEL: &str = "Только себя";
const SPLIT_EVENLY_LABEL: &str = "Поровну между всеми";
const NAMED_PREFIX: &str = "За: ";

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Trip {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Trip {
    /// An open-ended range (either date missing) is accepted.
    pub fn validate_dates(&self) -> Result<(), TripError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => {
                Err(TripError::EndsBeforeStart { start, end })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Participant {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), TripError> {
        if self.name.trim().is_empty() {
            return Err(TripError::EmptyParticipantName);
        }
        Ok(())
    }
}

/// Who economically benefits from an expense.
///
/// On the wire the rule travels as the label the mobile client shows, so
/// stored trips stay readable by it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum BeneficiaryRule {
    SelfOnly,
    /// Matched by display name, not id. Not used by any computation yet.
    NamedBeneficiary { name: String },
    SplitEvenly,
}

impl FromStr for BeneficiaryRule {
    type Err = ExpenseError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            SELF_ONLY_LABEL => Ok(BeneficiaryRule::SelfOnly),
            SPLIT_EVENLY_LABEL => Ok(BeneficiaryRule::SplitEvenly),
            _ => match label.strip_prefix(NAMED_PREFIX) {
                Some(name) => Ok(BeneficiaryRule::NamedBeneficiary {
                    name: name.to_string(),
                }),
                None => Err(ExpenseError::UnknownBeneficiary(label.to_string())),
            },
        }
    }
}

impl TryFrom<String> for BeneficiaryRule {
    type Error = ExpenseError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

impl From<BeneficiaryRule> for String {
    fn from(rule: BeneficiaryRule) -> Self {
        rule.to_string()
    }
}

impl fmt::Display for BeneficiaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeneficiaryRule::SelfOnly => f.write_str(SELF_ONLY_LABEL),
            BeneficiaryRule::SplitEvenly => f.write_str(SPLIT_EVENLY_LABEL),
            BeneficiaryRule::NamedBeneficiary { name } => write!(f, "{NAMED_PREFIX}{name}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    pub payer_id: ParticipantId,
    pub beneficiary: BeneficiaryRule,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl Expense {
    pub fn new(
        id: impl Into<String>,
        amount: f64,
        payer_id: impl Into<ParticipantId>,
        beneficiary: BeneficiaryRule,
    ) -> Self {
        Expense {
            id: id.into(),
            title: String::new(),
            amount,
            category: String::new(),
            payer_id: payer_id.into(),
            beneficiary,
            date: None,
        }
    }

    /// Checks what the input layer must reject before an expense is stored.
    /// The payer is not checked against the trip's participants.
    pub fn validate(&self) -> Result<(), ExpenseError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ExpenseError::InvalidAmount(self.amount));
        }
        if self.title.trim().is_empty() {
            return Err(ExpenseError::EmptyTitle);
        }
        if let BeneficiaryRule::NamedBeneficiary { name } = &self.beneficiary {
            if name.trim().is_empty() {
                return Err(ExpenseError::EmptyBeneficiaryName);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_into_rules() {
        assert_eq!(
            "Только себя".parse::<BeneficiaryRule>().unwrap(),
            BeneficiaryRule::SelfOnly
        );
        assert_eq!(
            "Поровну между всеми".parse::<BeneficiaryRule>().unwrap(),
            BeneficiaryRule::SplitEvenly
        );
        assert_eq!(
            "За: Маша".parse::<BeneficiaryRule>().unwrap(),
            BeneficiaryRule::NamedBeneficiary {
                name: "Маша".to_string()
            }
        );
    }

    #[test]
    fn rules_print_back_as_labels() {
        for label in ["Только себя", "Поровну между всеми", "За: Petya"] {
            let rule: BeneficiaryRule = label.parse().unwrap();
            assert_eq!(rule.to_string(), label);
        }
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "everyone".parse::<BeneficiaryRule>().unwrap_err();
        assert!(matches!(err, ExpenseError::UnknownBeneficiary(label) if label == "everyone"));
    }

    #[test]
    fn expense_json_uses_labels() {
        let json = r#"{
            "id": "e1",
            "title": "Dinner",
            "amount": 42.5,
            "payer_id": "a",
            "beneficiary": "Поровну между всеми"
        }"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.beneficiary, BeneficiaryRule::SplitEvenly);
        assert_eq!(expense.category, "");

        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(value["beneficiary"], "Поровну между всеми");
    }

    #[test]
    fn validation_rejects_bad_amounts() {
        let mut expense = Expense::new("e1", 0.0, "a", BeneficiaryRule::SplitEvenly);
        expense.title = "Taxi".to_string();
        assert!(matches!(
            expense.validate(),
            Err(ExpenseError::InvalidAmount(_))
        ));

        expense.amount = -3.0;
        assert!(expense.validate().is_err());

        expense.amount = f64::NAN;
        assert!(expense.validate().is_err());

        expense.amount = 12.0;
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn validation_rejects_blank_title_and_beneficiary() {
        let expense = Expense::new("e1", 10.0, "a", BeneficiaryRule::SelfOnly);
        assert!(matches!(expense.validate(), Err(ExpenseError::EmptyTitle)));

        let mut expense = Expense::new(
            "e2",
            10.0,
            "a",
            BeneficiaryRule::NamedBeneficiary {
                name: "  ".to_string(),
            },
        );
        expense.title = "Museum".to_string();
        assert!(matches!(
            expense.validate(),
            Err(ExpenseError::EmptyBeneficiaryName)
        ));
    }

    #[test]
    fn participants_need_a_name() {
        assert!(matches!(
            Participant::new("p1", " ").validate(),
            Err(TripError::EmptyParticipantName)
        ));
        assert!(Participant::new("p1", "Anna").validate().is_ok());
    }

    #[test]
    fn trips_cannot_end_before_they_start() {
        let date = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        let mut trip = Trip {
            id: "t1".to_string(),
            name: "Porto".to_string(),
            start_date: Some(date(10)),
            end_date: Some(date(3)),
            participants: vec![],
            expenses: vec![],
        };
        assert!(matches!(
            trip.validate_dates(),
            Err(TripError::EndsBeforeStart { .. })
        ));

        trip.end_date = Some(date(10));
        assert!(trip.validate_dates().is_ok());

        trip.start_date = None;
        trip.end_date = Some(date(3));
        assert!(trip.validate_dates().is_ok());
    }

    #[test]
    fn validation_ignores_unknown_payer() {
        let mut expense = Expense::new("e1", 10.0, "ghost", BeneficiaryRule::SplitEvenly);
        expense.title = "Fuel".to_string();
        assert!(expense.validate().is_ok());
    }
}
