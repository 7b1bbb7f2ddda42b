use std::collections::HashMap;

use crate::schemas::ParticipantId;
use crate::transfers::Transfer;

const NET_EPSILON: f64 = 1e-9;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
struct ParticipantPair {
    first: ParticipantId,
    second: ParticipantId,
}

/// Nets transfers between the same two participants into at most one.
///
/// The direction of each result follows the sign of the net amount and pairs
/// that cancel out are dropped. Pairs keep the position of their first
/// transfer in `transfers`.
pub fn consolidate_transfers(transfers: &[Transfer]) -> Vec<Transfer> {
    let mut order: Vec<ParticipantPair> = Vec::new();
    let mut net_between_pairs: HashMap<ParticipantPair, f64> = HashMap::new();

    for transfer in transfers {
        // Alphabetical order keeps both directions of a pair under one key;
        // the amount is positive when `first` pays `second`.
        let (pair, amount) = if transfer.from <= transfer.to {
            (
                ParticipantPair {
                    first: transfer.from.clone(),
                    second: transfer.to.clone(),
                },
                transfer.amount,
            )
        } else {
            (
                ParticipantPair {
                    first: transfer.to.clone(),
                    second: transfer.from.clone(),
                },
                -transfer.amount,
            )
        };

        if !net_between_pairs.contains_key(&pair) {
            order.push(pair.clone());
        }
        *net_between_pairs.entry(pair).or_insert(0.0) += amount;
    }

    order
        .into_iter()
        .filter_map(|pair| {
            let net = net_between_pairs.get(&pair).copied().unwrap_or(0.0);
            if net.abs() <= NET_EPSILON {
                return None;
            }
            let (from, to) = if net > 0.0 {
                (pair.first, pair.second)
            } else {
                (pair.second, pair.first)
            };
            Some(Transfer {
                from,
                to,
                amount: net.abs(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(from: &str, to: &str, amount: f64) -> Transfer {
        Transfer {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        }
    }

    #[test]
    fn nothing_to_consolidate() {
        assert!(consolidate_transfers(&[]).is_empty());
    }

    #[test]
    fn opposite_directions_are_netted() {
        let transfers = [transfer("b", "a", 50.0), transfer("a", "b", 25.0)];
        assert_eq!(consolidate_transfers(&transfers), [transfer("b", "a", 25.0)]);
    }

    #[test]
    fn same_direction_is_summed() {
        let transfers = [
            transfer("c", "a", 10.0),
            transfer("b", "a", 5.0),
            transfer("c", "a", 15.0),
        ];
        assert_eq!(
            consolidate_transfers(&transfers),
            [transfer("c", "a", 25.0), transfer("b", "a", 5.0)]
        );
    }

    #[test]
    fn cancelled_pairs_disappear() {
        let transfers = [
            transfer("a", "b", 30.0),
            transfer("c", "a", 1.0),
            transfer("b", "a", 30.0),
        ];
        assert_eq!(consolidate_transfers(&transfers), [transfer("c", "a", 1.0)]);
    }
}
