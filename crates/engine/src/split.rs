//! Settlement planning for new and edited expenses.
//!
//! Planning is pure: it validates everything up front and returns the full
//! settlement row set, so a failed plan never reaches the database. The ops
//! layer persists a plan together with its expense in one transaction.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{LedgerError, LedgerResult, Member};

/// Tolerance when comparing a settlement sum against an expense total.
///
/// Equal shares are `amount / n` with no remainder reconciliation, so the
/// persisted sum may drift from the total by less than one cent.
pub const AMOUNT_EPSILON: f64 = 0.01;

/// How an expense total is divided among its participants.
#[derive(Clone, Debug, PartialEq)]
pub enum Split {
    /// Even division among the participant set (payer included unless admin).
    Equal,
    /// Caller-supplied amount per participant. Negative amounts are clamped
    /// to zero; the clamped sum must match the total within
    /// [`AMOUNT_EPSILON`].
    Custom(HashMap<Uuid, f64>),
}

/// One planned settlement row.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedShare {
    pub member_id: Uuid,
    pub amount_due: f64,
    pub is_paid: bool,
}

/// Computes the settlement rows for an expense of `amount` paid by `payer`.
///
/// `participants` are the resolved members the caller selected (for custom
/// splits, the members named in the amount map). Admins are filtered out and
/// never receive a row; for equal splits a non-admin payer is added to the
/// set when missing. The payer's row, when present, is always created paid.
pub(crate) fn plan_settlements(
    amount: f64,
    payer: &Member,
    participants: &[Member],
    split: &Split,
) -> LedgerResult<Vec<PlannedShare>> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::Validation(
            "amount must be a positive number".to_string(),
        ));
    }

    // Admins never hold settlements; drop them while keeping selection order.
    let mut debtors: Vec<&Member> = Vec::with_capacity(participants.len() + 1);
    for member in participants {
        if member.is_admin {
            continue;
        }
        if debtors.iter().any(|m| m.id == member.id) {
            continue;
        }
        debtors.push(member);
    }

    if matches!(split, Split::Equal)
        && !payer.is_admin
        && !debtors.iter().any(|m| m.id == payer.id)
    {
        debtors.push(payer);
    }

    if debtors.is_empty() {
        return Err(LedgerError::Validation(
            "at least one non-admin participant is required".to_string(),
        ));
    }

    let shares = match split {
        Split::Equal => {
            let share = amount / debtors.len() as f64;
            debtors
                .iter()
                .map(|member| PlannedShare {
                    member_id: member.id,
                    amount_due: share,
                    is_paid: member.id == payer.id,
                })
                .collect()
        }
        Split::Custom(amounts) => {
            let shares: Vec<PlannedShare> = debtors
                .iter()
                .map(|member| PlannedShare {
                    member_id: member.id,
                    amount_due: amounts.get(&member.id).copied().unwrap_or(0.0).max(0.0),
                    is_paid: member.id == payer.id,
                })
                .collect();

            let supplied: f64 = shares.iter().map(|s| s.amount_due).sum();
            if (supplied - amount).abs() > AMOUNT_EPSILON {
                return Err(LedgerError::SplitMismatch {
                    supplied,
                    declared: amount,
                });
            }
            shares
        }
    };

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, is_admin: bool) -> Member {
        Member::new(name.to_string(), "hash".to_string(), is_admin, None)
    }

    #[test]
    fn equal_split_divides_evenly_and_marks_payer_paid() {
        let payer = member("alice", false);
        let bob = member("bob", false);
        let carol = member("carol", false);

        let shares = plan_settlements(
            100.0,
            &payer,
            &[payer.clone(), bob.clone(), carol.clone()],
            &Split::Equal,
        )
        .unwrap();

        assert_eq!(shares.len(), 3);
        let total: f64 = shares.iter().map(|s| s.amount_due).sum();
        assert!((total - 100.0).abs() <= AMOUNT_EPSILON);
        for share in &shares {
            assert!((share.amount_due - 100.0 / 3.0).abs() < 1e-9);
            assert_eq!(share.is_paid, share.member_id == payer.id);
        }
        assert_eq!(shares.iter().filter(|s| s.is_paid).count(), 1);
    }

    #[test]
    fn equal_split_adds_missing_payer() {
        let payer = member("alice", false);
        let bob = member("bob", false);

        let shares = plan_settlements(50.0, &payer, &[bob.clone()], &Split::Equal).unwrap();

        assert_eq!(shares.len(), 2);
        assert!(shares.iter().any(|s| s.member_id == payer.id && s.is_paid));
        assert!(shares.iter().any(|s| s.member_id == bob.id && !s.is_paid));
    }

    #[test]
    fn admin_payer_gets_no_row() {
        let payer = member("root", true);
        let bob = member("bob", false);

        let shares = plan_settlements(50.0, &payer, &[bob.clone()], &Split::Equal).unwrap();

        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].member_id, bob.id);
        assert!(!shares[0].is_paid);
    }

    #[test]
    fn admin_participants_are_filtered() {
        let payer = member("alice", false);
        let root = member("root", true);
        let bob = member("bob", false);

        let shares = plan_settlements(
            60.0,
            &payer,
            &[root, bob.clone(), payer.clone()],
            &Split::Equal,
        )
        .unwrap();

        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|s| s.member_id != payer.id || s.is_paid));
        assert!((shares[0].amount_due - 30.0).abs() < 1e-9);
    }

    #[test]
    fn empty_set_after_filtering_is_rejected() {
        let payer = member("root", true);
        let other_admin = member("root2", true);

        let err = plan_settlements(10.0, &payer, &[other_admin], &Split::Equal).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let payer = member("alice", false);
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err =
                plan_settlements(bad, &payer, &[payer.clone()], &Split::Equal).unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)));
        }
    }

    #[test]
    fn custom_split_mismatch_reports_both_sums() {
        let payer = member("alice", false);
        let bob = member("bob", false);
        let amounts = HashMap::from([(payer.id, 40.0), (bob.id, 50.0)]);

        let err = plan_settlements(
            100.0,
            &payer,
            &[payer.clone(), bob],
            &Split::Custom(amounts),
        )
        .unwrap_err();

        assert_eq!(
            err,
            LedgerError::SplitMismatch {
                supplied: 90.0,
                declared: 100.0
            }
        );
    }

    #[test]
    fn custom_split_clamps_negative_amounts() {
        let payer = member("alice", false);
        let bob = member("bob", false);
        let amounts = HashMap::from([(payer.id, 100.0), (bob.id, -20.0)]);

        let shares = plan_settlements(
            100.0,
            &payer,
            &[payer.clone(), bob.clone()],
            &Split::Custom(amounts),
        )
        .unwrap();

        let bob_share = shares.iter().find(|s| s.member_id == bob.id).unwrap();
        assert_eq!(bob_share.amount_due, 0.0);
    }

    #[test]
    fn custom_split_marks_payer_paid_whatever_their_amount() {
        let payer = member("alice", false);
        let bob = member("bob", false);
        let amounts = HashMap::from([(payer.id, 70.0), (bob.id, 30.0)]);

        let shares = plan_settlements(
            100.0,
            &payer,
            &[payer.clone(), bob.clone()],
            &Split::Custom(amounts),
        )
        .unwrap();

        let payer_share = shares.iter().find(|s| s.member_id == payer.id).unwrap();
        assert!(payer_share.is_paid);
        let bob_share = shares.iter().find(|s| s.member_id == bob.id).unwrap();
        assert!(!bob_share.is_paid);
    }

    #[test]
    fn custom_split_within_tolerance_passes() {
        let payer = member("alice", false);
        let bob = member("bob", false);
        let amounts = HashMap::from([(payer.id, 33.33), (bob.id, 66.66)]);

        let shares = plan_settlements(
            99.99,
            &payer,
            &[payer.clone(), bob],
            &Split::Custom(amounts),
        )
        .unwrap();
        assert_eq!(shares.len(), 2);
    }
}
