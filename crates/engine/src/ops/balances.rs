//! Per-member debt/credit figures and the admin roster.

use sea_orm::{ConnectionTrait, JoinType, QueryFilter, QuerySelect, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerResult, Member, Settlement, expenses, settlements};

use super::{Ledger, require_member};

/// What one member owes and is owed, with the underlying unpaid rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Unpaid settlements where the member is the debtor.
    pub my_debts: Vec<Settlement>,
    /// Unpaid settlements on expenses the member paid for, excluding their
    /// own row.
    pub owed_to_me: Vec<Settlement>,
    pub total_debt: f64,
    pub total_owed: f64,
}

/// One admin-roster line for a non-admin member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterLine {
    pub member: Member,
    pub owes: f64,
    pub owed: f64,
    pub balance: f64,
}

impl Ledger {
    /// Debt/credit dashboard for one member.
    pub async fn dashboard(&self, member_id: Uuid) -> LedgerResult<Dashboard> {
        require_member(self.db(), member_id).await?;

        let my_debts = unpaid_debts(self.db(), member_id).await?;
        let owed_to_me = unpaid_owed(self.db(), member_id).await?;
        let total_debt = my_debts.iter().map(|s| s.amount_due).sum();
        let total_owed = owed_to_me.iter().map(|s| s.amount_due).sum();

        Ok(Dashboard {
            my_debts,
            owed_to_me,
            total_debt,
            total_owed,
        })
    }

    /// Owes/owed/balance for every non-admin member.
    pub async fn admin_roster(&self) -> LedgerResult<Vec<RosterLine>> {
        let members = self.list_members(false).await?;

        let mut roster = Vec::with_capacity(members.len());
        for member in members {
            let owes: f64 = unpaid_debts(self.db(), member.id)
                .await?
                .iter()
                .map(|s| s.amount_due)
                .sum();
            let owed: f64 = unpaid_owed(self.db(), member.id)
                .await?
                .iter()
                .map(|s| s.amount_due)
                .sum();
            roster.push(RosterLine {
                member,
                owes,
                owed,
                balance: owed - owes,
            });
        }
        Ok(roster)
    }
}

/// Unpaid settlements where `member_id` is the debtor.
pub(crate) async fn unpaid_debts<C: ConnectionTrait>(
    db: &C,
    member_id: Uuid,
) -> LedgerResult<Vec<Settlement>> {
    settlements::Entity::find()
        .filter(settlements::Column::MemberId.eq(member_id.to_string()))
        .filter(settlements::Column::IsPaid.eq(false))
        .all(db)
        .await?
        .into_iter()
        .map(Settlement::try_from)
        .collect()
}

/// Unpaid settlements on expenses `member_id` paid for, minus their own row.
pub(crate) async fn unpaid_owed<C: ConnectionTrait>(
    db: &C,
    member_id: Uuid,
) -> LedgerResult<Vec<Settlement>> {
    settlements::Entity::find()
        .filter(settlements::Column::IsPaid.eq(false))
        .filter(settlements::Column::MemberId.ne(member_id.to_string()))
        .join(JoinType::InnerJoin, settlements::Relation::Expenses.def())
        .filter(expenses::Column::PayerId.eq(member_id.to_string()))
        .all(db)
        .await?
        .into_iter()
        .map(Settlement::try_from)
        .collect()
}
