//! Expense and settlement write operations.
//!
//! Expense persistence and settlement persistence succeed or fail together:
//! the settlement plan is validated before the transaction opens, so a
//! rejected split never leaves an orphan expense row behind.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Expense, LedgerError, LedgerResult, Settlement, Split, expenses, settlements,
    split::plan_settlements,
};

use super::{Ledger, require_expense, require_member, require_settlement, resolve_members};

impl Ledger {
    /// Record a group purchase and its settlement rows in one transaction.
    ///
    /// `participant_ids` is the caller-selected split set for equal splits;
    /// for custom splits the amount map names the participants instead.
    pub async fn create_expense(
        &self,
        description: &str,
        amount: f64,
        payer_id: Uuid,
        participant_ids: &[Uuid],
        split: &Split,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<Expense> {
        let db_tx = self.db().begin().await?;

        let payer = require_member(&db_tx, payer_id).await?;
        let participants = resolve_members(&db_tx, &split_participants(participant_ids, split))
            .await?;
        let plan = plan_settlements(amount, &payer, &participants, split)?;
        let expense = Expense::new(description.to_string(), amount, payer.id, occurred_at)?;

        expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
        for share in &plan {
            let settlement =
                Settlement::new(expense.id, share.member_id, share.amount_due, share.is_paid);
            settlements::ActiveModel::from(&settlement)
                .insert(&db_tx)
                .await?;
        }

        db_tx.commit().await?;
        tracing::debug!(expense = %expense.id, rows = plan.len(), "expense recorded");
        Ok(expense)
    }

    /// Replace an expense's description, amount and settlement set.
    ///
    /// Only the payer or an admin may edit. The replace is destructive: every
    /// prior settlement is deleted and a fresh set is created from the new
    /// selection, so paid flags of continuing participants are reset and only
    /// the payer's new row is paid.
    pub async fn edit_expense(
        &self,
        expense_id: Uuid,
        acting_member_id: Uuid,
        description: &str,
        amount: f64,
        participant_ids: &[Uuid],
        split: &Split,
    ) -> LedgerResult<Expense> {
        let db_tx = self.db().begin().await?;

        let expense = require_expense(&db_tx, expense_id).await?;
        let acting = require_member(&db_tx, acting_member_id).await?;
        if expense.payer_id != acting.id && !acting.is_admin {
            return Err(LedgerError::Unauthorized(
                "only the payer or an admin may edit an expense".to_string(),
            ));
        }

        // The split is planned against the original payer, not the editor.
        let payer = require_member(&db_tx, expense.payer_id).await?;
        let participants = resolve_members(&db_tx, &split_participants(participant_ids, split))
            .await?;
        let plan = plan_settlements(amount, &payer, &participants, split)?;

        if description.trim().is_empty() {
            return Err(LedgerError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        let updated = Expense {
            description: description.to_string(),
            amount,
            ..expense
        };

        let expense_model = expenses::ActiveModel {
            id: ActiveValue::Set(updated.id.to_string()),
            description: ActiveValue::Set(updated.description.clone()),
            amount: ActiveValue::Set(updated.amount),
            ..Default::default()
        };
        expense_model.update(&db_tx).await?;

        settlements::Entity::delete_many()
            .filter(settlements::Column::ExpenseId.eq(updated.id.to_string()))
            .exec(&db_tx)
            .await?;
        for share in &plan {
            let settlement =
                Settlement::new(updated.id, share.member_id, share.amount_due, share.is_paid);
            settlements::ActiveModel::from(&settlement)
                .insert(&db_tx)
                .await?;
        }

        db_tx.commit().await?;
        Ok(updated)
    }

    /// Delete an expense and all of its settlements. Payer or admin only.
    pub async fn delete_expense(
        &self,
        expense_id: Uuid,
        acting_member_id: Uuid,
    ) -> LedgerResult<()> {
        let db_tx = self.db().begin().await?;

        let expense = require_expense(&db_tx, expense_id).await?;
        let acting = require_member(&db_tx, acting_member_id).await?;
        if expense.payer_id != acting.id && !acting.is_admin {
            return Err(LedgerError::Unauthorized(
                "only the payer or an admin may delete an expense".to_string(),
            ));
        }

        settlements::Entity::delete_many()
            .filter(settlements::Column::ExpenseId.eq(expense_id.to_string()))
            .exec(&db_tx)
            .await?;
        expenses::Entity::delete_by_id(expense_id.to_string())
            .exec(&db_tx)
            .await?;

        db_tx.commit().await?;
        Ok(())
    }

    /// Mark a settlement as paid. Only the debtor may settle their own row.
    pub async fn mark_settlement_paid(
        &self,
        settlement_id: Uuid,
        acting_member_id: Uuid,
    ) -> LedgerResult<Settlement> {
        let db_tx = self.db().begin().await?;

        let settlement = require_settlement(&db_tx, settlement_id).await?;
        if settlement.member_id != acting_member_id {
            return Err(LedgerError::Unauthorized(
                "only the debtor may settle this row".to_string(),
            ));
        }

        let model = settlements::ActiveModel {
            id: ActiveValue::Set(settlement.id.to_string()),
            is_paid: ActiveValue::Set(true),
            ..Default::default()
        };
        model.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(Settlement {
            is_paid: true,
            ..settlement
        })
    }

    /// Return an expense by id.
    pub async fn expense(&self, expense_id: Uuid) -> LedgerResult<Expense> {
        require_expense(self.db(), expense_id).await
    }

    /// Return all settlements of one expense.
    pub async fn settlements_for(&self, expense_id: Uuid) -> LedgerResult<Vec<Settlement>> {
        require_expense(self.db(), expense_id).await?;
        super::settlements_of(self.db(), expense_id).await
    }
}

/// The ids whose members must be resolved for a split: the caller selection
/// for equal mode, the amount-map keys for custom mode.
fn split_participants(participant_ids: &[Uuid], split: &Split) -> Vec<Uuid> {
    match split {
        Split::Equal => participant_ids.to_vec(),
        Split::Custom(amounts) => amounts.keys().copied().collect(),
    }
}
