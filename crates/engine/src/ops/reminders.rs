//! Reminder data for the external notifier.
//!
//! The engine only groups outstanding debts by debtor; scheduling, message
//! formatting and transport belong to the caller. Notification failures must
//! therefore never affect ledger state by construction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, LedgerResult, Member, expenses, members, reminder_scans, settlements};

use super::Ledger;

/// One outstanding debt, ready for a reminder message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub description: String,
    pub payer_name: String,
    pub amount: f64,
}

/// All outstanding debts of one debtor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReminderGroup {
    pub member: Member,
    pub entries: Vec<ReminderEntry>,
}

impl Ledger {
    /// Group every unpaid settlement by debtor.
    ///
    /// Debtors who are admins or have no contact address are skipped; they
    /// cannot or should not be reminded.
    pub async fn reminder_groups(&self) -> LedgerResult<HashMap<Uuid, ReminderGroup>> {
        let unpaid = settlements::Entity::find()
            .filter(settlements::Column::IsPaid.eq(false))
            .all(self.db())
            .await?;
        if unpaid.is_empty() {
            return Ok(HashMap::new());
        }

        let expense_ids: Vec<String> = unpaid.iter().map(|s| s.expense_id.clone()).collect();
        let mut expense_index: HashMap<String, (String, String)> = HashMap::new();
        for model in expenses::Entity::find()
            .filter(expenses::Column::Id.is_in(expense_ids))
            .all(self.db())
            .await?
        {
            expense_index.insert(model.id.clone(), (model.description, model.payer_id));
        }

        let mut member_index: HashMap<String, Member> = HashMap::new();
        for model in members::Entity::find().all(self.db()).await? {
            let member = Member::try_from(model)?;
            member_index.insert(member.id.to_string(), member);
        }

        let mut groups: HashMap<Uuid, ReminderGroup> = HashMap::new();
        for row in unpaid {
            let Some(debtor) = member_index.get(&row.member_id) else {
                continue;
            };
            if debtor.is_admin || debtor.email.is_none() {
                continue;
            }
            let Some((description, payer_id)) = expense_index.get(&row.expense_id) else {
                continue;
            };
            let payer_name = member_index
                .get(payer_id)
                .map(|m| m.username.clone())
                .ok_or_else(|| LedgerError::NotFound("member not exists".to_string()))?;

            groups
                .entry(debtor.id)
                .or_insert_with(|| ReminderGroup {
                    member: debtor.clone(),
                    entries: Vec::new(),
                })
                .entries
                .push(ReminderEntry {
                    description: description.clone(),
                    payer_name,
                    amount: row.amount_due,
                });
        }
        Ok(groups)
    }

    /// Record that a reminder scan completed, for scheduler bookkeeping.
    pub async fn record_reminder_scan(&self, completed_at: DateTime<Utc>) -> LedgerResult<()> {
        let scan = reminder_scans::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            completed_at: ActiveValue::Set(completed_at),
        };
        scan.insert(self.db()).await?;
        Ok(())
    }

    /// When the last reminder scan completed, if any.
    pub async fn last_reminder_scan(&self) -> LedgerResult<Option<DateTime<Utc>>> {
        Ok(reminder_scans::Entity::find()
            .order_by_desc(reminder_scans::Column::CompletedAt)
            .one(self.db())
            .await?
            .map(|model| model.completed_at))
    }
}
