//! Expense history: filtering and viewer scoping.

use std::collections::HashSet;

use chrono::{Days, NaiveDate, NaiveTime};
use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Expense, LedgerResult, expenses, settlements};

use super::{Ledger, require_member, settlements_of};

/// Paid-status filter over an expense's settlement set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaidStatus {
    #[default]
    Any,
    /// Every settlement of the expense is paid.
    Settled,
    /// At least one settlement is still unpaid.
    Outstanding,
}

/// Conjunctive expense filters. `date_to` is inclusive: the query bounds by
/// the following midnight so the whole end day is covered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// Case-insensitive substring match on the description.
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub payer_id: Option<Uuid>,
    pub paid_status: PaidStatus,
}

impl Ledger {
    /// List expenses visible to `viewer_id`, newest first.
    ///
    /// Admin viewers see every expense; regular viewers only those where
    /// they are the payer or hold a settlement. The paid-status filter is
    /// applied last because it needs each candidate's settlements.
    pub async fn history(
        &self,
        filter: &HistoryFilter,
        viewer_id: Uuid,
    ) -> LedgerResult<Vec<Expense>> {
        let viewer = require_member(self.db(), viewer_id).await?;

        let mut query = expenses::Entity::find();
        if let Some(from) = filter.date_from {
            query = query.filter(expenses::Column::Date.gte(from.and_time(NaiveTime::MIN).and_utc()));
        }
        if let Some(to) = filter.date_to {
            // Bound by the next midnight so the end date itself is included.
            if let Some(next) = to.checked_add_days(Days::new(1)) {
                query = query
                    .filter(expenses::Column::Date.lt(next.and_time(NaiveTime::MIN).and_utc()));
            }
        }
        if let Some(payer_id) = filter.payer_id {
            query = query.filter(expenses::Column::PayerId.eq(payer_id.to_string()));
        }

        let mut candidates: Vec<Expense> = query
            .order_by_desc(expenses::Column::Date)
            .all(self.db())
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect::<LedgerResult<_>>()?;

        if let Some(needle) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            candidates.retain(|e| e.description.to_lowercase().contains(&needle));
        }

        if !viewer.is_admin {
            let participating: HashSet<String> = settlements::Entity::find()
                .filter(settlements::Column::MemberId.eq(viewer.id.to_string()))
                .all(self.db())
                .await?
                .into_iter()
                .map(|model| model.expense_id)
                .collect();
            candidates.retain(|e| {
                e.payer_id == viewer.id || participating.contains(&e.id.to_string())
            });
        }

        match filter.paid_status {
            PaidStatus::Any => Ok(candidates),
            PaidStatus::Settled | PaidStatus::Outstanding => {
                let mut out = Vec::with_capacity(candidates.len());
                for expense in candidates {
                    let rows = settlements_of(self.db(), expense.id).await?;
                    let keep = match filter.paid_status {
                        PaidStatus::Settled => rows.iter().all(|s| s.is_paid),
                        _ => rows.iter().any(|s| !s.is_paid),
                    };
                    if keep {
                        out.push(expense);
                    }
                }
                Ok(out)
            }
        }
    }
}
