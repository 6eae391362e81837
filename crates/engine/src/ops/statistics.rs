//! Per-member spending statistics.
//!
//! All figures are computed over the full ledger history; only the monthly
//! trend is windowed (the six calendar months ending at the current month).

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Expense, LedgerResult, Settlement, expenses, settlements};

use super::{Ledger, balances::unpaid_owed, require_member};

/// Spending bucketed into one calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberStatistics {
    /// Out-of-pocket group payments plus the member's own share of expenses
    /// others fronted, paid or not.
    pub total_spent: f64,
    /// Unpaid shares the member still owes on other people's expenses.
    pub total_owed: f64,
    /// Unpaid shares others owe on the member's expenses.
    pub total_owed_to_me: f64,
    pub net_balance: f64,
    /// Up to five highest-amount expenses the member paid for or owes on,
    /// ties kept in encounter order.
    pub top_expenses: Vec<Expense>,
    /// Six calendar months ending at the current month, oldest first; idle
    /// months report zero.
    pub monthly_trend: Vec<MonthlyTotal>,
    /// Paid/unpaid counts over the member's own settlements.
    pub paid_count: usize,
    pub unpaid_count: usize,
}

impl Ledger {
    pub async fn statistics(&self, member_id: Uuid) -> LedgerResult<MemberStatistics> {
        let member = require_member(self.db(), member_id).await?;

        let paid_expenses: Vec<Expense> = expenses::Entity::find()
            .filter(expenses::Column::PayerId.eq(member.id.to_string()))
            .order_by_asc(expenses::Column::Date)
            .all(self.db())
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect::<LedgerResult<_>>()?;

        let own_settlements: Vec<Settlement> = settlements::Entity::find()
            .filter(settlements::Column::MemberId.eq(member.id.to_string()))
            .all(self.db())
            .await?
            .into_iter()
            .map(Settlement::try_from)
            .collect::<LedgerResult<_>>()?;

        // Expenses behind the member's settlements, for payer and date info.
        let settlement_expense_ids: Vec<String> = own_settlements
            .iter()
            .map(|s| s.expense_id.to_string())
            .collect();
        let mut settled_expenses: HashMap<Uuid, Expense> = HashMap::new();
        if !settlement_expense_ids.is_empty() {
            for model in expenses::Entity::find()
                .filter(expenses::Column::Id.is_in(settlement_expense_ids))
                .all(self.db())
                .await?
            {
                let expense = Expense::try_from(model)?;
                settled_expenses.insert(expense.id, expense);
            }
        }

        let shares_on_others: Vec<&Settlement> = own_settlements
            .iter()
            .filter(|s| {
                settled_expenses
                    .get(&s.expense_id)
                    .is_some_and(|e| e.payer_id != member.id)
            })
            .collect();

        let total_spent_as_payer: f64 = paid_expenses.iter().map(|e| e.amount).sum();
        let own_share_of_others: f64 = shares_on_others.iter().map(|s| s.amount_due).sum();
        let total_owed: f64 = shares_on_others
            .iter()
            .filter(|s| !s.is_paid)
            .map(|s| s.amount_due)
            .sum();
        let total_owed_to_me: f64 = unpaid_owed(self.db(), member.id)
            .await?
            .iter()
            .map(|s| s.amount_due)
            .sum();

        let top_expenses = top_expenses(&paid_expenses, &shares_on_others, &settled_expenses);
        let monthly_trend =
            monthly_trend(Utc::now(), &paid_expenses, &shares_on_others, &settled_expenses);

        let paid_count = own_settlements.iter().filter(|s| s.is_paid).count();
        let unpaid_count = own_settlements.len() - paid_count;

        Ok(MemberStatistics {
            total_spent: total_spent_as_payer + own_share_of_others,
            total_owed,
            total_owed_to_me,
            net_balance: total_owed_to_me - total_owed,
            top_expenses,
            monthly_trend,
            paid_count,
            unpaid_count,
        })
    }
}

/// Five highest-amount expenses where the member is payer or participant.
/// Stable sort keeps ties in encounter order (payer expenses first, both
/// groups date-ascending).
fn top_expenses(
    paid_expenses: &[Expense],
    shares_on_others: &[&Settlement],
    settled_expenses: &HashMap<Uuid, Expense>,
) -> Vec<Expense> {
    let mut candidates: Vec<Expense> = paid_expenses.to_vec();
    let mut involved: Vec<&Expense> = shares_on_others
        .iter()
        .filter_map(|s| settled_expenses.get(&s.expense_id))
        .collect();
    involved.sort_by_key(|e| e.date);
    for expense in involved {
        if !candidates.iter().any(|e| e.id == expense.id) {
            candidates.push(expense.clone());
        }
    }

    candidates.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    candidates.truncate(5);
    candidates
}

/// Sum per calendar month, over the six months ending at `now`'s month:
/// expenses the member paid plus their shares of other people's expenses,
/// bucketed by the expense timestamp's month.
fn monthly_trend(
    now: DateTime<Utc>,
    paid_expenses: &[Expense],
    shares_on_others: &[&Settlement],
    settled_expenses: &HashMap<Uuid, Expense>,
) -> Vec<MonthlyTotal> {
    let months = trailing_months(now.year(), now.month(), 6);

    let mut buckets: HashMap<(i32, u32), f64> = HashMap::new();
    for expense in paid_expenses {
        *buckets
            .entry((expense.date.year(), expense.date.month()))
            .or_insert(0.0) += expense.amount;
    }
    for share in shares_on_others {
        if let Some(expense) = settled_expenses.get(&share.expense_id) {
            *buckets
                .entry((expense.date.year(), expense.date.month()))
                .or_insert(0.0) += share.amount_due;
        }
    }

    months
        .into_iter()
        .map(|(year, month)| MonthlyTotal {
            year,
            month,
            total: buckets.get(&(year, month)).copied().unwrap_or(0.0),
        })
        .collect()
}

/// The `count` calendar months ending at (`year`, `month`), oldest first.
fn trailing_months(year: i32, month: u32, count: u32) -> Vec<(i32, u32)> {
    let mut months = Vec::with_capacity(count as usize);
    let mut y = year;
    let mut m = month;
    for _ in 0..count {
        months.push((y, m));
        if m == 1 {
            y -= 1;
            m = 12;
        } else {
            m -= 1;
        }
    }
    months.reverse();
    months
}
