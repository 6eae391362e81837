use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, prelude::*};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{Expense, LedgerError, LedgerResult, Member, Settlement};

mod balances;
mod expenses;
mod history;
mod members;
mod reminders;
mod statistics;

pub use balances::{Dashboard, RosterLine};
pub use history::{HistoryFilter, PaidStatus};
pub use reminders::{ReminderEntry, ReminderGroup};
pub use statistics::{MemberStatistics, MonthlyTotal};

/// Handle over the persisted ledger. All coordination happens through the
/// database transaction boundary, so the handle is cheap to clone and share
/// between the request path and the reminder scheduler.
#[derive(Clone, Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.database
    }
}

/// Fetch a member or fail with `NotFound`.
pub(crate) async fn require_member<C: ConnectionTrait>(
    db: &C,
    member_id: Uuid,
) -> LedgerResult<Member> {
    crate::members::Entity::find_by_id(member_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::NotFound("member not exists".to_string()))?
        .try_into()
}

/// Fetch an expense or fail with `NotFound`.
pub(crate) async fn require_expense<C: ConnectionTrait>(
    db: &C,
    expense_id: Uuid,
) -> LedgerResult<Expense> {
    crate::expenses::Entity::find_by_id(expense_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::NotFound("expense not exists".to_string()))?
        .try_into()
}

/// Fetch a settlement or fail with `NotFound`.
pub(crate) async fn require_settlement<C: ConnectionTrait>(
    db: &C,
    settlement_id: Uuid,
) -> LedgerResult<Settlement> {
    crate::settlements::Entity::find_by_id(settlement_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::NotFound("settlement not exists".to_string()))?
        .try_into()
}

/// Resolve a participant id list to members, failing on any unknown id.
pub(crate) async fn resolve_members<C: ConnectionTrait>(
    db: &C,
    member_ids: &[Uuid],
) -> LedgerResult<Vec<Member>> {
    let mut resolved = Vec::with_capacity(member_ids.len());
    for id in member_ids {
        resolved.push(require_member(db, *id).await?);
    }
    Ok(resolved)
}

/// Load all settlements of one expense.
pub(crate) async fn settlements_of<C: ConnectionTrait>(
    db: &C,
    expense_id: Uuid,
) -> LedgerResult<Vec<Settlement>> {
    crate::settlements::Entity::find()
        .filter(crate::settlements::Column::ExpenseId.eq(expense_id.to_string()))
        .all(db)
        .await?
        .into_iter()
        .map(Settlement::try_from)
        .collect()
}

pub(crate) fn normalize_username(value: &str) -> LedgerResult<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(LedgerError::Validation(
            "username must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}

/// The builder for `Ledger`.
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database.
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`.
    pub fn build(self) -> LedgerResult<Ledger> {
        Ok(Ledger {
            database: self.database,
        })
    }
}
