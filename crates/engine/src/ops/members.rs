//! Member roster operations.

use sea_orm::{ActiveModelTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{LedgerError, LedgerResult, Member, expenses, members, settlements};

use super::{Ledger, normalize_username, require_member};

impl Ledger {
    /// Add a regular member. The password hash is opaque to the engine.
    pub async fn add_member(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> LedgerResult<Member> {
        self.insert_member(username, password_hash, email, false)
            .await
    }

    /// Add an admin member (bootstrap path for the admin CLI).
    pub async fn add_admin(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> LedgerResult<Member> {
        self.insert_member(username, password_hash, email, true)
            .await
    }

    async fn insert_member(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        is_admin: bool,
    ) -> LedgerResult<Member> {
        let username = normalize_username(username)?;

        if members::Entity::find()
            .filter(members::Column::Username.eq(username.clone()))
            .one(self.db())
            .await?
            .is_some()
        {
            return Err(LedgerError::Conflict(username));
        }

        let member = Member::new(
            username,
            password_hash.to_string(),
            is_admin,
            email.map(|s| s.to_string()),
        );
        members::ActiveModel::from(&member).insert(self.db()).await?;
        Ok(member)
    }

    /// Return a member by id.
    pub async fn member(&self, member_id: Uuid) -> LedgerResult<Member> {
        require_member(self.db(), member_id).await
    }

    /// Return a member by (normalized) username.
    pub async fn member_by_username(&self, username: &str) -> LedgerResult<Member> {
        let username = normalize_username(username)?;
        members::Entity::find()
            .filter(members::Column::Username.eq(username.clone()))
            .one(self.db())
            .await?
            .ok_or(LedgerError::NotFound(username))?
            .try_into()
    }

    /// List members, optionally without admins (the set offered as split
    /// participants).
    pub async fn list_members(&self, include_admins: bool) -> LedgerResult<Vec<Member>> {
        let mut query = members::Entity::find();
        if !include_admins {
            query = query.filter(members::Column::IsAdmin.eq(false));
        }
        query
            .all(self.db())
            .await?
            .into_iter()
            .map(Member::try_from)
            .collect()
    }

    /// Delete a non-admin member and everything that references them, in one
    /// transaction: their settlements, then every expense they paid for with
    /// all of its settlements, then the member row itself.
    pub async fn delete_member(&self, member_id: Uuid) -> LedgerResult<()> {
        let db_tx = self.db().begin().await?;

        let member = require_member(&db_tx, member_id).await?;
        if member.is_admin {
            return Err(LedgerError::Unauthorized(
                "admin members cannot be deleted".to_string(),
            ));
        }

        settlements::Entity::delete_many()
            .filter(settlements::Column::MemberId.eq(member_id.to_string()))
            .exec(&db_tx)
            .await?;

        let paid_expense_ids: Vec<String> = expenses::Entity::find()
            .filter(expenses::Column::PayerId.eq(member_id.to_string()))
            .all(&db_tx)
            .await?
            .into_iter()
            .map(|model| model.id)
            .collect();

        if !paid_expense_ids.is_empty() {
            settlements::Entity::delete_many()
                .filter(settlements::Column::ExpenseId.is_in(paid_expense_ids.clone()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::Id.is_in(paid_expense_ids))
                .exec(&db_tx)
                .await?;
        }

        members::Entity::delete_by_id(member_id.to_string())
            .exec(&db_tx)
            .await?;

        db_tx.commit().await?;
        tracing::info!(member = %member.username, "member removed with cascade");
        Ok(())
    }
}
