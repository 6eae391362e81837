//! Settlement primitives.
//!
//! A `Settlement` is one member's obligation toward one expense. Exactly one
//! settlement exists per (expense, debtor) pair; the payer's own row is
//! created already paid.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, LedgerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub member_id: Uuid,
    pub amount_due: f64,
    pub is_paid: bool,
}

impl Settlement {
    pub fn new(expense_id: Uuid, member_id: Uuid, amount_due: f64, is_paid: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            member_id,
            amount_due,
            is_paid,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub member_id: String,
    pub amount_due: f64,
    pub is_paid: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id"
    )]
    Expenses,
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Settlement> for ActiveModel {
    fn from(settlement: &Settlement) -> Self {
        Self {
            id: ActiveValue::Set(settlement.id.to_string()),
            expense_id: ActiveValue::Set(settlement.expense_id.to_string()),
            member_id: ActiveValue::Set(settlement.member_id.to_string()),
            amount_due: ActiveValue::Set(settlement.amount_due),
            is_paid: ActiveValue::Set(settlement.is_paid),
        }
    }
}

impl TryFrom<Model> for Settlement {
    type Error = LedgerError;

    fn try_from(model: Model) -> LedgerResult<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("settlement not exists".to_string()))?,
            expense_id: Uuid::parse_str(&model.expense_id)
                .map_err(|_| LedgerError::NotFound("expense not exists".to_string()))?,
            member_id: Uuid::parse_str(&model.member_id)
                .map_err(|_| LedgerError::NotFound("member not exists".to_string()))?,
            amount_due: model.amount_due,
            is_paid: model.is_paid,
        })
    }
}
