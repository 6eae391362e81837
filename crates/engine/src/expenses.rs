//! Expense primitives.
//!
//! An `Expense` is one group purchase fronted by a payer. It owns a set of
//! settlements whose amounts must add up to the expense total within
//! [`AMOUNT_EPSILON`](crate::AMOUNT_EPSILON).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, LedgerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub payer_id: Uuid,
}

impl Expense {
    pub fn new(
        description: String,
        amount: f64,
        payer_id: Uuid,
        date: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::Validation(
                "amount must be a positive number".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(LedgerError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            description,
            amount,
            date,
            payer_id,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub date: DateTimeUtc,
    pub payer_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::PayerId",
        to = "super::members::Column::Id"
    )]
    Payer,
    #[sea_orm(has_many = "super::settlements::Entity")]
    Settlements,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payer.def()
    }
}

impl Related<super::settlements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            amount: ActiveValue::Set(expense.amount),
            date: ActiveValue::Set(expense.date),
            payer_id: ActiveValue::Set(expense.payer_id.to_string()),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = LedgerError;

    fn try_from(model: Model) -> LedgerResult<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("expense not exists".to_string()))?,
            description: model.description,
            amount: model.amount,
            date: model.date,
            payer_id: Uuid::parse_str(&model.payer_id)
                .map_err(|_| LedgerError::NotFound("member not exists".to_string()))?,
        })
    }
}
