//! Member primitives.
//!
//! A `Member` is a participant of the shared ledger. The password hash is
//! stored opaquely for the external auth collaborator; the engine never
//! inspects it. Admins manage the roster but never hold settlements.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, LedgerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub email: Option<String>,
}

impl Member {
    pub fn new(
        username: String,
        password: String,
        is_admin: bool,
        email: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password,
            is_admin,
            email,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::settlements::Entity")]
    Settlements,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::settlements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Member> for ActiveModel {
    fn from(member: &Member) -> Self {
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            username: ActiveValue::Set(member.username.clone()),
            password: ActiveValue::Set(member.password.clone()),
            is_admin: ActiveValue::Set(member.is_admin),
            email: ActiveValue::Set(member.email.clone()),
        }
    }
}

impl TryFrom<Model> for Member {
    type Error = LedgerError;

    fn try_from(model: Model) -> LedgerResult<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("member not exists".to_string()))?,
            username: model.username,
            password: model.password,
            is_admin: model.is_admin,
            email: model.email,
        })
    }
}
