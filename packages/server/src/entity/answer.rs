use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Immutable once inserted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub participant_id: Uuid,
    pub participation_id: Uuid,
    #[sea_orm(indexed)]
    pub session_id: Uuid,
    pub tenant_id: Uuid,
    pub round_number: i32,
    pub selected_option_index: i32,
    pub is_correct: bool,
    pub points_awarded: i32,
    pub elapsed_seconds: f64,
    pub submitted_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::participation::Entity",
        from = "Column::ParticipationId",
        to = "super::participation::Column::Id"
    )]
    Participation,
}

impl Related<super::participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
