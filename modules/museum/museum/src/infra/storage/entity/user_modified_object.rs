use sea_orm::entity::prelude::*;
use time::OffsetDateTime;
use uuid::Uuid;

/// Placed-object ownership; `seq` is the display order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_modified_objects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub seq: i32,
    pub user_id: Uuid,
    pub object_id: Uuid,
    pub added_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
