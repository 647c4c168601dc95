use sea_orm::entity::prelude::*;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub theme_id: Option<i16>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub theme_state: Option<Json>,
    #[sea_orm(column_type = "Text", nullable)]
    pub invitation: Option<String>,
    pub question_index: i32,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub onboarding_responses: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub ai_analysis: Option<Json>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_inventory::Entity")]
    Inventory,
    #[sea_orm(has_many = "super::user_modified_object::Entity")]
    ModifiedObjects,
}

impl Related<super::user_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl Related<super::user_modified_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModifiedObjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
