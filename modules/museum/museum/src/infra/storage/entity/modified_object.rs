use sea_orm::entity::prelude::*;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "modified_objects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub current_image_variant: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub image_variants: Json,
    pub placement_surface: String,
    pub coord_x: f64,
    pub coord_y: f64,
    pub is_reversed: bool,
    pub item_function: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub additional_data: Option<Json>,
    pub original_object_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub provenance: Option<Json>,
    pub is_user_made: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
