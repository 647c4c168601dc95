use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_catalog_objects(manager).await?;
        create_modified_objects(manager).await?;
        create_users(manager).await?;
        create_membership_table(manager, UserInventory::Table, "user_inventory").await?;
        create_membership_table(manager, UserModifiedObjects::Table, "user_modified_objects")
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserModifiedObjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserInventory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ModifiedObjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CatalogObjects::Table).to_owned())
            .await
    }
}

async fn create_catalog_objects(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(CatalogObjects::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(CatalogObjects::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(CatalogObjects::Name).string().not_null())
                .col(ColumnDef::new(CatalogObjects::Description).text())
                .col(
                    ColumnDef::new(CatalogObjects::CurrentImageVariant)
                        .json_binary()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(CatalogObjects::ImageVariants)
                        .json_binary()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(CatalogObjects::IsUserMade)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(CatalogObjects::PlacementSurface)
                        .string()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(CatalogObjects::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(CatalogObjects::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_catalog_objects_user_made_created")
                .table(CatalogObjects::Table)
                .col(CatalogObjects::IsUserMade)
                .col(CatalogObjects::CreatedAt)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

async fn create_modified_objects(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(ModifiedObjects::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(ModifiedObjects::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(ModifiedObjects::Name).string().not_null())
                .col(ColumnDef::new(ModifiedObjects::Description).text())
                .col(
                    ColumnDef::new(ModifiedObjects::CurrentImageVariant)
                        .json_binary()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ModifiedObjects::ImageVariants)
                        .json_binary()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ModifiedObjects::PlacementSurface)
                        .string()
                        .not_null(),
                )
                .col(ColumnDef::new(ModifiedObjects::CoordX).double().not_null())
                .col(ColumnDef::new(ModifiedObjects::CoordY).double().not_null())
                .col(
                    ColumnDef::new(ModifiedObjects::IsReversed)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(ColumnDef::new(ModifiedObjects::ItemFunction).string())
                .col(ColumnDef::new(ModifiedObjects::AdditionalData).json_binary())
                .col(ColumnDef::new(ModifiedObjects::OriginalObjectId).uuid())
                .col(ColumnDef::new(ModifiedObjects::Provenance).json_binary())
                .col(
                    ColumnDef::new(ModifiedObjects::IsUserMade)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(ModifiedObjects::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ModifiedObjects::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await
}

async fn create_users(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                .col(
                    ColumnDef::new(Users::Email)
                        .string()
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Users::Name).string())
                .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                .col(ColumnDef::new(Users::ThemeId).small_integer())
                .col(ColumnDef::new(Users::ThemeState).json_binary())
                .col(ColumnDef::new(Users::Invitation).text())
                .col(
                    ColumnDef::new(Users::QuestionIndex)
                        .integer()
                        .not_null()
                        .default(0),
                )
                .col(ColumnDef::new(Users::OnboardingResponses).json_binary())
                .col(ColumnDef::new(Users::AiAnalysis).json_binary())
                .col(
                    ColumnDef::new(Users::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Users::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await
}

/// Both profile lists share one layout: an autoincrement `seq` for ordering
/// and a unique `(user_id, object_id)` pair.
async fn create_membership_table<T>(
    manager: &SchemaManager<'_>,
    table: T,
    name: &str,
) -> Result<(), DbErr>
where
    T: IntoIden + Copy + 'static,
{
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Membership::Seq)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(Membership::UserId).uuid().not_null())
                .col(ColumnDef::new(Membership::ObjectId).uuid().not_null())
                .col(
                    ColumnDef::new(Membership::AddedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{name}_user"))
                        .from(table, Membership::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name(format!("idx_{name}_user_object"))
                .table(table)
                .col(Membership::UserId)
                .col(Membership::ObjectId)
                .unique()
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum CatalogObjects {
    Table,
    Id,
    Name,
    Description,
    CurrentImageVariant,
    ImageVariants,
    IsUserMade,
    PlacementSurface,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ModifiedObjects {
    Table,
    Id,
    Name,
    Description,
    CurrentImageVariant,
    ImageVariants,
    PlacementSurface,
    CoordX,
    CoordY,
    IsReversed,
    ItemFunction,
    AdditionalData,
    OriginalObjectId,
    Provenance,
    IsUserMade,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    PasswordHash,
    ThemeId,
    ThemeState,
    Invitation,
    QuestionIndex,
    OnboardingResponses,
    AiAnalysis,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum UserInventory {
    Table,
}

#[derive(DeriveIden, Clone, Copy)]
enum UserModifiedObjects {
    Table,
}

#[derive(DeriveIden)]
enum Membership {
    Seq,
    UserId,
    ObjectId,
    AddedAt,
}
