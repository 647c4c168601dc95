use async_trait::async_trait;
use museum_sdk::{AiThemeAnalysis, OnboardingResponse, ThemeRuntimeState, UserProfile};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::entity::{user, user_inventory, user_modified_object};
use super::mapper::{encode, profile_from_model};
use crate::domain::error::DomainError;
use crate::domain::repos::{NewUser, UserCredentials, UsersRepository};

#[derive(Clone, Default)]
pub struct SeaUsersRepository;

impl SeaUsersRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Updates the given columns plus `updated_at` on one user row.
    async fn update_columns<C: ConnectionTrait + Send + Sync>(
        conn: &C,
        user_id: Uuid,
        columns: Vec<(user::Column, SimpleExpr)>,
    ) -> Result<(), DomainError> {
        let mut query = user::Entity::update_many()
            .col_expr(user::Column::UpdatedAt, Expr::value(OffsetDateTime::now_utc()));
        for (column, value) in columns {
            query = query.col_expr(column, value);
        }
        let res = query
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found("User", user_id));
        }
        Ok(())
    }
}

#[async_trait]
impl UsersRepository for SeaUsersRepository {
    async fn find_profile<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<UserProfile>, DomainError> {
        let Some(model) = user::Entity::find_by_id(id).one(conn).await? else {
            return Ok(None);
        };

        let object_ids: Vec<Uuid> = user_inventory::Entity::find()
            .select_only()
            .column(user_inventory::Column::ObjectId)
            .filter(user_inventory::Column::UserId.eq(id))
            .order_by_asc(user_inventory::Column::Seq)
            .into_tuple()
            .all(conn)
            .await?;

        let modified_object_ids: Vec<Uuid> = user_modified_object::Entity::find()
            .select_only()
            .column(user_modified_object::Column::ObjectId)
            .filter(user_modified_object::Column::UserId.eq(id))
            .order_by_asc(user_modified_object::Column::Seq)
            .into_tuple()
            .all(conn)
            .await?;

        profile_from_model(model, object_ids, modified_object_ids).map(Some)
    }

    async fn find_credentials_by_email<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        email: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(conn)
            .await?;
        Ok(model.map(|m| UserCredentials {
            id: m.id,
            email: m.email,
            name: m.name,
            password_hash: m.password_hash,
        }))
    }

    async fn email_exists<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        email: &str,
    ) -> Result<bool, DomainError> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(conn)
            .await?;
        Ok(count > 0)
    }

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        new_user: NewUser,
    ) -> Result<(), DomainError> {
        let email = new_user.email.clone();
        let active = user::ActiveModel {
            id: Set(new_user.id),
            email: Set(new_user.email),
            name: Set(new_user.name),
            password_hash: Set(new_user.password_hash),
            theme_id: Set(None),
            theme_state: Set(None),
            invitation: Set(None),
            question_index: Set(0),
            onboarding_responses: Set(None),
            ai_analysis: Set(None),
            created_at: Set(new_user.created_at),
            updated_at: Set(new_user.created_at),
        };
        active.insert(conn).await.map_err(|e| unique_to_conflict(e, || {
            format!("Email {email} is already registered")
        }))?;
        Ok(())
    }

    async fn append_modified<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        let now = OffsetDateTime::now_utc();
        let rows = ids.iter().map(|id| user_modified_object::ActiveModel {
            user_id: Set(user_id),
            object_id: Set(*id),
            added_at: Set(now),
            seq: NotSet,
        });
        user_modified_object::Entity::insert_many(rows)
            .exec(conn)
            .await
            .map_err(|e| unique_to_conflict(e, || "Object is already placed".to_owned()))?;
        Ok(())
    }

    async fn remove_modified<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<u64, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let res = user_modified_object::Entity::delete_many()
            .filter(user_modified_object::Column::UserId.eq(user_id))
            .filter(user_modified_object::Column::ObjectId.is_in(ids.iter().copied()))
            .exec(conn)
            .await?;
        Ok(res.rows_affected)
    }

    async fn add_to_inventory<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        object_id: Uuid,
    ) -> Result<(), DomainError> {
        let row = user_inventory::ActiveModel {
            user_id: Set(user_id),
            object_id: Set(object_id),
            added_at: Set(OffsetDateTime::now_utc()),
            seq: NotSet,
        };
        row.insert(conn)
            .await
            .map_err(|e| unique_to_conflict(e, || "Object is already in inventory".to_owned()))?;
        Ok(())
    }

    async fn increment_question_index<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<u32, DomainError> {
        Self::update_columns(
            conn,
            user_id,
            vec![(
                user::Column::QuestionIndex,
                Expr::col(user::Column::QuestionIndex).add(1),
            )],
        )
        .await?;

        let index: Option<i32> = user::Entity::find_by_id(user_id)
            .select_only()
            .column(user::Column::QuestionIndex)
            .into_tuple()
            .one(conn)
            .await?;
        let index = index.ok_or_else(|| DomainError::not_found("User", user_id))?;
        u32::try_from(index)
            .map_err(|_| DomainError::database(format!("corrupt 'question_index': {index}")))
    }

    async fn set_theme<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        theme_id: u8,
        state: &ThemeRuntimeState,
    ) -> Result<(), DomainError> {
        let state = encode("theme_state", state)?;
        Self::update_columns(
            conn,
            user_id,
            vec![
                (user::Column::ThemeId, Expr::value(i16::from(theme_id))),
                (user::Column::ThemeState, Expr::value(state)),
            ],
        )
        .await
    }

    async fn set_theme_state<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        state: &ThemeRuntimeState,
    ) -> Result<(), DomainError> {
        let state = encode("theme_state", state)?;
        Self::update_columns(
            conn,
            user_id,
            vec![(user::Column::ThemeState, Expr::value(state))],
        )
        .await
    }

    async fn set_invitation<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        invitation: Option<String>,
    ) -> Result<(), DomainError> {
        Self::update_columns(
            conn,
            user_id,
            vec![(user::Column::Invitation, Expr::value(invitation))],
        )
        .await
    }

    async fn set_onboarding_responses<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        responses: &[OnboardingResponse],
    ) -> Result<(), DomainError> {
        let responses = encode("onboarding_responses", responses)?;
        Self::update_columns(
            conn,
            user_id,
            vec![(user::Column::OnboardingResponses, Expr::value(responses))],
        )
        .await
    }

    async fn set_ai_analysis<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        analysis: &AiThemeAnalysis,
    ) -> Result<(), DomainError> {
        let analysis = encode("ai_analysis", analysis)?;
        Self::update_columns(
            conn,
            user_id,
            vec![(user::Column::AiAnalysis, Expr::value(analysis))],
        )
        .await
    }
}

fn unique_to_conflict(err: DbErr, message: impl FnOnce() -> String) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::conflict(message()),
        _ => err.into(),
    }
}
