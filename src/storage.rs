// ABOUTME: Document store adapter over SeaORM for the users and photos collections
// ABOUTME: Plain CRUD only; ownership rules and comment projection live in the photo service

use anyhow::Result as AnyResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Set,
};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use crate::entities::{photo, user};

pub struct Storage {
    pub db: DatabaseConnection,
}

impl Storage {
    /// Connects and brings the schema up to date.
    pub async fn new(database_url: &str) -> AnyResult<Self> {
        let db = Database::connect(database_url).await?;
        crate::migration::Migrator::up(&db, None).await?;

        tracing::info!("Document store ready");
        Ok(Self { db })
    }

    /// Users are owned by the account service; this exists to seed test fixtures.
    #[cfg(test)]
    pub async fn store_user(&self, user: user::Model) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            id: Set(user.id),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            login_name: Set(user.login_name),
            password: Set(user.password),
            location: Set(user.location),
            description: Set(user.description),
            occupation: Set(user.occupation),
        }
        .insert(&self.db)
        .await
    }

    #[cfg(test)]
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool, DbErr> {
        let result = user::Entity::delete_by_id(user_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<user::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
    }

    pub async fn insert_photo(&self, photo: photo::Model) -> Result<photo::Model, DbErr> {
        photo::ActiveModel {
            id: Set(photo.id),
            user_id: Set(photo.user_id),
            file_name: Set(photo.file_name),
            date_time: Set(photo.date_time),
            comments: Set(photo.comments),
        }
        .insert(&self.db)
        .await
    }

    pub async fn find_photo(&self, photo_id: Uuid) -> Result<Option<photo::Model>, DbErr> {
        photo::Entity::find_by_id(photo_id).one(&self.db).await
    }

    /// Whatever photo the store hands back first, if any.
    pub async fn find_any_photo(&self) -> Result<Option<photo::Model>, DbErr> {
        photo::Entity::find().one(&self.db).await
    }

    pub async fn find_photos_by_user(&self, user_id: Uuid) -> Result<Vec<photo::Model>, DbErr> {
        photo::Entity::find()
            .filter(photo::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
    }

    /// Overwrites the whole comment array; last writer wins.
    pub async fn update_photo_comments(
        &self,
        photo: photo::Model,
        comments: photo::CommentList,
    ) -> Result<photo::Model, DbErr> {
        let mut active: photo::ActiveModel = photo.into();
        active.comments = Set(comments);
        active.update(&self.db).await
    }

    pub async fn delete_photo(&self, photo_id: Uuid) -> Result<bool, DbErr> {
        let result = photo::Entity::delete_by_id(photo_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
