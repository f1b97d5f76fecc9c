use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        group::{repository::GroupRepository, schema::GroupEntity},
        user::schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct GroupRepositoryPg {
    pool: sqlx::PgPool,
}

impl GroupRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl GroupRepository for GroupRepositoryPg {
    async fn create(
        &self,
        name: &str,
        created_by: &Uuid,
    ) -> Result<GroupEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let id = Uuid::now_v7();
        let group = sqlx::query_as::<_, GroupEntity>(
            "INSERT INTO chat_groups (id, name, created_by) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
            .bind(group.id)
            .bind(created_by)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(group)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<GroupEntity>, error::SystemError> {
        let group = sqlx::query_as::<_, GroupEntity>("SELECT * FROM chat_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn add_member(
        &self,
        group_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_member(
        &self,
        group_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM group_members WHERE group_id = $1 AND user_id = $2)",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_members(&self, group_id: &Uuid) -> Result<Vec<UserEntity>, error::SystemError> {
        let members = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT u.*
            FROM group_members gm
            JOIN users u ON u.id = gm.user_id
            WHERE gm.group_id = $1
            ORDER BY gm.joined_at, u.id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn find_by_member(&self, user_id: &Uuid) -> Result<Vec<GroupEntity>, error::SystemError> {
        let groups = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT g.*
            FROM chat_groups g
            JOIN group_members gm ON gm.group_id = g.id
            WHERE gm.user_id = $1
            ORDER BY g.created_at, g.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        // memberships and group messages cascade
        let rows = sqlx::query("DELETE FROM chat_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}
