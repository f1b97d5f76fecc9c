use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        delivery::status::{DeliveryState, DeliveryStatus},
        message::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
    },
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        let id = Uuid::now_v7();
        let message = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (
                id, sender_id, receiver_id, group_id, content,
                reply_to_id, reply_preview, reply_sender_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(message.sender_id)
        .bind(message.recipient.receiver_id())
        .bind(message.recipient.group_id())
        .bind(&message.content)
        .bind(message.reply.reply_to_id)
        .bind(&message.reply.preview)
        .bind(&message.reply.sender_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        // same expressions as idx_messages_pair
        let messages = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT *
            FROM messages
            WHERE group_id IS NULL
              AND LEAST(sender_id, receiver_id) = LEAST($1::uuid, $2::uuid)
              AND GREATEST(sender_id, receiver_id) = GREATEST($1::uuid, $2::uuid)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn find_by_group(
        &self,
        group_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let messages = sqlx::query_as::<_, MessageEntity>(
            "SELECT * FROM messages WHERE group_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn update_content(
        &self,
        id: &Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>(
            r#"
            UPDATE messages
            SET content = $2, edited = TRUE, edited_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(content)
        .bind(edited_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError> {
        let message =
            sqlx::query_as::<_, MessageEntity>("DELETE FROM messages WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(message)
    }

    async fn delete_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<u64, error::SystemError> {
        let result = sqlx::query(
            r#"
            DELETE FROM messages
            WHERE group_id IS NULL
              AND LEAST(sender_id, receiver_id) = LEAST($1::uuid, $2::uuid)
              AND GREATEST(sender_id, receiver_id) = GREATEST($1::uuid, $2::uuid)
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn advance_status(
        &self,
        id: &Uuid,
        target: DeliveryStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<(MessageEntity, bool)>, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let Some(message) = sqlx::query_as::<_, MessageEntity>(
            "SELECT * FROM messages WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let (state, changed) = message.delivery_state().advance(target, now);
        if !changed {
            tx.commit().await?;
            return Ok(Some((message, false)));
        }

        let (delivered_at, read_at) = state.columns();
        let updated = sqlx::query_as::<_, MessageEntity>(
            "UPDATE messages SET delivered_at = $2, read_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(delivered_at)
        .bind(read_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((updated, true)))
    }

    async fn mark_all_read(
        &self,
        receiver_id: &Uuid,
        sender_id: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let unread = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT *
            FROM messages
            WHERE receiver_id = $1
              AND sender_id = $2
              AND read_at IS NULL
            ORDER BY created_at ASC, id ASC
            FOR UPDATE
            "#,
        )
        .bind(receiver_id)
        .bind(sender_id)
        .fetch_all(&mut *tx)
        .await?;

        if unread.is_empty() {
            tx.commit().await?;
            return Ok(Vec::new());
        }

        let mut ids = Vec::with_capacity(unread.len());
        let mut delivered = Vec::with_capacity(unread.len());
        let mut read = Vec::with_capacity(unread.len());
        for message in &unread {
            let (state, _) = message.delivery_state().advance(DeliveryStatus::Read, now);
            if let DeliveryState::Read { delivered_at, read_at } = state {
                ids.push(message.id);
                delivered.push(delivered_at);
                read.push(read_at);
            }
        }

        let mut updated = sqlx::query_as::<_, MessageEntity>(
            r#"
            UPDATE messages AS m
            SET delivered_at = b.delivered_at, read_at = b.read_at
            FROM UNNEST($1::uuid[], $2::timestamptz[], $3::timestamptz[])
                AS b(id, delivered_at, read_at)
            WHERE m.id = b.id
            RETURNING m.*
            "#,
        )
        .bind(&ids)
        .bind(&delivered)
        .bind(&read)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        updated.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(updated)
    }
}
