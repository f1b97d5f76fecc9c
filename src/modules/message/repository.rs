use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::error;
use crate::modules::delivery::status::DeliveryStatus;
use crate::modules::message::{model::InsertMessage, schema::MessageEntity};

#[async_trait::async_trait]
pub trait MessageRepository {
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError>;

    /// Private history of the pair in either direction, oldest first (ties by id).
    async fn find_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    async fn find_by_group(&self, group_id: &Uuid)
        -> Result<Vec<MessageEntity>, error::SystemError>;

    async fn update_content(
        &self,
        id: &Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<Option<MessageEntity>, error::SystemError>;

    /// Returns the removed row.
    async fn delete(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError>;

    async fn delete_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<u64, error::SystemError>;

    /// Locks the row and moves its receipt forward to `target`.
    ///
    /// `None` when the message does not exist; otherwise the current row and whether it changed.
    async fn advance_status(
        &self,
        id: &Uuid,
        target: DeliveryStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<(MessageEntity, bool)>, error::SystemError>;

    /// Marks every unread message from `sender_id` to `receiver_id` as read with the same `now`.
    ///
    /// Returns only the rows that changed, oldest first.
    async fn mark_all_read(
        &self,
        receiver_id: &Uuid,
        sender_id: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;
}
