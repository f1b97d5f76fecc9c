use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::delivery::status::DeliveryState;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MessageEntity {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub reply_to_id: Option<Uuid>,
    pub reply_preview: Option<String>,
    pub reply_sender_name: Option<String>,
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
}

impl MessageEntity {
    pub fn delivery_state(&self) -> DeliveryState {
        DeliveryState::from_columns(self.delivered_at, self.read_at)
    }
}
