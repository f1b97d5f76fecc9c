use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::model::PendingRequestRow;
use crate::modules::friend::schema::FriendRequestEntity;
use crate::modules::user::schema::UserEntity;

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    /// Looks the pair up in either direction.
    async fn find_request_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn create_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    /// Locks the request row, applies the transition and writes it back in one transaction.
    async fn respond_atomic(
        &self,
        request_id: &Uuid,
        accept: bool,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    async fn find_pending_for(
        &self,
        receiver_id: &Uuid,
    ) -> Result<Vec<PendingRequestRow>, error::SystemError>;

    async fn find_friends(&self, user_id: &Uuid) -> Result<Vec<UserEntity>, error::SystemError>;
}
