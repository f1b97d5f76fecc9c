use uuid::Uuid;

use crate::{
    api::error,
    modules::{group::schema::GroupEntity, user::schema::UserEntity},
};

#[async_trait::async_trait]
pub trait GroupRepository {
    /// Inserts the group together with its creator's membership.
    async fn create(&self, name: &str, created_by: &Uuid)
        -> Result<GroupEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<GroupEntity>, error::SystemError>;

    /// `false` when the user already was a member.
    async fn add_member(&self, group_id: &Uuid, user_id: &Uuid)
        -> Result<bool, error::SystemError>;

    async fn is_member(&self, group_id: &Uuid, user_id: &Uuid)
        -> Result<bool, error::SystemError>;

    async fn find_members(&self, group_id: &Uuid) -> Result<Vec<UserEntity>, error::SystemError>;

    async fn find_by_member(&self, user_id: &Uuid) -> Result<Vec<GroupEntity>, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
