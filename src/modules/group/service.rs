use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        group::{model::GroupResponse, repository::GroupRepository, schema::GroupEntity},
        user::repository::UserRepository,
    },
};

#[derive(Clone)]
pub struct GroupService<G, U>
where
    G: GroupRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    group_repo: Arc<G>,
    user_repo: Arc<U>,
}

impl<G, U> GroupService<G, U>
where
    G: GroupRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(group_repo: Arc<G>, user_repo: Arc<U>) -> Self {
        GroupService { group_repo, user_repo }
    }

    async fn with_members(&self, group: GroupEntity) -> Result<GroupResponse, error::SystemError> {
        let members = self.group_repo.find_members(&group.id).await?;
        Ok(GroupResponse::new(group, members))
    }

    pub async fn create_group(
        &self,
        name: &str,
        created_by: Uuid,
    ) -> Result<GroupResponse, error::SystemError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(error::SystemError::bad_request("Group name cannot be empty"));
        }

        let creator = self
            .user_repo
            .find_by_id(&created_by)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Creator not found"))?;

        let group = self.group_repo.create(name, &creator.id).await?;
        info!("Group {} created by {}", group.id, creator.id);

        Ok(GroupResponse::new(group, vec![creator]))
    }

    pub async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<GroupResponse, error::SystemError> {
        let (group, user) = tokio::try_join!(
            self.group_repo.find_by_id(&group_id),
            self.user_repo.find_by_id(&user_id),
        )?;
        let group = group.ok_or_else(|| error::SystemError::not_found("Group not found"))?;
        if user.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }

        if self.group_repo.add_member(&group_id, &user_id).await? {
            info!("User {} joined group {}", user_id, group_id);
        }

        self.with_members(group).await
    }

    pub async fn groups_for(&self, user_id: Uuid) -> Result<Vec<GroupResponse>, error::SystemError> {
        let groups = self.group_repo.find_by_member(&user_id).await?;

        let mut responses = Vec::with_capacity(groups.len());
        for group in groups {
            responses.push(self.with_members(group).await?);
        }
        Ok(responses)
    }

    pub async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, error::SystemError> {
        self.group_repo.is_member(&group_id, &user_id).await
    }

    pub async fn delete_group(&self, group_id: Uuid) -> Result<(), error::SystemError> {
        if !self.group_repo.delete(&group_id).await? {
            return Err(error::SystemError::not_found("Group not found"));
        }
        info!("Group {} deleted", group_id);
        Ok(())
    }
}
