use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            model::FriendRequestResponse, repository::FriendRequestRepository,
            schema::FriendRequestEntity,
        },
        user::{model::UserResponse, repository::UserRepository},
    },
};

#[derive(Clone)]
pub struct FriendService<R, U>
where
    R: FriendRequestRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    friend_repo: Arc<R>,
    user_repo: Arc<U>,
}

impl<R, U> FriendService<R, U>
where
    R: FriendRequestRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(friend_repo: Arc<R>, user_repo: Arc<U>) -> Self {
        FriendService { friend_repo, user_repo }
    }

    pub async fn send_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<FriendRequestResponse, error::SystemError> {
        if sender_id == receiver_id {
            return Err(error::SystemError::bad_request("Cannot send friend request to yourself"));
        }

        let (sender, receiver) = tokio::try_join!(
            self.user_repo.find_by_id(&sender_id),
            self.user_repo.find_by_id(&receiver_id),
        )?;
        let sender = sender.ok_or_else(|| error::SystemError::not_found("Sender not found"))?;
        if receiver.is_none() {
            return Err(error::SystemError::not_found("Receiver not found"));
        }

        if self.friend_repo.find_request_between(&sender_id, &receiver_id).await?.is_some() {
            return Err(error::SystemError::conflict("Friend request already exists"));
        }

        let request = self.friend_repo.create_request(&sender_id, &receiver_id).await?;
        info!("Friend request {} sent from {} to {}", request.id, sender_id, receiver_id);

        Ok(FriendRequestResponse::new(request, sender))
    }

    pub async fn respond(
        &self,
        request_id: Uuid,
        accept: bool,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = self.friend_repo.respond_atomic(&request_id, accept).await?;
        info!("Friend request {} resolved as {:?}", request.id, request.status);
        Ok(request)
    }

    pub async fn pending_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = self.friend_repo.find_pending_for(&user_id).await?;
        Ok(rows.into_iter().map(FriendRequestResponse::from).collect())
    }

    pub async fn friends(&self, user_id: Uuid) -> Result<Vec<UserResponse>, error::SystemError> {
        let friends = self.friend_repo.find_friends(&user_id).await?;
        Ok(friends.into_iter().map(UserResponse::from).collect())
    }
}
