#![cfg(test)]
//! In-memory stand-ins for the Postgres repositories and the WebSocket publisher.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::api::error;
use crate::modules::delivery::fanout::{Channel, DeliveryEvent};
use crate::modules::delivery::publisher::Publisher;
use crate::modules::delivery::status::DeliveryStatus;
use crate::modules::friend::{
    model::PendingRequestRow,
    repository::FriendRequestRepository,
    schema::{FriendRequestEntity, FriendRequestStatus},
};
use crate::modules::group::{repository::GroupRepository, schema::GroupEntity};
use crate::modules::message::{
    model::InsertMessage, repository::MessageRepository, schema::MessageEntity,
};
use crate::modules::user::{
    model::{InsertUser, UpdateUser},
    repository::UserRepository,
    schema::UserEntity,
};

pub async fn seed_user(users: &InMemoryUserRepository, username: &str) -> UserEntity {
    users
        .create(&InsertUser { username: username.to_string(), hash_password: "hash".into() })
        .await
        .unwrap()
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<UserEntity>>,
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(error::SystemError::conflict("Username already exists"));
        }
        let entity = UserEntity {
            id: Uuid::now_v7(),
            username: user.username.clone(),
            hash_password: user.hash_password.clone(),
            created_at: Utc::now(),
            last_seen: None,
        };
        users.push(entity.clone());
        Ok(entity)
    }

    async fn update(
        &self,
        id: &Uuid,
        user: &UpdateUser,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let mut users = self.users.lock().unwrap();
        if let Some(username) = &user.username {
            if users.iter().any(|u| u.username == *username && u.id != *id) {
                return Err(error::SystemError::conflict("Username already exists"));
            }
        }
        let Some(entity) = users.iter_mut().find(|u| u.id == *id) else {
            return Ok(None);
        };
        if let Some(username) = &user.username {
            entity.username = username.clone();
        }
        if let Some(hash) = &user.hash_password {
            entity.hash_password = hash.clone();
        }
        Ok(Some(entity.clone()))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != *id);
        Ok(users.len() < before)
    }

    async fn search_users(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let needle = query.to_lowercase();
        let mut found: Vec<_> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }

    async fn touch_last_seen(
        &self,
        id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == *id).map(|u| {
            u.last_seen = Some(at);
            u.clone()
        }))
    }
}

pub struct InMemoryFriendRepository {
    users: Arc<InMemoryUserRepository>,
    requests: Mutex<Vec<FriendRequestEntity>>,
}

impl InMemoryFriendRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self { users, requests: Mutex::new(Vec::new()) }
    }
}

fn same_pair(request: &FriendRequestEntity, a: &Uuid, b: &Uuid) -> bool {
    (request.sender_id == *a && request.receiver_id == *b)
        || (request.sender_id == *b && request.receiver_id == *a)
}

#[async_trait::async_trait]
impl FriendRequestRepository for InMemoryFriendRepository {
    async fn find_request_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let requests = self.requests.lock().unwrap();
        Ok(requests.iter().find(|r| same_pair(r, user_id_a, user_id_b)).cloned())
    }

    async fn create_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut requests = self.requests.lock().unwrap();
        if requests.iter().any(|r| same_pair(r, sender_id, receiver_id)) {
            return Err(error::SystemError::conflict("Friend request already exists"));
        }
        let request = FriendRequestEntity {
            id: Uuid::now_v7(),
            sender_id: *sender_id,
            receiver_id: *receiver_id,
            status: FriendRequestStatus::Pending,
            created_at: Utc::now(),
        };
        requests.push(request.clone());
        Ok(request)
    }

    async fn respond_atomic(
        &self,
        request_id: &Uuid,
        accept: bool,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .iter_mut()
            .find(|r| r.id == *request_id)
            .ok_or_else(|| error::SystemError::not_found("Request not found"))?;
        request.status = request.status.respond(accept)?;
        Ok(request.clone())
    }

    async fn find_pending_for(
        &self,
        receiver_id: &Uuid,
    ) -> Result<Vec<PendingRequestRow>, error::SystemError> {
        let pending: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.receiver_id == *receiver_id && r.status == FriendRequestStatus::Pending)
            .cloned()
            .collect();

        let mut rows = Vec::with_capacity(pending.len());
        for request in pending {
            if let Some(sender) = self.users.find_by_id(&request.sender_id).await? {
                rows.push(PendingRequestRow {
                    id: request.id,
                    sender_id: request.sender_id,
                    receiver_id: request.receiver_id,
                    status: request.status,
                    created_at: request.created_at,
                    sender_username: sender.username,
                    sender_created_at: sender.created_at,
                    sender_last_seen: sender.last_seen,
                });
            }
        }
        Ok(rows)
    }

    async fn find_friends(&self, user_id: &Uuid) -> Result<Vec<UserEntity>, error::SystemError> {
        let friend_ids: Vec<Uuid> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.status == FriendRequestStatus::Accepted)
            .filter_map(|r| match (r.sender_id == *user_id, r.receiver_id == *user_id) {
                (true, _) => Some(r.receiver_id),
                (_, true) => Some(r.sender_id),
                _ => None,
            })
            .collect();

        let mut friends = Vec::with_capacity(friend_ids.len());
        for id in friend_ids {
            if let Some(user) = self.users.find_by_id(&id).await? {
                friends.push(user);
            }
        }
        friends.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(friends)
    }
}

pub struct InMemoryGroupRepository {
    users: Arc<InMemoryUserRepository>,
    groups: Mutex<Vec<GroupEntity>>,
    /// (group_id, user_id) in join order
    members: Mutex<Vec<(Uuid, Uuid)>>,
}

impl InMemoryGroupRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self { users, groups: Mutex::new(Vec::new()), members: Mutex::new(Vec::new()) }
    }
}

#[async_trait::async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn create(
        &self,
        name: &str,
        created_by: &Uuid,
    ) -> Result<GroupEntity, error::SystemError> {
        let group = GroupEntity {
            id: Uuid::now_v7(),
            name: name.to_string(),
            created_by: *created_by,
            created_at: Utc::now(),
        };
        self.groups.lock().unwrap().push(group.clone());
        self.members.lock().unwrap().push((group.id, *created_by));
        Ok(group)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<GroupEntity>, error::SystemError> {
        Ok(self.groups.lock().unwrap().iter().find(|g| g.id == *id).cloned())
    }

    async fn add_member(
        &self,
        group_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let mut members = self.members.lock().unwrap();
        if members.contains(&(*group_id, *user_id)) {
            return Ok(false);
        }
        members.push((*group_id, *user_id));
        Ok(true)
    }

    async fn is_member(
        &self,
        group_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        Ok(self.members.lock().unwrap().contains(&(*group_id, *user_id)))
    }

    async fn find_members(&self, group_id: &Uuid) -> Result<Vec<UserEntity>, error::SystemError> {
        let ids: Vec<Uuid> = self
            .members
            .lock()
            .unwrap()
            .iter()
            .filter(|(g, _)| g == group_id)
            .map(|(_, u)| *u)
            .collect();

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.users.find_by_id(&id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    async fn find_by_member(&self, user_id: &Uuid) -> Result<Vec<GroupEntity>, error::SystemError> {
        let members = self.members.lock().unwrap();
        let groups = self.groups.lock().unwrap();
        Ok(groups
            .iter()
            .filter(|g| members.contains(&(g.id, *user_id)))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut groups = self.groups.lock().unwrap();
        let before = groups.len();
        groups.retain(|g| g.id != *id);
        self.members.lock().unwrap().retain(|(g, _)| g != id);
        Ok(groups.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<MessageEntity>>,
    last_created: Mutex<Option<DateTime<Utc>>>,
    frozen_at: Option<DateTime<Utc>>,
}

impl InMemoryMessageRepository {
    /// Every message gets the same creation time, leaving the id as the only tiebreak.
    pub fn frozen_at(at: DateTime<Utc>) -> Self {
        InMemoryMessageRepository { frozen_at: Some(at), ..Default::default() }
    }

    /// Creation times strictly increase unless the clock is frozen.
    fn next_created_at(&self) -> DateTime<Utc> {
        if let Some(at) = self.frozen_at {
            return at;
        }
        let mut last = self.last_created.lock().unwrap();
        let now = Utc::now();
        let next = match *last {
            Some(prev) if prev >= now => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }

    fn sorted(mut messages: Vec<MessageEntity>) -> Vec<MessageEntity> {
        messages.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        messages
    }
}

fn is_private_between(message: &MessageEntity, a: &Uuid, b: &Uuid) -> bool {
    message.group_id.is_none()
        && match message.receiver_id {
            Some(receiver) => {
                (message.sender_id == *a && receiver == *b)
                    || (message.sender_id == *b && receiver == *a)
            }
            None => false,
        }
}

#[async_trait::async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        let entity = MessageEntity {
            id: Uuid::now_v7(),
            sender_id: message.sender_id,
            receiver_id: message.recipient.receiver_id(),
            group_id: message.recipient.group_id(),
            content: message.content.clone(),
            created_at: self.next_created_at(),
            delivered_at: None,
            read_at: None,
            reply_to_id: message.reply.reply_to_id,
            reply_preview: message.reply.preview.clone(),
            reply_sender_name: message.reply.sender_name.clone(),
            edited: false,
            edited_at: None,
        };
        self.messages.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let messages = self.messages.lock().unwrap();
        Ok(Self::sorted(
            messages.iter().filter(|m| is_private_between(m, user_id_a, user_id_b)).cloned().collect(),
        ))
    }

    async fn find_by_group(
        &self,
        group_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let messages = self.messages.lock().unwrap();
        Ok(Self::sorted(
            messages.iter().filter(|m| m.group_id == Some(*group_id)).cloned().collect(),
        ))
    }

    async fn update_content(
        &self,
        id: &Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let mut messages = self.messages.lock().unwrap();
        Ok(messages.iter_mut().find(|m| m.id == *id).map(|m| {
            m.content = content.to_string();
            m.edited = true;
            m.edited_at = Some(edited_at);
            m.clone()
        }))
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError> {
        let mut messages = self.messages.lock().unwrap();
        Ok(messages.iter().position(|m| m.id == *id).map(|i| messages.remove(i)))
    }

    async fn delete_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<u64, error::SystemError> {
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| !is_private_between(m, user_id_a, user_id_b));
        Ok((before - messages.len()) as u64)
    }

    async fn advance_status(
        &self,
        id: &Uuid,
        target: DeliveryStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<(MessageEntity, bool)>, error::SystemError> {
        let mut messages = self.messages.lock().unwrap();
        Ok(messages.iter_mut().find(|m| m.id == *id).map(|m| {
            let (state, changed) = m.delivery_state().advance(target, now);
            (m.delivered_at, m.read_at) = state.columns();
            (m.clone(), changed)
        }))
    }

    async fn mark_all_read(
        &self,
        receiver_id: &Uuid,
        sender_id: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let mut messages = self.messages.lock().unwrap();
        let mut changed = Vec::new();
        for m in messages.iter_mut().filter(|m| {
            m.receiver_id == Some(*receiver_id) && m.sender_id == *sender_id && m.read_at.is_none()
        }) {
            let (state, _) = m.delivery_state().advance(DeliveryStatus::Read, now);
            (m.delivered_at, m.read_at) = state.columns();
            changed.push(m.clone());
        }
        Ok(Self::sorted(changed))
    }
}

/// Captures every published event in order.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(Channel, DeliveryEvent)>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<(Channel, DeliveryEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, channel: Channel, event: DeliveryEvent) {
        self.events.lock().unwrap().push((channel, event));
    }
}
