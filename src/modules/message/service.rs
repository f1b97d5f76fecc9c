/// Message Service
///
/// Persists private and group messages, drives their receipts forward and hands every
/// change to the publisher once it is durable.
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::api::error;
use crate::constants::MAX_MESSAGE_LENGTH;
use crate::modules::delivery::fanout::{
    message_targets, typing_target, Channel, DeliveryEvent, Receipt,
};
use crate::modules::delivery::publisher::Publisher;
use crate::modules::delivery::status::DeliveryStatus;
use crate::modules::group::repository::GroupRepository;
use crate::modules::message::model::{
    InsertMessage, MessageResponse, Recipient, ReplySnapshot, SendMessageBody,
};
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::MessageEntity;
use crate::modules::user::repository::UserRepository;

pub struct MessageService<M, U, G>
where
    M: MessageRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    G: GroupRepository + Send + Sync,
{
    message_repo: Arc<M>,
    user_repo: Arc<U>,
    group_repo: Arc<G>,
    publisher: Arc<dyn Publisher>,
}

impl<M, U, G> MessageService<M, U, G>
where
    M: MessageRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    G: GroupRepository + Send + Sync,
{
    pub fn with_dependencies(
        message_repo: Arc<M>,
        user_repo: Arc<U>,
        group_repo: Arc<G>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        MessageService { message_repo, user_repo, group_repo, publisher }
    }

    fn check_content(content: &str) -> Result<(), error::SystemError> {
        if content.trim().is_empty() {
            return Err(error::SystemError::bad_request("Message content cannot be empty"));
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(error::SystemError::bad_request("Message content is too long"));
        }
        Ok(())
    }

    async fn require_user(
        &self,
        id: &Uuid,
        missing: &'static str,
    ) -> Result<(), error::SystemError> {
        match self.user_repo.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(error::SystemError::not_found(missing)),
        }
    }

    fn announce(&self, message: &MessageEntity, event: DeliveryEvent) {
        self.publisher.publish_all(&message_targets(message), event);
    }

    /// Receipts go back to whoever sent the message.
    fn announce_receipts(&self, sender_id: Uuid, messages: &[MessageEntity]) {
        if messages.is_empty() {
            return;
        }
        let receipts = messages.iter().map(Receipt::from).collect();
        self.publisher
            .publish(Channel::UserMessages(sender_id), DeliveryEvent::StatusChanged { receipts });
    }

    pub async fn send_private(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
        reply: ReplySnapshot,
    ) -> Result<MessageResponse, error::SystemError> {
        Self::check_content(&content)?;
        self.require_user(&sender_id, "Sender not found").await?;
        self.require_user(&receiver_id, "Receiver not found").await?;

        let message = self
            .message_repo
            .create(&InsertMessage {
                sender_id,
                recipient: Recipient::User(receiver_id),
                content,
                reply,
            })
            .await?;

        tracing::debug!("Private message {} from {} to {}", message.id, sender_id, receiver_id);
        self.announce(&message, DeliveryEvent::NewMessage { message: message.clone().into() });

        Ok(message.into())
    }

    pub async fn send_group(
        &self,
        sender_id: Uuid,
        group_id: Uuid,
        content: String,
        reply: ReplySnapshot,
    ) -> Result<MessageResponse, error::SystemError> {
        Self::check_content(&content)?;
        self.require_user(&sender_id, "Sender not found").await?;

        if self.group_repo.find_by_id(&group_id).await?.is_none() {
            return Err(error::SystemError::not_found("Group not found"));
        }
        if !self.group_repo.is_member(&group_id, &sender_id).await? {
            return Err(error::SystemError::forbidden("Sender is not a member of this group"));
        }

        let message = self
            .message_repo
            .create(&InsertMessage {
                sender_id,
                recipient: Recipient::Group(group_id),
                content,
                reply,
            })
            .await?;

        tracing::debug!("Group message {} from {} to group {}", message.id, sender_id, group_id);
        self.announce(&message, DeliveryEvent::NewMessage { message: message.clone().into() });

        Ok(message.into())
    }

    pub async fn create(
        &self,
        body: SendMessageBody,
    ) -> Result<MessageResponse, error::SystemError> {
        let reply = body.reply();
        match Recipient::from_parts(body.receiver_id, body.group_id)? {
            Recipient::User(receiver_id) => {
                self.send_private(body.sender_id, receiver_id, body.content, reply).await
            }
            Recipient::Group(group_id) => {
                self.send_group(body.sender_id, group_id, body.content, reply).await
            }
        }
    }

    pub async fn history_between(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<Vec<MessageResponse>, error::SystemError> {
        self.require_user(&user_id, "User not found").await?;
        self.require_user(&friend_id, "User not found").await?;

        let messages = self.message_repo.find_between(&user_id, &friend_id).await?;
        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    pub async fn history_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<MessageResponse>, error::SystemError> {
        if self.group_repo.find_by_id(&group_id).await?.is_none() {
            return Err(error::SystemError::not_found("Group not found"));
        }

        let messages = self.message_repo.find_by_group(&group_id).await?;
        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    pub async fn edit(
        &self,
        message_id: Uuid,
        content: String,
    ) -> Result<MessageResponse, error::SystemError> {
        Self::check_content(&content)?;

        let message = self
            .message_repo
            .update_content(&message_id, &content, Utc::now())
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        self.announce(&message, DeliveryEvent::MessageEdited { message: message.clone().into() });
        Ok(message.into())
    }

    pub async fn delete(&self, message_id: Uuid) -> Result<(), error::SystemError> {
        let message = self
            .message_repo
            .delete(&message_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        self.announce(&message, DeliveryEvent::MessageDeleted { message_id });
        Ok(())
    }

    pub async fn delete_all_between(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<u64, error::SystemError> {
        let deleted = self.message_repo.delete_between(&user_id, &friend_id).await?;
        tracing::info!("Deleted {} private messages between {} and {}", deleted, user_id, friend_id);
        Ok(deleted)
    }

    async fn advance(
        &self,
        message_id: Uuid,
        target: DeliveryStatus,
    ) -> Result<MessageResponse, error::SystemError> {
        let (message, changed) = self
            .message_repo
            .advance_status(&message_id, target, Utc::now())
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        if changed {
            self.announce_receipts(message.sender_id, std::slice::from_ref(&message));
        }
        Ok(message.into())
    }

    pub async fn mark_delivered(
        &self,
        message_id: Uuid,
    ) -> Result<MessageResponse, error::SystemError> {
        self.advance(message_id, DeliveryStatus::Delivered).await
    }

    pub async fn mark_read(&self, message_id: Uuid) -> Result<MessageResponse, error::SystemError> {
        self.advance(message_id, DeliveryStatus::Read).await
    }

    /// Reads everything `sender_id` sent to `user_id`; returns the messages that changed.
    pub async fn mark_all_read(
        &self,
        user_id: Uuid,
        sender_id: Uuid,
    ) -> Result<Vec<MessageResponse>, error::SystemError> {
        let changed = self.message_repo.mark_all_read(&user_id, &sender_id, Utc::now()).await?;
        self.announce_receipts(sender_id, &changed);
        Ok(changed.into_iter().map(MessageResponse::from).collect())
    }

    /// Typing indicators are never stored. Returns `false` when there was nowhere to send it.
    pub fn send_typing(
        &self,
        sender: &str,
        receiver_id: Option<Uuid>,
        group_id: Option<Uuid>,
        typing: bool,
    ) -> bool {
        let Some(channel) = typing_target(receiver_id, group_id) else {
            return false;
        };
        self.publisher.publish(
            channel,
            DeliveryEvent::Typing { sender: sender.to_string(), group_id, typing },
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::user::schema::UserEntity;
    use crate::test::{
        seed_user, InMemoryGroupRepository, InMemoryMessageRepository, InMemoryUserRepository,
        RecordingPublisher,
    };

    type Svc = MessageService<
        InMemoryMessageRepository,
        InMemoryUserRepository,
        InMemoryGroupRepository,
    >;

    struct Fixture {
        svc: Svc,
        users: Arc<InMemoryUserRepository>,
        groups: Arc<InMemoryGroupRepository>,
        published: Arc<RecordingPublisher>,
    }

    fn fixture() -> Fixture {
        fixture_with(InMemoryMessageRepository::default())
    }

    fn fixture_with(messages: InMemoryMessageRepository) -> Fixture {
        let users = Arc::new(InMemoryUserRepository::default());
        let groups = Arc::new(InMemoryGroupRepository::new(users.clone()));
        let published = Arc::new(RecordingPublisher::default());
        let svc = MessageService::with_dependencies(
            Arc::new(messages),
            users.clone(),
            groups.clone(),
            published.clone(),
        );
        Fixture { svc, users, groups, published }
    }

    async fn pair(f: &Fixture) -> (UserEntity, UserEntity) {
        (seed_user(&f.users, "alice").await, seed_user(&f.users, "bob").await)
    }

    async fn say(f: &Fixture, from: &UserEntity, to: &UserEntity, text: &str) -> MessageResponse {
        f.svc.send_private(from.id, to.id, text.into(), ReplySnapshot::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_private_message_lifecycle() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;

        let sent = say(&f, &alice, &bob, "hello").await;
        assert_eq!(sent.status, DeliveryStatus::Sent);
        assert!(sent.delivered_at.is_none());

        let delivered = f.svc.mark_delivered(sent.id).await.unwrap();
        assert_eq!(delivered.status, DeliveryStatus::Delivered);
        let delivered_at = delivered.delivered_at.unwrap();

        let read = f.svc.mark_read(sent.id).await.unwrap();
        assert_eq!(read.status, DeliveryStatus::Read);
        assert_eq!(read.delivered_at, Some(delivered_at));
        assert!(delivered_at <= read.read_at.unwrap());
    }

    #[tokio::test]
    async fn test_read_without_delivery_backfills() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let sent = say(&f, &alice, &bob, "hello").await;

        let read = f.svc.mark_read(sent.id).await.unwrap();
        assert!(read.delivered_at.is_some());
        assert_eq!(read.delivered_at, read.read_at);
    }

    #[tokio::test]
    async fn test_receipts_are_idempotent_and_monotonic() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let sent = say(&f, &alice, &bob, "hello").await;

        let first = f.svc.mark_delivered(sent.id).await.unwrap();
        let again = f.svc.mark_delivered(sent.id).await.unwrap();
        assert_eq!(first.delivered_at, again.delivered_at);

        let read = f.svc.mark_read(sent.id).await.unwrap();
        let read_again = f.svc.mark_read(sent.id).await.unwrap();
        assert_eq!(read.read_at, read_again.read_at);

        let still_read = f.svc.mark_delivered(sent.id).await.unwrap();
        assert_eq!(still_read.status, DeliveryStatus::Read);
        assert_eq!(still_read.read_at, read.read_at);
    }

    #[tokio::test]
    async fn test_receipt_for_unknown_message_is_not_found() {
        let f = fixture();
        let err = f.svc.mark_read(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_status_change_is_published_once() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let sent = say(&f, &alice, &bob, "hello").await;
        f.published.clear();

        f.svc.mark_delivered(sent.id).await.unwrap();
        f.svc.mark_delivered(sent.id).await.unwrap();

        let events = f.published.events();
        assert_eq!(events.len(), 1);
        let (channel, event) = &events[0];
        assert_eq!(*channel, Channel::UserMessages(alice.id));
        match event {
            DeliveryEvent::StatusChanged { receipts } => {
                assert_eq!(receipts.len(), 1);
                assert_eq!(receipts[0].message_id, sent.id);
                assert_eq!(receipts[0].status, DeliveryStatus::Delivered);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_history_is_symmetric_and_ordered() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let carol = seed_user(&f.users, "carol").await;

        let m1 = say(&f, &alice, &bob, "one").await;
        let m2 = say(&f, &bob, &alice, "two").await;
        let m3 = say(&f, &alice, &bob, "three").await;
        say(&f, &alice, &carol, "elsewhere").await;

        let ab: Vec<_> = f.svc.history_between(alice.id, bob.id).await.unwrap();
        let ba: Vec<_> = f.svc.history_between(bob.id, alice.id).await.unwrap();
        let ids = |v: &[MessageResponse]| v.iter().map(|m| m.id).collect::<Vec<_>>();

        assert_eq!(ids(&ab), vec![m1.id, m2.id, m3.id]);
        assert_eq!(ids(&ab), ids(&ba));
        assert!(ab.windows(2).all(|w| (w[0].timestamp, w[0].id) <= (w[1].timestamp, w[1].id)));
    }

    #[tokio::test]
    async fn test_history_needs_known_users() {
        let f = fixture();
        let (alice, _) = pair(&f).await;
        let err = f.svc.history_between(alice.id, Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_all_read_shares_one_timestamp() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;

        let m1 = say(&f, &alice, &bob, "one").await;
        say(&f, &alice, &bob, "two").await;
        say(&f, &alice, &bob, "three").await;
        let reply = say(&f, &bob, &alice, "from bob").await;
        f.svc.mark_delivered(m1.id).await.unwrap();
        f.published.clear();

        let read = f.svc.mark_all_read(bob.id, alice.id).await.unwrap();
        assert_eq!(read.len(), 3);
        let read_at = read[0].read_at.unwrap();
        assert!(read.iter().all(|m| m.read_at == Some(read_at)));
        assert!(read.iter().all(|m| m.delivered_at.unwrap() <= read_at));
        assert!(read.windows(2).all(|w| (w[0].timestamp, w[0].id) <= (w[1].timestamp, w[1].id)));

        // bob's own message is not part of the batch
        let history = f.svc.history_between(alice.id, bob.id).await.unwrap();
        let untouched = history.iter().find(|m| m.id == reply.id).unwrap();
        assert_eq!(untouched.status, DeliveryStatus::Sent);

        let events = f.published.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Channel::UserMessages(alice.id));

        assert!(f.svc.mark_all_read(bob.id, alice.id).await.unwrap().is_empty());
        assert_eq!(f.published.events().len(), 1);
    }

    #[tokio::test]
    async fn test_private_send_reaches_both_queues() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let sent = say(&f, &alice, &bob, "hello").await;

        let channels: Vec<_> = f.published.events().into_iter().map(|(c, _)| c).collect();
        assert_eq!(channels, vec![Channel::UserMessages(bob.id), Channel::UserMessages(alice.id)]);
        assert!(f.published.events().iter().all(|(_, e)| matches!(
            e,
            DeliveryEvent::NewMessage { message } if message.id == sent.id
        )));
    }

    #[tokio::test]
    async fn test_send_validation() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;

        let err = f
            .svc
            .send_private(alice.id, bob.id, "   ".into(), ReplySnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));

        let err = f
            .svc
            .send_private(alice.id, Uuid::now_v7(), "hi".into(), ReplySnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
        assert!(f.published.events().is_empty());
    }

    #[tokio::test]
    async fn test_reply_snapshot_is_kept_verbatim() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let original = say(&f, &alice, &bob, "original").await;

        let reply = ReplySnapshot {
            reply_to_id: Some(original.id),
            preview: Some("a preview that no longer matches".into()),
            sender_name: Some("someone else".into()),
        };
        let sent = f.svc.send_private(bob.id, alice.id, "re".into(), reply).await.unwrap();
        f.svc.edit(original.id, "changed".into()).await.unwrap();

        let history = f.svc.history_between(alice.id, bob.id).await.unwrap();
        let stored = history.iter().find(|m| m.id == sent.id).unwrap();
        assert_eq!(stored.reply_to_id, Some(original.id));
        assert_eq!(stored.reply_preview.as_deref(), Some("a preview that no longer matches"));
        assert_eq!(stored.reply_sender_name.as_deref(), Some("someone else"));
    }

    #[tokio::test]
    async fn test_history_breaks_timestamp_ties_by_id() {
        let f = fixture_with(InMemoryMessageRepository::frozen_at(Utc::now()));
        let (alice, bob) = pair(&f).await;
        let group = f.groups.create("team", &alice.id).await.unwrap().id;
        f.groups.add_member(&group, &bob.id).await.unwrap();

        let mut private = Vec::new();
        let mut shared = Vec::new();
        for i in 0..4 {
            let (from, to) = if i % 2 == 0 { (&alice, &bob) } else { (&bob, &alice) };
            private.push(say(&f, from, to, "same instant").await.id);
            let sent = f
                .svc
                .send_group(from.id, group, "same instant".into(), ReplySnapshot::default())
                .await
                .unwrap();
            shared.push(sent.id);
        }
        private.sort();
        shared.sort();

        let ids = |v: Vec<MessageResponse>| v.into_iter().map(|m| m.id).collect::<Vec<_>>();
        let ab = f.svc.history_between(alice.id, bob.id).await.unwrap();
        assert!(ab.iter().all(|m| m.timestamp == ab[0].timestamp));
        assert_eq!(ids(ab), private);
        assert_eq!(ids(f.svc.history_between(bob.id, alice.id).await.unwrap()), private);
        assert_eq!(ids(f.svc.history_for_group(group).await.unwrap()), shared);
    }

    #[tokio::test]
    async fn test_oversized_content_is_rejected_on_every_path() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let group = f.groups.create("team", &alice.id).await.unwrap().id;
        let too_long = "x".repeat(MAX_MESSAGE_LENGTH + 1);

        let err = f
            .svc
            .send_private(alice.id, bob.id, too_long.clone(), ReplySnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));

        let err = f
            .svc
            .send_group(alice.id, group, too_long.clone(), ReplySnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));

        let sent = say(&f, &alice, &bob, "short").await;
        let err = f.svc.edit(sent.id, too_long).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));

        let at_limit = "é".repeat(MAX_MESSAGE_LENGTH);
        f.svc.send_private(alice.id, bob.id, at_limit, ReplySnapshot::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_group_messages_stay_out_of_private_history() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let group = f.groups.create("team", &alice.id).await.unwrap().id;
        f.groups.add_member(&group, &bob.id).await.unwrap();
        f.published.clear();

        let sent = f
            .svc
            .send_group(alice.id, group, "hi team".into(), ReplySnapshot::default())
            .await
            .unwrap();
        assert_eq!(sent.group_id, Some(group));
        assert_eq!(sent.receiver_id, None);

        let group_history = f.svc.history_for_group(group).await.unwrap();
        assert_eq!(group_history.len(), 1);
        assert!(f.svc.history_between(alice.id, bob.id).await.unwrap().is_empty());

        let channels: Vec<_> = f.published.events().into_iter().map(|(c, _)| c).collect();
        assert_eq!(channels, vec![Channel::Group(group)]);
    }

    #[tokio::test]
    async fn test_group_send_requires_membership() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let group = f.groups.create("team", &alice.id).await.unwrap().id;

        let err = f
            .svc
            .send_group(bob.id, group, "let me in".into(), ReplySnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let err = f
            .svc
            .send_group(alice.id, Uuid::now_v7(), "hi".into(), ReplySnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));

        let err = f.svc.history_for_group(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_dispatches_on_recipient() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;

        let body = SendMessageBody {
            sender_id: alice.id,
            receiver_id: Some(bob.id),
            group_id: None,
            content: "rest".into(),
            reply_to_id: None,
            reply_preview: None,
            reply_sender_name: None,
        };
        let sent = f.svc.create(body.clone()).await.unwrap();
        assert_eq!(sent.receiver_id, Some(bob.id));

        let both = SendMessageBody { group_id: Some(Uuid::now_v7()), ..body };
        assert!(matches!(f.svc.create(both).await.unwrap_err(), error::SystemError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_edit_keeps_receipts() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let sent = say(&f, &alice, &bob, "helo").await;
        f.svc.mark_delivered(sent.id).await.unwrap();
        f.published.clear();

        let edited = f.svc.edit(sent.id, "hello".into()).await.unwrap();
        assert!(edited.edited);
        assert!(edited.edited_at.is_some());
        assert_eq!(edited.content, "hello");
        assert_eq!(edited.status, DeliveryStatus::Delivered);
        assert_eq!(edited.timestamp, sent.timestamp);

        assert_eq!(f.published.events().len(), 2);
        assert!(matches!(f.published.events()[0].1, DeliveryEvent::MessageEdited { .. }));

        let err = f.svc.edit(Uuid::now_v7(), "x".into()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_single_and_pair_history() {
        let f = fixture();
        let (alice, bob) = pair(&f).await;
        let carol = seed_user(&f.users, "carol").await;

        let m1 = say(&f, &alice, &bob, "one").await;
        say(&f, &bob, &alice, "two").await;
        let unrelated = say(&f, &alice, &carol, "keep me").await;

        f.svc.delete(m1.id).await.unwrap();
        assert!(matches!(f.svc.delete(m1.id).await.unwrap_err(), error::SystemError::NotFound(_)));
        assert_eq!(f.svc.history_between(alice.id, bob.id).await.unwrap().len(), 1);

        assert_eq!(f.svc.delete_all_between(bob.id, alice.id).await.unwrap(), 1);
        assert!(f.svc.history_between(alice.id, bob.id).await.unwrap().is_empty());
        assert_eq!(f.svc.delete_all_between(bob.id, alice.id).await.unwrap(), 0);

        let kept = f.svc.history_between(alice.id, carol.id).await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, unrelated.id);
    }

    #[test]
    fn test_typing_routing() {
        let f = fixture();
        let receiver = Uuid::now_v7();
        let group = Uuid::now_v7();

        assert!(f.svc.send_typing("alice", Some(receiver), None, true));
        assert!(f.svc.send_typing("alice", Some(receiver), Some(group), false));
        assert!(!f.svc.send_typing("alice", None, None, true));

        let events = f.published.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, Channel::UserTyping(receiver));
        assert_eq!(events[1].0, Channel::GroupTyping(group));
        assert!(matches!(
            &events[1].1,
            DeliveryEvent::Typing { sender, typing: false, .. } if sender == "alice"
        ));
    }
}
