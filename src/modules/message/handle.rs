use actix_web::{delete, get, post, put, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        group::repository_pg::GroupRepositoryPg,
        message::{
            model::{
                DeletedMessage, EditMessageBody, MessageResponse, PairQuery, ReadAllQuery,
                SendMessageBody,
            },
            repository_pg::MessageRepositoryPg,
            service::MessageService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type MessageSvc = MessageService<MessageRepositoryPg, UserRepositoryPg, GroupRepositoryPg>;

#[post("")]
pub async fn send_message(
    message_service: web::Data<MessageSvc>,
    body: ValidatedJson<SendMessageBody>,
) -> Result<success::Success<MessageResponse>, error::Error> {
    let message = message_service.create(body.0).await?;
    Ok(success::Success::created(Some(message)).message("Message sent"))
}

#[get("/history")]
pub async fn get_history(
    message_service: web::Data<MessageSvc>,
    query: web::Query<PairQuery>,
) -> Result<success::Success<Vec<MessageResponse>>, error::Error> {
    let messages = message_service.history_between(query.user_id, query.friend_id).await?;
    Ok(success::Success::ok(Some(messages)))
}

#[get("/group/{group_id}")]
pub async fn get_group_history(
    message_service: web::Data<MessageSvc>,
    group_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<MessageResponse>>, error::Error> {
    let messages = message_service.history_for_group(group_id.into_inner()).await?;
    Ok(success::Success::ok(Some(messages)))
}

#[put("/edit/{message_id}")]
pub async fn edit_message(
    message_service: web::Data<MessageSvc>,
    message_id: web::Path<Uuid>,
    body: ValidatedJson<EditMessageBody>,
) -> Result<success::Success<MessageResponse>, error::Error> {
    let message = message_service.edit(message_id.into_inner(), body.0.content).await?;
    Ok(success::Success::ok(Some(message)).message("Message edited"))
}

#[delete("/delete/private")]
pub async fn delete_private_history(
    message_service: web::Data<MessageSvc>,
    query: web::Query<PairQuery>,
) -> Result<success::Success<u64>, error::Error> {
    let deleted = message_service.delete_all_between(query.user_id, query.friend_id).await?;
    Ok(success::Success::ok(Some(deleted)).message("Conversation deleted"))
}

#[delete("/{message_id:[0-9a-fA-F-]{36}}")]
pub async fn delete_message(
    message_service: web::Data<MessageSvc>,
    message_id: web::Path<Uuid>,
) -> Result<success::Success<DeletedMessage>, error::Error> {
    let message_id = message_id.into_inner();
    message_service.delete(message_id).await?;
    Ok(success::Success::ok(Some(DeletedMessage { deleted: message_id })))
}

#[put("/delivered/{message_id}")]
pub async fn mark_delivered(
    message_service: web::Data<MessageSvc>,
    message_id: web::Path<Uuid>,
) -> Result<success::Success<MessageResponse>, error::Error> {
    let message = message_service.mark_delivered(message_id.into_inner()).await?;
    Ok(success::Success::ok(Some(message)))
}

#[put("/read/{message_id}")]
pub async fn mark_read(
    message_service: web::Data<MessageSvc>,
    message_id: web::Path<Uuid>,
) -> Result<success::Success<MessageResponse>, error::Error> {
    let message = message_service.mark_read(message_id.into_inner()).await?;
    Ok(success::Success::ok(Some(message)))
}

#[put("/read-all")]
pub async fn mark_all_read(
    message_service: web::Data<MessageSvc>,
    query: web::Query<ReadAllQuery>,
) -> Result<success::Success<Vec<MessageResponse>>, error::Error> {
    let messages = message_service.mark_all_read(query.user_id, query.sender_id).await?;
    Ok(success::Success::ok(Some(messages)))
}
