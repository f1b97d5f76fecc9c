use actix_web::{get, post, put, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        friend::{
            model::{FriendRequestResponse, RequestPath, RespondQuery},
            repository_pg::FriendRepositoryPg,
            schema::FriendRequestEntity,
            service::FriendService,
        },
        user::{model::UserResponse, repository_pg::UserRepositoryPg},
    },
};

pub type FriendSvc = FriendService<FriendRepositoryPg, UserRepositoryPg>;

#[post("/request/{sender_id}/{receiver_id}")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendSvc>,
    path: web::Path<RequestPath>,
) -> Result<success::Success<FriendRequestResponse>, error::Error> {
    let RequestPath { sender_id, receiver_id } = path.into_inner();
    let request = friend_service.send_request(sender_id, receiver_id).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[put("/respond/{request_id}")]
pub async fn respond_friend_request(
    friend_service: web::Data<FriendSvc>,
    request_id: web::Path<Uuid>,
    query: web::Query<RespondQuery>,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let accept = query.accept;
    let request = friend_service.respond(request_id.into_inner(), accept).await?;

    let message = if accept { "Friend request accepted" } else { "Friend request rejected" };
    Ok(success::Success::ok(Some(request)).message(message))
}

#[get("/pending/{user_id}")]
pub async fn list_pending_requests(
    friend_service: web::Data<FriendSvc>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let requests = friend_service.pending_requests(user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("/list/{user_id}")]
pub async fn list_friends(
    friend_service: web::Data<FriendSvc>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<UserResponse>>, error::Error> {
    let friends = friend_service.friends(user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}
