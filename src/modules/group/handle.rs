use actix_web::{delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        group::{
            model::{AddMemberBody, CreateGroupBody, GroupResponse},
            repository_pg::GroupRepositoryPg,
            service::GroupService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type GroupSvc = GroupService<GroupRepositoryPg, UserRepositoryPg>;

#[post("/create")]
pub async fn create_group(
    group_service: web::Data<GroupSvc>,
    body: ValidatedJson<CreateGroupBody>,
) -> Result<success::Success<GroupResponse>, error::Error> {
    let body = body.0;
    let group = group_service.create_group(&body.name, body.created_by).await?;
    Ok(success::Success::created(Some(group)).message("Group created successfully"))
}

#[post("/add-member")]
pub async fn add_member(
    group_service: web::Data<GroupSvc>,
    body: ValidatedJson<AddMemberBody>,
) -> Result<success::Success<GroupResponse>, error::Error> {
    let group = group_service.add_member(body.0.group_id, body.0.user_id).await?;
    Ok(success::Success::ok(Some(group)).message("Member added successfully"))
}

#[get("/list/{user_id}")]
pub async fn list_groups(
    group_service: web::Data<GroupSvc>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<GroupResponse>>, error::Error> {
    let groups = group_service.groups_for(user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(groups)).message("Groups retrieved successfully"))
}

#[delete("/{group_id}")]
pub async fn delete_group(
    group_service: web::Data<GroupSvc>,
    group_id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    group_service.delete_group(group_id.into_inner()).await?;
    Ok(success::Success::no_content())
}
