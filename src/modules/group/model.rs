use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::group::schema::GroupEntity;
use crate::modules::user::{model::UserResponse, schema::UserEntity};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupBody {
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberBody {
    pub group_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub members: Vec<UserResponse>,
}

impl GroupResponse {
    pub fn new(group: GroupEntity, members: Vec<UserEntity>) -> Self {
        GroupResponse {
            id: group.id,
            name: group.name,
            created_by: group.created_by,
            created_at: group.created_at,
            members: members.into_iter().map(UserResponse::from).collect(),
        }
    }
}
