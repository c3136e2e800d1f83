use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{MemberId, ProjectId, UserId},
    schema::*,
};

pub use crate::schema::members::*;

/// Binds one user to one project. There is at most one member row per (user, project).
#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = members)]
pub struct NewMember {
    pub member_id: MemberId,
    pub user_id: UserId,
    pub project_id: ProjectId,
}
