use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{MemberGroupId, ProjectId},
    schema::*,
};

pub use crate::schema::member_groups::*;

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = member_groups)]
pub struct NewMemberGroup {
    pub member_group_id: MemberGroupId,
    pub project_id: ProjectId,
    pub name: String,
}
