use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{MemberGroupId, RoleId},
    schema::*,
    OpRangeType,
};

pub use crate::schema::member_group_role_op_ranges::*;

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = member_group_role_op_ranges)]
pub struct NewMemberGroupRoleOpRange {
    #[serde(default = "crate::new_uuid")]
    pub member_group_role_op_range_id: uuid::Uuid,
    pub member_group_id: MemberGroupId,
    pub role_id: RoleId,
    pub op_range_type: OpRangeType,
    #[serde(default)]
    pub range_uids: Vec<String>,
}
