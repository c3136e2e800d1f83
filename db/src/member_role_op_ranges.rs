use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{MemberId, RoleId},
    schema::*,
    OpRangeType,
};

pub use crate::schema::member_role_op_ranges::*;

/// Grants a role to a member, restricted to the given range.
#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = member_role_op_ranges)]
pub struct NewMemberRoleOpRange {
    #[serde(default = "crate::new_uuid")]
    pub member_role_op_range_id: uuid::Uuid,
    pub member_id: MemberId,
    pub role_id: RoleId,
    pub op_range_type: OpRangeType,
    #[serde(default)]
    pub range_uids: Vec<String>,
}
