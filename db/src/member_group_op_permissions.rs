use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{MemberGroupId, OpPermissionId},
    schema::*,
};

pub use crate::schema::member_group_op_permissions::*;

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = member_group_op_permissions)]
pub struct MemberGroupOpPermission {
    pub member_group_id: MemberGroupId,
    pub op_permission_id: OpPermissionId,
}
