use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{MemberId, OpPermissionId},
    schema::*,
};

pub use crate::schema::member_op_permissions::*;

/// A permission granted to a member over the whole project, bypassing roles.
#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = member_op_permissions)]
pub struct MemberOpPermission {
    pub member_id: MemberId,
    pub op_permission_id: OpPermissionId,
}
