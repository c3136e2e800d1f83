use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{OpPermissionId, RoleId},
    schema::*,
};

pub use crate::schema::role_op_permissions::*;

#[derive(Queryable, Selectable, Insertable, Deserialize, Debug, Clone)]
#[diesel(primary_key(role_id, op_permission_id))]
pub struct RoleOpPermission {
    pub role_id: RoleId,
    pub op_permission_id: OpPermissionId,
}
