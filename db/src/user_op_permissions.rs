use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{OpPermissionId, UserId},
    schema::*,
};

pub use crate::schema::user_op_permissions::*;

/// A permission held directly on the user, independent of any project.
#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = user_op_permissions)]
pub struct NewUserOpPermission {
    pub user_id: UserId,
    pub op_permission_id: OpPermissionId,
}
