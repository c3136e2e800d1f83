use diesel::prelude::*;
use serde::Deserialize;

use crate::{object_id::OpPermissionId, schema::*, OpRangeType};

pub use crate::schema::op_permissions::*;

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, Insertable, Deserialize)]
#[diesel(primary_key(op_permission_id))]
pub struct OpPermission {
    pub op_permission_id: OpPermissionId,
    pub name: String,
    pub range_type: OpRangeType,
    #[serde(default)]
    pub description: String,
}
