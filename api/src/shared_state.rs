use std::sync::Arc;

use dms_db::object_id::OpPermissionId;
use dms_permissions::PermissionService;

pub struct InnerState {
    pub production: bool,
    pub db: dms_db::Pool,
    pub permissions: PermissionService,
    /// Grants access to every user's permissions. `None` restricts users to their own.
    pub admin_permission: Option<OpPermissionId>,
}

pub type State = Arc<InnerState>;
