use std::fmt::Display;

use dms_db::{
    object_id::{OpPermissionId, ProjectId, RoleId},
    OpRangeType,
};
use serde::Serialize;

/// The route through the grant model that produced a grant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantPath {
    MemberRole,
    MemberGroupRole,
    MemberDirect,
    MemberGroupDirect,
    UserRole,
    UserDirect,
}

impl GrantPath {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GrantPath::MemberRole => "member_role",
            GrantPath::MemberGroupRole => "member_group_role",
            GrantPath::MemberDirect => "member_direct",
            GrantPath::MemberGroupDirect => "member_group_direct",
            GrantPath::UserRole => "user_role",
            GrantPath::UserDirect => "user_direct",
        }
    }
}

impl Display for GrantPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scope of a single grant, before consolidation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// Instance-wide.
    Global,
    /// The whole owning project.
    Project,
    /// Only the listed resources. An empty list grants nothing.
    Resources { range_uids: Vec<String> },
}

impl Scope {
    /// Normalize a stored range. Range UIDs only carry meaning for resource ranges and are
    /// dropped for the other kinds.
    pub fn from_range(range_type: OpRangeType, range_uids: Vec<String>) -> Self {
        match range_type {
            OpRangeType::Global => Scope::Global,
            OpRangeType::Project => Scope::Project,
            OpRangeType::DbService => Scope::Resources { range_uids },
        }
    }

    pub fn kind(&self) -> OpRangeType {
        match self {
            Scope::Global => OpRangeType::Global,
            Scope::Project => OpRangeType::Project,
            Scope::Resources { .. } => OpRangeType::DbService,
        }
    }
}

/// One grant as found on one path, unmerged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawGrant {
    pub permission_id: OpPermissionId,
    pub scope: Scope,
    pub source_role_id: Option<RoleId>,
    pub path: GrantPath,
    /// The project the grant came through. `None` for global grants.
    pub project_id: Option<ProjectId>,
}
