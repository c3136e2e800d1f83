use dms_db::{
    object_id::{MemberGroupId, MemberId, OpPermissionId, ProjectId, RoleId, UserId},
    OpRangeType,
};
use serde::Deserialize;

use crate::Result;

/// The entity that owns a binding. Members and member groups carry the same two kinds of
/// bindings; the resolver treats them uniformly apart from the path it records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Holder {
    Member(MemberId),
    Group(MemberGroupId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub holder: Holder,
    pub project_id: ProjectId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBinding {
    pub holder: Holder,
    pub role_id: RoleId,
    pub range_type: OpRangeType,
    pub range_uids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectBinding {
    pub holder: Holder,
    pub op_permission_id: OpPermissionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserState {
    pub user_id: UserId,
    /// False for disabled or tombstoned users.
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectState {
    pub project_id: ProjectId,
    /// False for archived or deleted projects.
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleState {
    pub role_id: RoleId,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpPermissionInfo {
    pub op_permission_id: OpPermissionId,
    pub range_type: OpRangeType,
}

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 500;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// A page over distinct users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_page_size")]
    pub limit: u32,
}

impl Page {
    pub fn new(offset: u32, limit: u32) -> Self {
        Page { offset, limit }
    }

    /// The limit actually applied, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Read access to the rows of the grant model.
///
/// Lookups of unknown ids return empty results rather than errors. Every method takes
/// `&mut self` so that a `PgConnection` can implement it directly.
pub trait GrantStore {
    fn user(&mut self, user_id: UserId) -> Result<Option<UserState>>;

    fn project(&mut self, project_id: ProjectId) -> Result<Option<ProjectState>>;

    /// The user's member rows, optionally limited to one project.
    fn memberships(
        &mut self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Membership>>;

    /// The member groups the user belongs to, optionally limited to one project.
    fn group_memberships(
        &mut self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Membership>>;

    fn member_role_ranges(&mut self, member_ids: &[MemberId]) -> Result<Vec<RoleBinding>>;

    fn group_role_ranges(&mut self, group_ids: &[MemberGroupId]) -> Result<Vec<RoleBinding>>;

    fn member_op_permissions(&mut self, member_ids: &[MemberId]) -> Result<Vec<DirectBinding>>;

    fn group_op_permissions(&mut self, group_ids: &[MemberGroupId])
        -> Result<Vec<DirectBinding>>;

    /// Roles bound directly to the user, independent of any project.
    fn user_roles(&mut self, user_id: UserId) -> Result<Vec<RoleId>>;

    /// Permissions bound directly to the user, independent of any project.
    fn user_op_permissions(&mut self, user_id: UserId) -> Result<Vec<OpPermissionId>>;

    fn roles(&mut self, role_ids: &[RoleId]) -> Result<Vec<RoleState>>;

    fn role_op_permissions(&mut self, role_ids: &[RoleId])
        -> Result<Vec<(RoleId, OpPermissionId)>>;

    fn op_permissions(&mut self, ids: &[OpPermissionId]) -> Result<Vec<OpPermissionInfo>>;

    /// Distinct users with a member row or a group membership in the project, ordered by id.
    fn project_user_ids(&mut self, project_id: ProjectId, page: Page) -> Result<Vec<UserId>>;
}
