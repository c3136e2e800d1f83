use std::collections::HashMap;

use dms_db::{
    object_id::{MemberGroupId, MemberId, OpPermissionId, ProjectId, RoleId, UserId},
    OpRangeType, ProjectStatus,
};

use crate::{
    store::{
        DirectBinding, GrantStore, Holder, Membership, OpPermissionInfo, Page, ProjectState,
        RoleBinding, RoleState, UserState,
    },
    Result,
};

/// A grant model held in memory. The builder methods generate ids and return them, so a test
/// can set up a scenario without a database.
#[derive(Debug, Default, Clone)]
pub struct MemoryGrantStore {
    users: HashMap<UserId, bool>,
    projects: HashMap<ProjectId, bool>,
    members: Vec<(MemberId, UserId, ProjectId)>,
    groups: HashMap<MemberGroupId, ProjectId>,
    group_users: Vec<(MemberGroupId, UserId)>,
    op_permissions: HashMap<OpPermissionId, OpRangeType>,
    roles: HashMap<RoleId, bool>,
    role_permissions: Vec<(RoleId, OpPermissionId)>,
    role_bindings: Vec<RoleBinding>,
    direct_bindings: Vec<DirectBinding>,
    user_roles: Vec<(UserId, RoleId)>,
    user_permissions: Vec<(UserId, OpPermissionId)>,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self) -> UserId {
        let id = UserId::new();
        self.users.insert(id, true);
        id
    }

    pub fn set_user_active(&mut self, user_id: UserId, active: bool) {
        self.users.insert(user_id, active);
    }

    pub fn add_project(&mut self, status: ProjectStatus) -> ProjectId {
        let id = ProjectId::new();
        self.set_project_status(id, status);
        id
    }

    pub fn set_project_status(&mut self, project_id: ProjectId, status: ProjectStatus) {
        self.projects
            .insert(project_id, status == ProjectStatus::Active);
    }

    pub fn add_member(&mut self, user_id: UserId, project_id: ProjectId) -> MemberId {
        if let Some((id, _, _)) = self
            .members
            .iter()
            .find(|(_, u, p)| *u == user_id && *p == project_id)
        {
            return *id;
        }

        let id = MemberId::new();
        self.members.push((id, user_id, project_id));
        id
    }

    /// Delete a member row along with its bindings.
    pub fn remove_member(&mut self, member_id: MemberId) {
        self.members.retain(|(id, _, _)| *id != member_id);
        let holder = Holder::Member(member_id);
        self.role_bindings.retain(|b| b.holder != holder);
        self.direct_bindings.retain(|b| b.holder != holder);
    }

    pub fn add_group(&mut self, project_id: ProjectId) -> MemberGroupId {
        let id = MemberGroupId::new();
        self.groups.insert(id, project_id);
        id
    }

    pub fn add_group_user(&mut self, group_id: MemberGroupId, user_id: UserId) {
        if !self.group_users.contains(&(group_id, user_id)) {
            self.group_users.push((group_id, user_id));
        }
    }

    pub fn remove_group_user(&mut self, group_id: MemberGroupId, user_id: UserId) {
        self.group_users
            .retain(|(g, u)| !(*g == group_id && *u == user_id));
    }

    pub fn add_op_permission(&mut self, range_type: OpRangeType) -> OpPermissionId {
        let id = OpPermissionId::new();
        self.op_permissions.insert(id, range_type);
        id
    }

    /// Add an enabled role holding `permissions`.
    pub fn add_role(&mut self, permissions: &[OpPermissionId]) -> RoleId {
        let id = RoleId::new();
        self.roles.insert(id, true);
        self.replace_role_permissions(id, permissions);
        id
    }

    pub fn set_role_enabled(&mut self, role_id: RoleId, enabled: bool) {
        self.roles.insert(role_id, enabled);
    }

    pub fn replace_role_permissions(&mut self, role_id: RoleId, permissions: &[OpPermissionId]) {
        self.role_permissions.retain(|(r, _)| *r != role_id);
        self.role_permissions
            .extend(permissions.iter().map(|p| (role_id, *p)));
    }

    pub fn bind_member_role(
        &mut self,
        member_id: MemberId,
        role_id: RoleId,
        range_type: OpRangeType,
        range_uids: &[&str],
    ) {
        self.bind_role(Holder::Member(member_id), role_id, range_type, range_uids);
    }

    pub fn bind_group_role(
        &mut self,
        group_id: MemberGroupId,
        role_id: RoleId,
        range_type: OpRangeType,
        range_uids: &[&str],
    ) {
        self.bind_role(Holder::Group(group_id), role_id, range_type, range_uids);
    }

    fn bind_role(
        &mut self,
        holder: Holder,
        role_id: RoleId,
        range_type: OpRangeType,
        range_uids: &[&str],
    ) {
        self.role_bindings.push(RoleBinding {
            holder,
            role_id,
            range_type,
            range_uids: range_uids.iter().map(|s| s.to_string()).collect(),
        });
    }

    pub fn grant_member_permission(&mut self, member_id: MemberId, op_permission_id: OpPermissionId) {
        self.direct_bindings.push(DirectBinding {
            holder: Holder::Member(member_id),
            op_permission_id,
        });
    }

    pub fn grant_group_permission(
        &mut self,
        group_id: MemberGroupId,
        op_permission_id: OpPermissionId,
    ) {
        self.direct_bindings.push(DirectBinding {
            holder: Holder::Group(group_id),
            op_permission_id,
        });
    }

    pub fn grant_user_role(&mut self, user_id: UserId, role_id: RoleId) {
        self.user_roles.push((user_id, role_id));
    }

    pub fn grant_user_permission(&mut self, user_id: UserId, op_permission_id: OpPermissionId) {
        self.user_permissions.push((user_id, op_permission_id));
    }

    fn bindings_for<'a, T, H>(
        rows: &'a [T],
        ids: &'a [H],
        holder: impl Fn(&T) -> Holder + 'a,
        wrap: impl Fn(H) -> Holder + 'a,
    ) -> impl Iterator<Item = &'a T> + 'a
    where
        H: Copy,
    {
        let holders = ids.iter().map(|id| wrap(*id)).collect::<Vec<_>>();
        rows.iter().filter(move |row| holders.contains(&holder(*row)))
    }
}

impl GrantStore for MemoryGrantStore {
    fn user(&mut self, user_id: UserId) -> Result<Option<UserState>> {
        Ok(self
            .users
            .get(&user_id)
            .map(|active| UserState {
                user_id,
                active: *active,
            }))
    }

    fn project(&mut self, project_id: ProjectId) -> Result<Option<ProjectState>> {
        Ok(self
            .projects
            .get(&project_id)
            .map(|active| ProjectState {
                project_id,
                active: *active,
            }))
    }

    fn memberships(
        &mut self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Membership>> {
        Ok(self
            .members
            .iter()
            .filter(|(_, u, p)| *u == user_id && project_id.map(|id| id == *p).unwrap_or(true))
            .map(|(id, _, p)| Membership {
                holder: Holder::Member(*id),
                project_id: *p,
            })
            .collect())
    }

    fn group_memberships(
        &mut self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Membership>> {
        Ok(self
            .group_users
            .iter()
            .filter(|(_, u)| *u == user_id)
            .filter_map(|(g, _)| self.groups.get(g).map(|p| (*g, *p)))
            .filter(|(_, p)| project_id.map(|id| id == *p).unwrap_or(true))
            .map(|(g, p)| Membership {
                holder: Holder::Group(g),
                project_id: p,
            })
            .collect())
    }

    fn member_role_ranges(&mut self, member_ids: &[MemberId]) -> Result<Vec<RoleBinding>> {
        Ok(
            Self::bindings_for(&self.role_bindings, member_ids, |b| b.holder, Holder::Member)
                .cloned()
                .collect(),
        )
    }

    fn group_role_ranges(&mut self, group_ids: &[MemberGroupId]) -> Result<Vec<RoleBinding>> {
        Ok(
            Self::bindings_for(&self.role_bindings, group_ids, |b| b.holder, Holder::Group)
                .cloned()
                .collect(),
        )
    }

    fn member_op_permissions(&mut self, member_ids: &[MemberId]) -> Result<Vec<DirectBinding>> {
        Ok(
            Self::bindings_for(&self.direct_bindings, member_ids, |b| b.holder, Holder::Member)
                .cloned()
                .collect(),
        )
    }

    fn group_op_permissions(
        &mut self,
        group_ids: &[MemberGroupId],
    ) -> Result<Vec<DirectBinding>> {
        Ok(
            Self::bindings_for(&self.direct_bindings, group_ids, |b| b.holder, Holder::Group)
                .cloned()
                .collect(),
        )
    }

    fn user_roles(&mut self, user_id: UserId) -> Result<Vec<RoleId>> {
        Ok(self
            .user_roles
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, r)| *r)
            .collect())
    }

    fn user_op_permissions(&mut self, user_id: UserId) -> Result<Vec<OpPermissionId>> {
        Ok(self
            .user_permissions
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, p)| *p)
            .collect())
    }

    fn roles(&mut self, role_ids: &[RoleId]) -> Result<Vec<RoleState>> {
        Ok(role_ids
            .iter()
            .filter_map(|id| {
                self.roles.get(id).map(|enabled| RoleState {
                    role_id: *id,
                    enabled: *enabled,
                })
            })
            .collect())
    }

    fn role_op_permissions(
        &mut self,
        role_ids: &[RoleId],
    ) -> Result<Vec<(RoleId, OpPermissionId)>> {
        Ok(self
            .role_permissions
            .iter()
            .filter(|(r, _)| role_ids.contains(r))
            .copied()
            .collect())
    }

    fn op_permissions(&mut self, ids: &[OpPermissionId]) -> Result<Vec<OpPermissionInfo>> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.op_permissions
                    .get(id)
                    .map(|range_type| OpPermissionInfo {
                        op_permission_id: *id,
                        range_type: *range_type,
                    })
            })
            .collect())
    }

    fn project_user_ids(&mut self, project_id: ProjectId, page: Page) -> Result<Vec<UserId>> {
        let mut users = self
            .members
            .iter()
            .filter(|(_, _, p)| *p == project_id)
            .map(|(_, u, _)| *u)
            .chain(
                self.group_users
                    .iter()
                    .filter(|(g, _)| self.groups.get(g) == Some(&project_id))
                    .map(|(_, u)| *u),
            )
            .collect::<Vec<_>>();
        users.sort();
        users.dedup();

        Ok(users
            .into_iter()
            .skip(page.offset as usize)
            .take(page.effective_limit() as usize)
            .collect())
    }
}
