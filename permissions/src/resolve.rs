use std::collections::{HashMap, HashSet};

use dms_db::object_id::{MemberGroupId, MemberId, OpPermissionId, ProjectId, RoleId, UserId};
use tracing::{event, instrument, Level};

use crate::{
    store::{DirectBinding, GrantStore, Holder, Membership, RoleBinding},
    Error, GrantPath, RawGrant, Result, Scope,
};

/// Walks every grant path for a user and returns the grants unmerged.
pub struct GrantResolver<'a, S: GrantStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: GrantStore + ?Sized> GrantResolver<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        GrantResolver { store }
    }

    /// Resolve the project-scoped grant paths: member roles, group roles, member direct
    /// permissions and group direct permissions, in that order. With no project, every project
    /// the user belongs to is covered and each grant carries the project it came through.
    #[instrument(level = "DEBUG", skip(self))]
    pub fn resolve_grants(
        &mut self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<RawGrant>> {
        if !self.user_is_active(user_id)? {
            return Ok(Vec::new());
        }

        let memberships = self.store.memberships(user_id, project_id)?;
        let group_memberships = self.store.group_memberships(user_id, project_id)?;
        if memberships.is_empty() && group_memberships.is_empty() {
            event!(Level::DEBUG, "No memberships");
            return Ok(Vec::new());
        }

        let holder_projects = memberships
            .iter()
            .chain(group_memberships.iter())
            .map(|m| (m.holder, m.project_id))
            .collect::<HashMap<_, _>>();
        let member_ids = member_ids(&memberships);
        let group_ids = group_ids(&group_memberships);

        let member_roles = self.store.member_role_ranges(&member_ids)?;
        let group_roles = self.store.group_role_ranges(&group_ids)?;
        let member_direct = self.store.member_op_permissions(&member_ids)?;
        let group_direct = self.store.group_op_permissions(&group_ids)?;

        let role_ids = member_roles
            .iter()
            .chain(group_roles.iter())
            .map(|b| b.role_id)
            .collect::<Vec<_>>();
        let role_permissions = self.enabled_role_permissions(&role_ids)?;

        let mut grants = Vec::new();
        expand_role_bindings(
            &mut grants,
            &member_roles,
            GrantPath::MemberRole,
            &role_permissions,
            &holder_projects,
        );
        expand_role_bindings(
            &mut grants,
            &group_roles,
            GrantPath::MemberGroupRole,
            &role_permissions,
            &holder_projects,
        );
        expand_direct_bindings(
            &mut grants,
            &member_direct,
            GrantPath::MemberDirect,
            &holder_projects,
        );
        expand_direct_bindings(
            &mut grants,
            &group_direct,
            GrantPath::MemberGroupDirect,
            &holder_projects,
        );

        let grants = self.validate(grants)?;
        Ok(dedup(grants))
    }

    /// Resolve the grants held on the user itself: roles bound to the user and permissions
    /// bound to the user. These apply everywhere and carry no project.
    #[instrument(level = "DEBUG", skip(self))]
    pub fn resolve_global_grants(&mut self, user_id: UserId) -> Result<Vec<RawGrant>> {
        if !self.user_is_active(user_id)? {
            return Ok(Vec::new());
        }

        let role_ids = self.store.user_roles(user_id)?;
        let role_permissions = self.enabled_role_permissions(&role_ids)?;

        let mut grants = Vec::new();
        for role_id in &role_ids {
            let Some(permissions) = role_permissions.get(role_id) else {
                continue;
            };

            grants.extend(permissions.iter().map(|permission_id| RawGrant {
                permission_id: *permission_id,
                scope: Scope::Global,
                source_role_id: Some(*role_id),
                path: GrantPath::UserRole,
                project_id: None,
            }));
        }

        let direct = self.store.user_op_permissions(user_id)?;
        grants.extend(direct.into_iter().map(|permission_id| RawGrant {
            permission_id,
            scope: Scope::Global,
            source_role_id: None,
            path: GrantPath::UserDirect,
            project_id: None,
        }));

        let grants = self.validate(grants)?;
        Ok(dedup(grants))
    }

    /// The projects where the user has a member row or belongs to a member group, sorted and
    /// distinct.
    pub fn accessible_projects(&mut self, user_id: UserId) -> Result<Vec<ProjectId>> {
        if !self.user_is_active(user_id)? {
            return Ok(Vec::new());
        }

        let mut projects = self
            .store
            .memberships(user_id, None)?
            .into_iter()
            .chain(self.store.group_memberships(user_id, None)?)
            .map(|m| m.project_id)
            .collect::<Vec<_>>();
        projects.sort();
        projects.dedup();
        Ok(projects)
    }

    fn user_is_active(&mut self, user_id: UserId) -> Result<bool> {
        match self.store.user(user_id)? {
            Some(user) if user.active => Ok(true),
            Some(_) => {
                event!(Level::DEBUG, %user_id, "User is disabled or deleted");
                Ok(false)
            }
            None => {
                event!(Level::DEBUG, %user_id, "Unknown user");
                Ok(false)
            }
        }
    }

    /// Look up the permissions of every enabled role among `role_ids`. Disabled and unknown
    /// roles are absent from the result, so every path that reaches a role goes through here.
    fn enabled_role_permissions(
        &mut self,
        role_ids: &[RoleId],
    ) -> Result<HashMap<RoleId, Vec<OpPermissionId>>> {
        let mut role_ids = role_ids.to_vec();
        role_ids.sort();
        role_ids.dedup();
        if role_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let states = self.store.roles(&role_ids)?;
        let enabled = states
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.role_id)
            .collect::<Vec<_>>();

        for role_id in &role_ids {
            match states.iter().find(|r| r.role_id == *role_id) {
                None => event!(Level::WARN, %role_id, "Binding references unknown role"),
                Some(r) if !r.enabled => event!(Level::DEBUG, %role_id, "Skipping disabled role"),
                Some(_) => {}
            }
        }

        let mut result: HashMap<RoleId, Vec<OpPermissionId>> =
            enabled.iter().map(|id| (*id, Vec::new())).collect();
        if enabled.is_empty() {
            return Ok(result);
        }

        for (role_id, permission_id) in self.store.role_op_permissions(&enabled)? {
            if let Some(permissions) = result.get_mut(&role_id) {
                permissions.push(permission_id);
            }
        }

        Ok(result)
    }

    /// Check every grant's scope against the range type of its permission. Grants of unknown
    /// permissions are dropped.
    fn validate(&mut self, grants: Vec<RawGrant>) -> Result<Vec<RawGrant>> {
        if grants.is_empty() {
            return Ok(grants);
        }

        let mut ids = grants.iter().map(|g| g.permission_id).collect::<Vec<_>>();
        ids.sort();
        ids.dedup();

        let range_types = self
            .store
            .op_permissions(&ids)?
            .into_iter()
            .map(|p| (p.op_permission_id, p.range_type))
            .collect::<HashMap<_, _>>();

        let mut valid = Vec::with_capacity(grants.len());
        for grant in grants {
            let Some(range_type) = range_types.get(&grant.permission_id) else {
                event!(
                    Level::WARN,
                    permission_id=%grant.permission_id,
                    path=%grant.path,
                    "Grant references unknown permission"
                );
                continue;
            };

            let scope = grant.scope.kind();
            if !range_type.permits(scope) {
                event!(
                    Level::ERROR,
                    permission_id=%grant.permission_id,
                    %range_type,
                    %scope,
                    path=%grant.path,
                    project_id=?grant.project_id,
                    "Permission granted with a scope its range type does not allow"
                );

                return Err(Error::DataIntegrity {
                    permission: grant.permission_id,
                    range_type: *range_type,
                    scope,
                    path: grant.path,
                });
            }

            valid.push(grant);
        }

        Ok(valid)
    }
}

fn member_ids(memberships: &[Membership]) -> Vec<MemberId> {
    memberships
        .iter()
        .filter_map(|m| match m.holder {
            Holder::Member(id) => Some(id),
            Holder::Group(_) => None,
        })
        .collect()
}

fn group_ids(memberships: &[Membership]) -> Vec<MemberGroupId> {
    memberships
        .iter()
        .filter_map(|m| match m.holder {
            Holder::Group(id) => Some(id),
            Holder::Member(_) => None,
        })
        .collect()
}

fn expand_role_bindings(
    grants: &mut Vec<RawGrant>,
    bindings: &[RoleBinding],
    path: GrantPath,
    role_permissions: &HashMap<RoleId, Vec<OpPermissionId>>,
    holder_projects: &HashMap<Holder, ProjectId>,
) {
    for binding in bindings {
        let Some(permissions) = role_permissions.get(&binding.role_id) else {
            continue;
        };
        let project_id = holder_projects.get(&binding.holder).copied();
        let scope = Scope::from_range(binding.range_type, binding.range_uids.clone());

        grants.extend(permissions.iter().map(|permission_id| RawGrant {
            permission_id: *permission_id,
            scope: scope.clone(),
            source_role_id: Some(binding.role_id),
            path,
            project_id,
        }));
    }
}

fn expand_direct_bindings(
    grants: &mut Vec<RawGrant>,
    bindings: &[DirectBinding],
    path: GrantPath,
    holder_projects: &HashMap<Holder, ProjectId>,
) {
    grants.extend(bindings.iter().map(|binding| RawGrant {
        permission_id: binding.op_permission_id,
        scope: Scope::Project,
        source_role_id: None,
        path,
        project_id: holder_projects.get(&binding.holder).copied(),
    }));
}

/// Drop grants identical in permission, scope, role and project to one seen earlier. The first
/// occurrence wins, so the path recorded is the earliest one that produced the grant.
fn dedup(grants: Vec<RawGrant>) -> Vec<RawGrant> {
    let mut seen = HashSet::new();
    grants
        .into_iter()
        .filter(|g| {
            seen.insert((
                g.permission_id,
                g.scope.clone(),
                g.source_role_id,
                g.project_id,
            ))
        })
        .collect()
}
