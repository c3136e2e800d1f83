use std::collections::{BTreeMap, BTreeSet};

use dms_db::object_id::{OpPermissionId, ProjectId, UserId};
use serde::Serialize;
use tracing::{event, instrument, Level};

use crate::{
    consolidate, consolidate_by_project,
    store::{GrantStore, Page},
    EffectivePermissionSet, GrantResolver, Result,
};

/// The effective permissions of one user in a project, as returned by the bulk report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPermissions {
    pub user_id: UserId,
    pub permissions: EffectivePermissionSet,
}

/// The read API over a grant store. Every answer is computed from a full resolution of the
/// relevant grant paths, so checks and listings always agree.
pub struct PermissionQuery<'a, S: GrantStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: GrantStore + ?Sized> PermissionQuery<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        PermissionQuery { store }
    }

    fn resolver(&mut self) -> GrantResolver<'_, S> {
        GrantResolver::new(self.store)
    }

    /// Return true if the user holds the permission in the project and, when a resource is
    /// given, the permission's scope covers it. Archived and unknown projects deny everything.
    #[instrument(level = "DEBUG", skip(self))]
    pub fn has_permission(
        &mut self,
        user_id: UserId,
        project_id: ProjectId,
        permission_id: OpPermissionId,
        resource: Option<&str>,
    ) -> Result<bool> {
        let project = self.store.project(project_id)?;
        if !project.map(|p| p.active).unwrap_or(false) {
            event!(Level::DEBUG, %project_id, "Project is inactive or unknown");
            return Ok(false);
        }

        let permissions = self.list_effective_permissions(user_id, project_id)?;
        let allowed = permissions.allows(&permission_id, resource);
        if !allowed {
            event!(Level::DEBUG, %user_id, %project_id, %permission_id, ?resource, "Permission denied");
        }

        Ok(allowed)
    }

    pub fn list_effective_permissions(
        &mut self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<EffectivePermissionSet> {
        let grants = self.resolver().resolve_grants(user_id, Some(project_id))?;
        Ok(consolidate(&grants))
    }

    /// The permissions the user holds instance-wide, through roles or permissions bound to
    /// the user itself.
    pub fn list_global_permissions(&mut self, user_id: UserId) -> Result<BTreeSet<OpPermissionId>> {
        let grants = self.resolver().resolve_global_grants(user_id)?;
        Ok(grants.into_iter().map(|g| g.permission_id).collect())
    }

    pub fn has_global_permission(
        &mut self,
        user_id: UserId,
        permission_id: OpPermissionId,
    ) -> Result<bool> {
        let permissions = self.list_global_permissions(user_id)?;
        Ok(permissions.contains(&permission_id))
    }

    pub fn list_accessible_projects(&mut self, user_id: UserId) -> Result<Vec<ProjectId>> {
        self.resolver().accessible_projects(user_id)
    }

    /// The effective set for every project the user belongs to. Projects where the user is
    /// a member but holds nothing map to an empty set.
    pub fn list_permissions_by_project(
        &mut self,
        user_id: UserId,
    ) -> Result<BTreeMap<ProjectId, EffectivePermissionSet>> {
        let projects = self.list_accessible_projects(user_id)?;
        let grants = self.resolver().resolve_grants(user_id, None)?;

        let mut by_project = consolidate_by_project(&grants);
        for project_id in projects {
            by_project.entry(project_id).or_default();
        }

        Ok(by_project)
    }

    /// The effective set of each user in the project, one page of users at a time.
    #[instrument(level = "DEBUG", skip(self))]
    pub fn bulk_list_members_permissions(
        &mut self,
        project_id: ProjectId,
        page: Page,
    ) -> Result<Vec<MemberPermissions>> {
        let user_ids = self.store.project_user_ids(project_id, page)?;

        let mut result = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            let permissions = self.list_effective_permissions(user_id, project_id)?;
            result.push(MemberPermissions {
                user_id,
                permissions,
            });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use dms_db::{
        object_id::{MemberGroupId, MemberId, RoleId},
        OpRangeType, ProjectStatus,
    };

    use super::*;
    use crate::{EffectiveScope, Error, MemoryGrantStore};

    /// A user who is a member of a project holding R1 ("view") on db1, and who is also in a
    /// group of the project holding R2 ("view", "edit") unrestricted.
    struct Scenario {
        store: MemoryGrantStore,
        user: UserId,
        project: ProjectId,
        member: MemberId,
        group: MemberGroupId,
        view: OpPermissionId,
        edit: OpPermissionId,
        r1: RoleId,
        r2: RoleId,
    }

    fn scenario() -> Scenario {
        let mut store = MemoryGrantStore::new();
        let user = store.add_user();
        let project = store.add_project(ProjectStatus::Active);
        let view = store.add_op_permission(OpRangeType::DbService);
        let edit = store.add_op_permission(OpRangeType::DbService);

        let r1 = store.add_role(&[view]);
        let member = store.add_member(user, project);
        store.bind_member_role(member, r1, OpRangeType::DbService, &["db1"]);

        let r2 = store.add_role(&[view, edit]);
        let group = store.add_group(project);
        store.add_group_user(group, user);
        store.bind_group_role(group, r2, OpRangeType::Project, &[]);

        Scenario {
            store,
            user,
            project,
            member,
            group,
            view,
            edit,
            r1,
            r2,
        }
    }

    fn ranged(uids: &[&str]) -> EffectiveScope {
        EffectiveScope::Ranged {
            range_uids: uids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn member_and_group_roles_combine() {
        let mut s = scenario();
        let set = PermissionQuery::new(&mut s.store)
            .list_effective_permissions(s.user, s.project)
            .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&s.view), Some(&EffectiveScope::Unrestricted));
        assert_eq!(set.get(&s.edit), Some(&EffectiveScope::Unrestricted));
    }

    #[test]
    fn disabling_role_removes_only_its_grants() {
        let mut s = scenario();
        s.store.set_role_enabled(s.r2, false);

        let set = PermissionQuery::new(&mut s.store)
            .list_effective_permissions(s.user, s.project)
            .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&s.view), Some(&ranged(&["db1"])));
        assert!(!set.contains(&s.edit));
    }

    #[test]
    fn leaving_group_removes_group_grants() {
        let mut s = scenario();
        s.store.remove_group_user(s.group, s.user);

        let set = PermissionQuery::new(&mut s.store)
            .list_effective_permissions(s.user, s.project)
            .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&s.view), Some(&ranged(&["db1"])));
    }

    #[test]
    fn ranges_union_across_paths() {
        let mut s = scenario();
        s.store.set_role_enabled(s.r2, false);
        let r3 = s.store.add_role(&[s.view]);
        s.store
            .bind_member_role(s.member, s.r1, OpRangeType::DbService, &["db2"]);
        s.store
            .bind_group_role(s.group, r3, OpRangeType::DbService, &["db2", "db3"]);

        let set = PermissionQuery::new(&mut s.store)
            .list_effective_permissions(s.user, s.project)
            .unwrap();
        assert_eq!(set.get(&s.view), Some(&ranged(&["db1", "db2", "db3"])));
    }

    #[test]
    fn replacing_role_permissions_applies_on_next_call() {
        let mut s = scenario();
        s.store.replace_role_permissions(s.r2, &[s.view]);

        let set = PermissionQuery::new(&mut s.store)
            .list_effective_permissions(s.user, s.project)
            .unwrap();
        assert!(!set.contains(&s.edit));
        assert_eq!(set.get(&s.view), Some(&EffectiveScope::Unrestricted));
    }

    #[test]
    fn no_membership_is_empty() {
        let mut s = scenario();
        let other = s.store.add_project(ProjectStatus::Active);

        let set = PermissionQuery::new(&mut s.store)
            .list_effective_permissions(s.user, other)
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn has_permission_with_resource() {
        let mut s = scenario();
        s.store.set_role_enabled(s.r2, false);
        let mut query = PermissionQuery::new(&mut s.store);

        assert!(query.has_permission(s.user, s.project, s.view, None).unwrap());
        assert!(query
            .has_permission(s.user, s.project, s.view, Some("db1"))
            .unwrap());
        assert!(!query
            .has_permission(s.user, s.project, s.view, Some("db9"))
            .unwrap());
        assert!(!query.has_permission(s.user, s.project, s.edit, None).unwrap());
    }

    #[test]
    fn has_permission_matches_listing() {
        let mut s = scenario();
        let mut query = PermissionQuery::new(&mut s.store);
        let set = query.list_effective_permissions(s.user, s.project).unwrap();

        for permission in [s.view, s.edit, OpPermissionId::new()] {
            for resource in [None, Some("db1"), Some("db2")] {
                assert_eq!(
                    query
                        .has_permission(s.user, s.project, permission, resource)
                        .unwrap(),
                    set.allows(&permission, resource)
                );
            }
        }
    }

    #[test]
    fn archived_project_denies_but_still_lists() {
        let mut s = scenario();
        s.store.set_project_status(s.project, ProjectStatus::Archived);
        let mut query = PermissionQuery::new(&mut s.store);

        assert!(!query.has_permission(s.user, s.project, s.view, None).unwrap());
        assert!(!query
            .has_permission(s.user, ProjectId::new(), s.view, None)
            .unwrap());
        assert_eq!(
            query
                .list_effective_permissions(s.user, s.project)
                .unwrap()
                .len(),
            2
        );
        assert_eq!(query.list_accessible_projects(s.user).unwrap(), vec![s.project]);
    }

    #[test]
    fn data_integrity_error_surfaces() {
        let mut s = scenario();
        let manage = s.store.add_op_permission(OpRangeType::Project);
        let role = s.store.add_role(&[manage]);
        s.store
            .bind_member_role(s.member, role, OpRangeType::DbService, &["db1"]);

        let mut query = PermissionQuery::new(&mut s.store);
        assert_matches!(
            query.list_effective_permissions(s.user, s.project),
            Err(Error::DataIntegrity { .. })
        );
        assert_matches!(
            query.has_permission(s.user, s.project, s.view, None),
            Err(Error::DataIntegrity { .. })
        );
    }

    #[test]
    fn global_permissions() {
        let mut s = scenario();
        let manage = s.store.add_op_permission(OpRangeType::Global);
        let admin = s.store.add_role(&[manage, s.view]);
        s.store.grant_user_role(s.user, admin);

        let mut query = PermissionQuery::new(&mut s.store);
        let global = query.list_global_permissions(s.user).unwrap();
        assert_eq!(global, BTreeSet::from([manage, s.view]));
        assert!(query.has_global_permission(s.user, manage).unwrap());
        assert!(!query.has_global_permission(s.user, s.edit).unwrap());

        // Global grants do not leak into project resolution.
        let set = query.list_effective_permissions(s.user, s.project).unwrap();
        assert!(!set.contains(&manage));
    }

    #[test]
    fn permissions_by_project() {
        let mut s = scenario();
        let second = s.store.add_project(ProjectStatus::Active);
        let member = s.store.add_member(s.user, second);
        s.store.grant_member_permission(member, s.edit);
        let third = s.store.add_project(ProjectStatus::Active);
        s.store.add_member(s.user, third);

        let by_project = PermissionQuery::new(&mut s.store)
            .list_permissions_by_project(s.user)
            .unwrap();

        assert_eq!(by_project.len(), 3);
        assert_eq!(by_project[&s.project].len(), 2);
        assert_eq!(by_project[&second].len(), 1);
        assert_eq!(
            by_project[&second].get(&s.edit),
            Some(&EffectiveScope::Unrestricted)
        );
        assert!(by_project[&third].is_empty());
    }

    #[test]
    fn bulk_list_pages_over_users() {
        let mut s = scenario();
        let other = s.store.add_user();
        s.store.add_group_user(s.group, other);
        let outsider = s.store.add_user();
        let elsewhere = s.store.add_project(ProjectStatus::Active);
        s.store.add_member(outsider, elsewhere);

        let mut query = PermissionQuery::new(&mut s.store);
        let all = query
            .bulk_list_members_permissions(s.project, Page::default())
            .unwrap();

        let mut expected_users = vec![s.user, other];
        expected_users.sort();
        assert_eq!(
            all.iter().map(|m| m.user_id).collect::<Vec<_>>(),
            expected_users
        );

        let other_entry = all.iter().find(|m| m.user_id == other).unwrap();
        assert_eq!(other_entry.permissions.len(), 2);

        let page = query
            .bulk_list_members_permissions(s.project, Page::new(1, 1))
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].user_id, expected_users[1]);
    }

    #[test]
    fn inactive_user_gets_nothing() {
        let mut s = scenario();
        s.store.set_user_active(s.user, false);
        let mut query = PermissionQuery::new(&mut s.store);

        assert!(query
            .list_effective_permissions(s.user, s.project)
            .unwrap()
            .is_empty());
        assert!(query.list_accessible_projects(s.user).unwrap().is_empty());
        assert!(!query.has_permission(s.user, s.project, s.view, None).unwrap());
    }
}
