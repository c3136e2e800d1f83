use diesel::{prelude::*, sql_types};
use dms_db::{
    object_id::{MemberGroupId, MemberId, OpPermissionId, ProjectId, RoleId, UserId},
    projects::Project,
    roles::Role,
    users::User,
    OpRangeType,
};

use crate::{
    store::{
        DirectBinding, GrantStore, Holder, Membership, OpPermissionInfo, Page, ProjectState,
        RoleBinding, RoleState, UserState,
    },
    Result,
};

#[derive(QueryableByName)]
struct ProjectUserRow {
    #[diesel(sql_type = sql_types::Uuid)]
    user_id: UserId,
}

const PROJECT_USERS_QUERY: &str = r##"
    SELECT user_id FROM (
        SELECT user_id FROM members WHERE project_id = $1
        UNION
        SELECT mgu.user_id
        FROM member_group_users mgu
        JOIN member_groups mg USING (member_group_id)
        WHERE mg.project_id = $1
    ) project_users
    ORDER BY user_id
    LIMIT $2 OFFSET $3
"##;

impl GrantStore for PgConnection {
    fn user(&mut self, user_id: UserId) -> Result<Option<UserState>> {
        let user = dms_db::users::table
            .find(user_id)
            .select(User::as_select())
            .first(self)
            .optional()?;

        Ok(user.map(|u| UserState {
            user_id: u.user_id,
            active: u.is_active(),
        }))
    }

    fn project(&mut self, project_id: ProjectId) -> Result<Option<ProjectState>> {
        let project = dms_db::projects::table
            .find(project_id)
            .select(Project::as_select())
            .first(self)
            .optional()?;

        Ok(project.map(|p| ProjectState {
            project_id: p.project_id,
            active: p.is_active(),
        }))
    }

    fn memberships(
        &mut self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Membership>> {
        use dms_db::members::dsl;

        let mut q = dsl::members
            .select((dsl::member_id, dsl::project_id))
            .filter(dsl::user_id.eq(user_id))
            .into_boxed();
        if let Some(project_id) = project_id {
            q = q.filter(dsl::project_id.eq(project_id));
        }

        let rows = q
            .order(dsl::project_id)
            .load::<(MemberId, ProjectId)>(self)?;

        Ok(rows
            .into_iter()
            .map(|(member_id, project_id)| Membership {
                holder: Holder::Member(member_id),
                project_id,
            })
            .collect())
    }

    fn group_memberships(
        &mut self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Membership>> {
        use dms_db::{member_group_users as mgu, member_groups as mg};

        let mut q = mgu::table
            .inner_join(mg::table)
            .select((mg::member_group_id, mg::project_id))
            .filter(mgu::user_id.eq(user_id))
            .into_boxed();
        if let Some(project_id) = project_id {
            q = q.filter(mg::project_id.eq(project_id));
        }

        let rows = q
            .order((mg::project_id, mg::member_group_id))
            .load::<(MemberGroupId, ProjectId)>(self)?;

        Ok(rows
            .into_iter()
            .map(|(group_id, project_id)| Membership {
                holder: Holder::Group(group_id),
                project_id,
            })
            .collect())
    }

    fn member_role_ranges(&mut self, member_ids: &[MemberId]) -> Result<Vec<RoleBinding>> {
        use dms_db::member_role_op_ranges::dsl;

        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = dsl::member_role_op_ranges
            .select((
                dsl::member_id,
                dsl::role_id,
                dsl::op_range_type,
                dsl::range_uids,
            ))
            .filter(dsl::member_id.eq_any(member_ids.to_vec()))
            .order((dsl::created, dsl::member_role_op_range_id))
            .load::<(MemberId, RoleId, OpRangeType, Vec<String>)>(self)?;

        Ok(rows
            .into_iter()
            .map(|(member_id, role_id, range_type, range_uids)| RoleBinding {
                holder: Holder::Member(member_id),
                role_id,
                range_type,
                range_uids,
            })
            .collect())
    }

    fn group_role_ranges(&mut self, group_ids: &[MemberGroupId]) -> Result<Vec<RoleBinding>> {
        use dms_db::member_group_role_op_ranges::dsl;

        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = dsl::member_group_role_op_ranges
            .select((
                dsl::member_group_id,
                dsl::role_id,
                dsl::op_range_type,
                dsl::range_uids,
            ))
            .filter(dsl::member_group_id.eq_any(group_ids.to_vec()))
            .order((dsl::created, dsl::member_group_role_op_range_id))
            .load::<(MemberGroupId, RoleId, OpRangeType, Vec<String>)>(self)?;

        Ok(rows
            .into_iter()
            .map(|(group_id, role_id, range_type, range_uids)| RoleBinding {
                holder: Holder::Group(group_id),
                role_id,
                range_type,
                range_uids,
            })
            .collect())
    }

    fn member_op_permissions(&mut self, member_ids: &[MemberId]) -> Result<Vec<DirectBinding>> {
        use dms_db::member_op_permissions::dsl;

        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = dsl::member_op_permissions
            .select((dsl::member_id, dsl::op_permission_id))
            .filter(dsl::member_id.eq_any(member_ids.to_vec()))
            .order((dsl::created, dsl::op_permission_id))
            .load::<(MemberId, OpPermissionId)>(self)?;

        Ok(rows
            .into_iter()
            .map(|(member_id, op_permission_id)| DirectBinding {
                holder: Holder::Member(member_id),
                op_permission_id,
            })
            .collect())
    }

    fn group_op_permissions(
        &mut self,
        group_ids: &[MemberGroupId],
    ) -> Result<Vec<DirectBinding>> {
        use dms_db::member_group_op_permissions::dsl;

        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = dsl::member_group_op_permissions
            .select((dsl::member_group_id, dsl::op_permission_id))
            .filter(dsl::member_group_id.eq_any(group_ids.to_vec()))
            .order((dsl::created, dsl::op_permission_id))
            .load::<(MemberGroupId, OpPermissionId)>(self)?;

        Ok(rows
            .into_iter()
            .map(|(group_id, op_permission_id)| DirectBinding {
                holder: Holder::Group(group_id),
                op_permission_id,
            })
            .collect())
    }

    fn user_roles(&mut self, user_id: UserId) -> Result<Vec<RoleId>> {
        use dms_db::user_roles::dsl;

        let rows = dsl::user_roles
            .select(dsl::role_id)
            .filter(dsl::user_id.eq(user_id))
            .order((dsl::added, dsl::role_id))
            .load::<RoleId>(self)?;
        Ok(rows)
    }

    fn user_op_permissions(&mut self, user_id: UserId) -> Result<Vec<OpPermissionId>> {
        use dms_db::user_op_permissions::dsl;

        let rows = dsl::user_op_permissions
            .select(dsl::op_permission_id)
            .filter(dsl::user_id.eq(user_id))
            .order((dsl::added, dsl::op_permission_id))
            .load::<OpPermissionId>(self)?;
        Ok(rows)
    }

    fn roles(&mut self, role_ids: &[RoleId]) -> Result<Vec<RoleState>> {
        use dms_db::roles::dsl;

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = dsl::roles
            .select(Role::as_select())
            .filter(dsl::role_id.eq_any(role_ids.to_vec()))
            .load::<Role>(self)?;

        Ok(rows
            .iter()
            .map(|role| RoleState {
                role_id: role.role_id,
                enabled: role.is_enabled(),
            })
            .collect())
    }

    fn role_op_permissions(
        &mut self,
        role_ids: &[RoleId],
    ) -> Result<Vec<(RoleId, OpPermissionId)>> {
        use dms_db::role_op_permissions::dsl;

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = dsl::role_op_permissions
            .select((dsl::role_id, dsl::op_permission_id))
            .filter(dsl::role_id.eq_any(role_ids.to_vec()))
            .order((dsl::role_id, dsl::op_permission_id))
            .load::<(RoleId, OpPermissionId)>(self)?;
        Ok(rows)
    }

    fn op_permissions(&mut self, ids: &[OpPermissionId]) -> Result<Vec<OpPermissionInfo>> {
        use dms_db::op_permissions::dsl;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = dsl::op_permissions
            .select((dsl::op_permission_id, dsl::range_type))
            .filter(dsl::op_permission_id.eq_any(ids.to_vec()))
            .load::<(OpPermissionId, OpRangeType)>(self)?;

        Ok(rows
            .into_iter()
            .map(|(op_permission_id, range_type)| OpPermissionInfo {
                op_permission_id,
                range_type,
            })
            .collect())
    }

    fn project_user_ids(&mut self, project_id: ProjectId, page: Page) -> Result<Vec<UserId>> {
        let rows = diesel::sql_query(PROJECT_USERS_QUERY)
            .bind::<sql_types::Uuid, _>(project_id)
            .bind::<sql_types::BigInt, _>(i64::from(page.effective_limit()))
            .bind::<sql_types::BigInt, _>(i64::from(page.offset))
            .load::<ProjectUserRow>(self)?;

        Ok(rows.into_iter().map(|r| r.user_id).collect())
    }
}
