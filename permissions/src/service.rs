use std::{
    collections::{BTreeMap, BTreeSet},
    time::{Duration, Instant},
};

use diesel::{PgConnection, RunQueryDsl};
use dms_db::{
    object_id::{OpPermissionId, ProjectId, UserId},
    Pool, PoolExt,
};
use tracing::{event, instrument, Level};

use crate::{
    query::{MemberPermissions, PermissionQuery},
    store::Page,
    EffectivePermissionSet, Error, Result,
};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// The permission queries over the connection pool. Each call runs in its own read-only
/// transaction, so it sees one consistent snapshot of the grant model, and is bounded by the
/// service's timeout both in the database and in the caller.
#[derive(Clone)]
pub struct PermissionService {
    pool: Pool,
    timeout: Duration,
}

impl PermissionService {
    pub fn new(pool: Pool, timeout: Duration) -> Self {
        PermissionService { pool, timeout }
    }

    /// A copy of this service that gives up after `timeout` instead.
    pub fn with_deadline(&self, timeout: Duration) -> Self {
        PermissionService {
            pool: self.pool.clone(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn read<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PermissionQuery<'_, PgConnection>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let timeout = self.timeout;
        let deadline = Instant::now() + timeout;

        let run = self.pool.read_only(move |conn: &mut PgConnection| {
            // Only what is left after waiting for the connection goes to the database.
            let millis =
                statement_timeout_millis(deadline, Instant::now()).ok_or(Error::Timeout)?;
            diesel::sql_query(format!("SET LOCAL statement_timeout = {millis}")).execute(conn)?;
            let mut query = PermissionQuery::new(conn);
            f(&mut query)
        });

        match tokio::time::timeout(timeout, run).await {
            Ok(result) => result,
            Err(_) => {
                event!(Level::WARN, ?timeout, "Permission query timed out");
                Err(Error::Timeout)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn has_permission(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        permission_id: OpPermissionId,
        resource: Option<String>,
    ) -> Result<bool> {
        self.read(move |q| {
            q.has_permission(user_id, project_id, permission_id, resource.as_deref())
        })
        .await
    }

    /// Like `has_permission`, but any error denies.
    pub async fn is_allowed(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        permission_id: OpPermissionId,
        resource: Option<String>,
    ) -> bool {
        match self
            .has_permission(user_id, project_id, permission_id, resource)
            .await
        {
            Ok(allowed) => allowed,
            Err(e) => {
                event!(
                    Level::ERROR,
                    %user_id,
                    %project_id,
                    %permission_id,
                    error = %e,
                    kind = e.error_kind(),
                    "Permission check failed, denying"
                );
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list_effective_permissions(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<EffectivePermissionSet> {
        self.read(move |q| q.list_effective_permissions(user_id, project_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_global_permissions(
        &self,
        user_id: UserId,
    ) -> Result<BTreeSet<OpPermissionId>> {
        self.read(move |q| q.list_global_permissions(user_id)).await
    }

    #[instrument(skip(self))]
    pub async fn has_global_permission(
        &self,
        user_id: UserId,
        permission_id: OpPermissionId,
    ) -> Result<bool> {
        self.read(move |q| q.has_global_permission(user_id, permission_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_accessible_projects(&self, user_id: UserId) -> Result<Vec<ProjectId>> {
        self.read(move |q| q.list_accessible_projects(user_id)).await
    }

    #[instrument(skip(self))]
    pub async fn list_permissions_by_project(
        &self,
        user_id: UserId,
    ) -> Result<BTreeMap<ProjectId, EffectivePermissionSet>> {
        self.read(move |q| q.list_permissions_by_project(user_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn bulk_list_members_permissions(
        &self,
        project_id: ProjectId,
        page: Page,
    ) -> Result<Vec<MemberPermissions>> {
        self.read(move |q| q.bulk_list_members_permissions(project_id, page))
            .await
    }
}

/// The statement timeout for a query starting at `now`, or `None` once the deadline has passed.
/// Postgres reads a zero timeout as "no limit", so the result is never below one millisecond.
fn statement_timeout_millis(deadline: Instant, now: Instant) -> Option<u128> {
    let remaining = deadline.checked_duration_since(now)?;
    if remaining.is_zero() {
        return None;
    }
    Some(remaining.as_millis().max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_timeout_shrinks_with_elapsed_time() {
        let start = Instant::now();
        let deadline = start + Duration::from_millis(500);

        assert_eq!(statement_timeout_millis(deadline, start), Some(500));
        assert_eq!(
            statement_timeout_millis(deadline, start + Duration::from_millis(450)),
            Some(50)
        );
    }

    #[test]
    fn statement_timeout_never_zero() {
        let start = Instant::now();
        let deadline = start + Duration::from_micros(200);
        assert_eq!(statement_timeout_millis(deadline, start), Some(1));
    }

    #[test]
    fn statement_timeout_after_deadline() {
        let start = Instant::now();
        let deadline = start + Duration::from_millis(10);
        assert_eq!(statement_timeout_millis(deadline, deadline), None);
        assert_eq!(
            statement_timeout_millis(deadline, deadline + Duration::from_millis(1)),
            None
        );
    }
}
