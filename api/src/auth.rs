use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use dms_db::object_id::{OpPermissionId, ProjectId, UserId};
use dms_permissions::PermissionService;
use tracing::{event, Level};

use crate::{shared_state::State, Error};

/// Set by the authenticating gateway in front of this service.
pub const USER_ID_HEADER: &str = "x-dms-user-id";

/// How many milliseconds the caller is willing to wait. It can only shorten the configured
/// query timeout.
pub const DEADLINE_HEADER: &str = "x-dms-deadline-ms";

/// The user making the request.
#[derive(Debug, Clone, Copy)]
pub struct RequestUser {
    pub user_id: UserId,
}

pub fn extract_user_id(headers: &HeaderMap) -> Result<UserId, Error> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or(Error::Unauthenticated)?
        .to_str()
        .map_err(|_| Error::InvalidUserHeader)?;

    value
        .trim()
        .parse::<UserId>()
        .map_err(|_| Error::InvalidUserHeader)
}

pub fn extract_deadline(headers: &HeaderMap) -> Result<Option<Duration>, Error> {
    let Some(value) = headers.get(DEADLINE_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|ms| Some(Duration::from_millis(ms)))
        .ok_or(Error::InvalidDeadlineHeader)
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = extract_user_id(&parts.headers)?;
        Ok(RequestUser { user_id })
    }
}

/// The permission service for one request, bounded by the request's deadline, along with the
/// checks that decide who may read whose permissions.
#[derive(Clone)]
pub struct PermissionGuard {
    pub permissions: PermissionService,
    admin_permission: Option<OpPermissionId>,
}

impl PermissionGuard {
    pub fn new(state: &State, deadline: Option<Duration>) -> Self {
        let permissions = match deadline {
            Some(deadline) if deadline < state.permissions.timeout() => {
                state.permissions.with_deadline(deadline)
            }
            _ => state.permissions.clone(),
        };

        PermissionGuard {
            permissions,
            admin_permission: state.admin_permission,
        }
    }

    /// Allow the request if the requester is `user_id`, or holds the admin permission globally.
    pub async fn must_be_self_or_admin(
        &self,
        requester: &RequestUser,
        user_id: UserId,
    ) -> Result<(), Error> {
        if requester.user_id == user_id {
            return Ok(());
        }

        let Some(admin_permission) = self.admin_permission else {
            return Err(Error::NotSelfOrAdmin);
        };

        if self
            .permissions
            .has_global_permission(requester.user_id, admin_permission)
            .await?
        {
            Ok(())
        } else {
            event!(Level::INFO, requester=%requester.user_id, %user_id, "Denied access to another user's permissions");
            Err(Error::NotSelfOrAdmin)
        }
    }

    /// Allow the request if the requester holds the admin permission globally or in the project.
    pub async fn must_be_project_admin(
        &self,
        requester: &RequestUser,
        project_id: ProjectId,
    ) -> Result<(), Error> {
        let Some(admin_permission) = self.admin_permission else {
            return Err(Error::NotSelfOrAdmin);
        };

        let allowed = self
            .permissions
            .has_global_permission(requester.user_id, admin_permission)
            .await?
            || self
                .permissions
                .has_permission(requester.user_id, project_id, admin_permission, None)
                .await?;

        if allowed {
            Ok(())
        } else {
            event!(Level::INFO, requester=%requester.user_id, %project_id, "Denied access to project report");
            Err(Error::MissingPermission(admin_permission))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PermissionGuard
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let deadline = extract_deadline(&parts.headers)?;
        let state = parts
            .extensions
            .get::<State>()
            .ok_or_else(|| anyhow!("Shared state missing from request"))?;

        Ok(PermissionGuard::new(state, deadline))
    }
}
