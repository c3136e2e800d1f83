use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use dms_db::object_id::{OpPermissionId, ProjectId, UserId};
use dms_permissions::Page;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{PermissionGuard, RequestUser},
    Error,
};

#[derive(Deserialize)]
struct UserProjectPath {
    user_id: UserId,
    project_id: ProjectId,
}

#[derive(Deserialize)]
struct PermissionCheckPath {
    user_id: UserId,
    project_id: ProjectId,
    op_permission_id: OpPermissionId,
}

#[derive(Deserialize)]
struct PermissionCheckQuery {
    resource: Option<String>,
}

#[derive(Serialize)]
struct PermissionCheckResponse {
    allowed: bool,
}

async fn list_global_permissions(
    guard: PermissionGuard,
    requester: RequestUser,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, Error> {
    guard.must_be_self_or_admin(&requester, user_id).await?;

    let permissions = guard.permissions.list_global_permissions(user_id).await?;
    Ok((StatusCode::OK, Json(permissions)))
}

async fn list_accessible_projects(
    guard: PermissionGuard,
    requester: RequestUser,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, Error> {
    guard.must_be_self_or_admin(&requester, user_id).await?;

    let projects = guard.permissions.list_accessible_projects(user_id).await?;
    Ok((StatusCode::OK, Json(projects)))
}

async fn list_project_permissions(
    guard: PermissionGuard,
    requester: RequestUser,
    Path(path): Path<UserProjectPath>,
) -> Result<impl IntoResponse, Error> {
    guard.must_be_self_or_admin(&requester, path.user_id).await?;

    let permissions = guard
        .permissions
        .list_effective_permissions(path.user_id, path.project_id)
        .await?;
    Ok((StatusCode::OK, Json(permissions)))
}

async fn check_permission(
    guard: PermissionGuard,
    requester: RequestUser,
    Path(path): Path<PermissionCheckPath>,
    Query(query): Query<PermissionCheckQuery>,
) -> Result<impl IntoResponse, Error> {
    guard.must_be_self_or_admin(&requester, path.user_id).await?;

    let allowed = guard
        .permissions
        .has_permission(
            path.user_id,
            path.project_id,
            path.op_permission_id,
            query.resource,
        )
        .await?;
    Ok((StatusCode::OK, Json(PermissionCheckResponse { allowed })))
}

async fn list_member_permissions(
    guard: PermissionGuard,
    requester: RequestUser,
    Path(project_id): Path<ProjectId>,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, Error> {
    guard.must_be_project_admin(&requester, project_id).await?;

    let report = guard
        .permissions
        .bulk_list_members_permissions(project_id, page)
        .await?;
    Ok((StatusCode::OK, Json(report)))
}

pub fn configure() -> Router {
    let user_routes = Router::new()
        .route("/permissions", get(list_global_permissions))
        .route("/projects", get(list_accessible_projects))
        .route(
            "/projects/:project_id/permissions",
            get(list_project_permissions),
        )
        .route(
            "/projects/:project_id/permissions/:op_permission_id",
            get(check_permission),
        );

    Router::new()
        .nest("/users/:user_id", user_routes)
        .route(
            "/projects/:project_id/member_permissions",
            get(list_member_permissions),
        )
}
