use clap::Args;
use dms_api::config::DatabaseConfig;
use dms_db::object_id::{ProjectId, UserId};
use dms_permissions::PermissionService;
use serde_json::json;

#[derive(Debug, Args)]
pub struct PermissionsArgs {
    #[clap(flatten)]
    database: DatabaseConfig,

    /// The user to look up
    user_id: UserId,

    /// Only show the permissions in this project
    #[clap(long)]
    project: Option<ProjectId>,
}

/// Print the user's global permissions, accessible projects and effective permission sets.
pub async fn run(args: PermissionsArgs) -> Result<(), anyhow::Error> {
    let db = dms_db::connect(
        args.database.database_url.as_str(),
        args.database.max_connections,
    )?;
    let service = PermissionService::new(db, args.database.query_timeout());

    let global = service.list_global_permissions(args.user_id).await?;
    let projects = match args.project {
        Some(project_id) => {
            let set = service
                .list_effective_permissions(args.user_id, project_id)
                .await?;
            json!({ (project_id.to_string()): set })
        }
        None => {
            let by_project = service.list_permissions_by_project(args.user_id).await?;
            serde_json::to_value(by_project)?
        }
    };

    let output = json!({
        "user_id": args.user_id,
        "global": global,
        "projects": projects,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
