use crate::object_id::{OpPermissionId, ProjectId, RoleId, UserId};
use crate::op_permissions::OpPermission;
use crate::projects::NewProject;
use crate::roles::NewRole;
use crate::user_op_permissions::NewUserOpPermission;
use crate::users::NewUser;
use crate::{OpRangeType, Pool};
use anyhow::{anyhow, Result};
use deadpool_diesel::Manager;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use futures::Future;
use lazy_static::lazy_static;
use std::str::FromStr;

#[derive(Clone)]
pub struct TestDatabase {
    pub name: String,
    pub pool: Pool,
    pub url: String,
    global_connect_str: String,
}

impl TestDatabase {
    pub fn drop_db(&self) -> Result<()> {
        let mut conn = PgConnection::establish(self.global_connect_str.as_str())?;
        diesel::sql_query(&format!(r##"DROP DATABASE "{}" (FORCE)"##, self.name))
            .execute(&mut conn)?;
        Ok(())
    }
}

pub async fn run_database_test<F, R>(f: F)
where
    F: FnOnce(TestDatabase, DatabaseInfo) -> R,
    R: Future<Output = Result<(), anyhow::Error>>,
{
    let (database, info) = create_database().await.expect("Creating database");
    f(database.clone(), info).await.unwrap();
    database.drop_db().expect("Cleaning up");
}

const MIGRATIONS: EmbeddedMigrations = diesel_migrations::embed_migrations!();

pub async fn create_database() -> Result<(TestDatabase, DatabaseInfo)> {
    dotenv::dotenv().ok();
    let host = std::env::var("TEST_DATABASE_HOST")
        .or_else(|_| std::env::var("DATABASE_HOST"))
        .unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("TEST_DATABASE_PORT")
        .or_else(|_| std::env::var("DATABASE_PORT"))
        .map_err(anyhow::Error::new)
        .and_then(|val| val.parse::<u16>().map_err(|e| anyhow!(e)))
        .unwrap_or(5432);
    let user = std::env::var("TEST_DATABASE_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("TEST_DATABASE_PASSWORD").unwrap_or_else(|_| "".to_string());
    let global_test_db =
        std::env::var("TEST_DATABASE_GLOBAL_DB").unwrap_or_else(|_| "postgres".to_string());

    let base_connect = format!("postgresql://{user}:{password}@{host}:{port}");
    let global_connect = format!("{base_connect}/{global_test_db}");
    let database = format!("dms_test_{}", crate::new_uuid().simple());
    println!("Database name: {}", database);

    let mut global_conn = PgConnection::establish(global_connect.as_str())?;

    diesel::sql_query(&format!(r##"CREATE DATABASE "{}""##, database)).execute(&mut global_conn)?;
    drop(global_conn);

    let db_conn_str = format!("{base_connect}/{database}");
    let manager = Manager::new(db_conn_str.clone(), deadpool_diesel::Runtime::Tokio1);
    let pool = Pool::builder(manager).max_size(4).build()?;

    let conn = pool.get().await?;
    let db_info = conn
        .interact(|conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|e| anyhow!("Running migrations: {e}"))?;
            populate_database(conn)
        })
        .await
        .map_err(|e| anyhow!("Populating database: {e:?}"))??;

    Ok((
        TestDatabase {
            pool,
            url: db_conn_str,
            name: database,
            global_connect_str: global_connect,
        },
        db_info,
    ))
}

lazy_static! {
    static ref ADMIN_USER_ID: UserId = std::env::var("ADMIN_USER_ID")
        .ok()
        .and_then(|u| UserId::from_str(u.as_str()).ok())
        .unwrap_or_else(UserId::new);
}

/// The rows every test database starts with: an instance administrator holding the global
/// admin permission directly, one active project and an administrator role.
pub struct DatabaseInfo {
    pub admin_user_id: UserId,
    pub project_id: ProjectId,
    pub admin_role: RoleId,
    pub admin_permission: OpPermissionId,
}

fn populate_database(conn: &mut PgConnection) -> Result<DatabaseInfo, anyhow::Error> {
    let admin_user_id = *ADMIN_USER_ID;

    let project_id = ProjectId::new();
    diesel::insert_into(crate::projects::table)
        .values(NewProject {
            project_id,
            name: "Default project".to_string(),
            status: crate::ProjectStatus::Active,
        })
        .execute(conn)?;

    let admin_permission = OpPermissionId::new();
    diesel::insert_into(crate::op_permissions::table)
        .values(OpPermission {
            op_permission_id: admin_permission,
            name: "global_management".to_string(),
            range_type: OpRangeType::Global,
            description: "Manage the whole instance".to_string(),
        })
        .execute(conn)?;

    let admin_role = RoleId::new();
    diesel::insert_into(crate::roles::table)
        .values(NewRole {
            role_id: admin_role,
            name: "Administrator".to_string(),
            stat: crate::Stat::Ok,
        })
        .execute(conn)?;

    diesel::insert_into(crate::users::table)
        .values(NewUser {
            user_id: admin_user_id,
            name: "admin".to_string(),
            auth_type: crate::AuthType::Local,
            stat: crate::Stat::Ok,
        })
        .execute(conn)?;

    diesel::insert_into(crate::user_op_permissions::table)
        .values(NewUserOpPermission {
            user_id: admin_user_id,
            op_permission_id: admin_permission,
        })
        .execute(conn)?;

    Ok(DatabaseInfo {
        admin_user_id,
        project_id,
        admin_role,
        admin_permission,
    })
}

impl TestDatabase {
    /// Run some setup statements against the database.
    pub async fn setup<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut PgConnection) -> Result<(), anyhow::Error> + Send + 'static,
    {
        let conn = self.pool.get().await?;
        conn.interact(f)
            .await
            .map_err(|e| anyhow!("Running setup: {e:?}"))?
    }
}
