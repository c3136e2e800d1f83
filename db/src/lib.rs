#[macro_use]
extern crate diesel;

mod enums;
mod schema;

pub mod member_group_op_permissions;
pub mod member_group_role_op_ranges;
pub mod member_group_users;
pub mod member_groups;
pub mod member_op_permissions;
pub mod member_role_op_ranges;
pub mod members;
pub mod object_id;
pub mod op_permissions;
pub mod projects;
pub mod role_op_permissions;
pub mod roles;
pub mod test;
pub mod user_op_permissions;
pub mod user_roles;
pub mod users;

pub use enums::*;

use async_trait::async_trait;
use diesel::{Connection, PgConnection};

pub type Pool = deadpool_diesel::postgres::Pool;

pub fn connect(conn_str: &str, max_connections: usize) -> Result<Pool, impl std::error::Error> {
    let manager =
        deadpool_diesel::postgres::Manager::new(conn_str, deadpool_diesel::Runtime::Tokio1);
    deadpool_diesel::Pool::builder(manager)
        .max_size(max_connections)
        .build()
}

pub fn new_uuid() -> uuid::Uuid {
    ulid::Ulid::new().into()
}

#[async_trait]
pub trait PoolExt<F, RETVAL, ERR>
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: Send + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR>;
    async fn transaction(&self, f: F) -> Result<RETVAL, ERR>;
    /// Run `f` inside a read-only, repeatable-read transaction so that every query
    /// it makes sees the same committed snapshot.
    async fn read_only(&self, f: F) -> Result<RETVAL, ERR>;
}

#[async_trait]
impl<F, RETVAL, ERR> PoolExt<F, RETVAL, ERR> for Pool
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: From<diesel::result::Error>
        + From<deadpool_diesel::PoolError>
        + From<deadpool_diesel::InteractError>
        + Send
        + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await?;
        conn.interact(move |conn| f(conn)).await?
    }

    async fn transaction(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await?;
        conn.interact(move |conn| conn.transaction(move |conn| f(conn)))
            .await?
    }

    async fn read_only(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await?;
        conn.interact(move |conn| {
            conn.build_transaction()
                .read_only()
                .repeatable_read()
                .run(move |conn| f(conn))
        })
        .await?
    }
}
