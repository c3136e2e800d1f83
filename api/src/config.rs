use std::time::Duration;

use clap::{Args, Parser};
use dms_db::object_id::OpPermissionId;

#[derive(Debug, Args)]
pub struct DatabaseConfig {
    #[clap(long = "db", env)]
    pub database_url: String,

    /// The maximum number of pooled database connections
    #[clap(long, env, default_value_t = 16)]
    pub max_connections: usize,

    /// How long a single permission query may run, in milliseconds
    #[clap(long, env, default_value_t = 5000)]
    pub query_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

#[derive(Debug, Parser)]
pub struct Config {
    #[clap(long, env, default_value_t = String::from("127.0.0.1"))]
    pub host: String,
    #[clap(short, long, env, default_value_t = 7205)]
    pub port: u16,

    #[clap(long, env, default_value_t = String::from("production"))]
    pub env: String,

    #[clap(flatten)]
    pub database: DatabaseConfig,

    /// The permission that lets a user read the permissions of other users. Without it, users
    /// can only read their own.
    #[clap(long, env)]
    pub admin_permission: Option<OpPermissionId>,

    #[clap(long, env)]
    pub honeycomb_team: Option<String>,
    #[clap(long, env, default_value_t = String::from("dev"))]
    pub honeycomb_dataset: String,
}

impl Config {
    pub fn production(&self) -> bool {
        self.env != "development" && !cfg!(debug_assertions)
    }
}
