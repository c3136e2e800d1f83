use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum)]
#[ExistingTypePath = "crate::schema::sql_types::AuthType"]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    Local,
    Ldap,
    #[db_rename = "oauth2"]
    #[serde(rename = "oauth2")]
    OAuth2,
}

impl Default for AuthType {
    fn default() -> Self {
        Self::Local
    }
}

/// Enabled state shared by users and roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum)]
#[ExistingTypePath = "crate::schema::sql_types::Stat"]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Ok,
    Disabled,
}

impl Default for Stat {
    fn default() -> Self {
        Self::Ok
    }
}

impl Stat {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum)]
#[ExistingTypePath = "crate::schema::sql_types::ProjectStatus"]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Archived,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// The kind of range an operation applies to. On an `op_permissions` row this declares which
/// scopes are meaningful for the permission; on a role binding it is the scope of the grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, DbEnum)]
#[ExistingTypePath = "crate::schema::sql_types::OpRangeType"]
#[serde(rename_all = "snake_case")]
pub enum OpRangeType {
    Global,
    Project,
    DbService,
}

impl std::fmt::Display for OpRangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let desc = match self {
            Self::Global => "global",
            Self::Project => "project",
            Self::DbService => "db_service",
        };

        f.write_str(desc)
    }
}

impl OpRangeType {
    /** Return true if a permission declared with this range type may be granted with a scope
     * of kind `scope`. */
    pub fn permits(&self, scope: OpRangeType) -> bool {
        match self {
            Self::Global => scope == Self::Global,
            Self::Project => matches!(scope, Self::Global | Self::Project),
            Self::DbService => true,
        }
    }
}
