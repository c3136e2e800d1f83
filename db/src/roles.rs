use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;

use crate::{object_id::RoleId, schema::*, Stat};

pub use crate::schema::roles::*;

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(primary_key(role_id))]
pub struct Role {
    pub role_id: RoleId,
    pub name: String,
    pub stat: Stat,
    pub updated: DateTime<Utc>,
}

impl Role {
    /// Disabled roles grant nothing, even while bindings still reference them.
    pub fn is_enabled(&self) -> bool {
        self.stat.is_enabled()
    }
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = roles)]
pub struct NewRole {
    pub role_id: RoleId,
    pub name: String,
    #[serde(default)]
    pub stat: Stat,
}
