use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;

use crate::{object_id::UserId, schema::*, AuthType, Stat};

pub use crate::schema::users::*;

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(primary_key(user_id))]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub auth_type: AuthType,
    pub stat: Stat,
    pub updated: DateTime<Utc>,
    pub deleted: Option<DateTime<Utc>>,
}

impl User {
    /// Tombstoned and disabled users hold no grants, but their rows stay readable.
    pub fn is_active(&self) -> bool {
        self.deleted.is_none() && self.stat.is_enabled()
    }
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub stat: Stat,
}
