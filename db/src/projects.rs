use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;

use crate::{object_id::ProjectId, schema::*, ProjectStatus};

pub use crate::schema::projects::*;

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(primary_key(project_id))]
pub struct Project {
    pub project_id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub updated: DateTime<Utc>,
    pub deleted: Option<DateTime<Utc>>,
}

impl Project {
    /// Only active, undeleted projects pass permission checks.
    pub fn is_active(&self) -> bool {
        self.deleted.is_none() && self.status == ProjectStatus::Active
    }
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProject {
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub status: ProjectStatus,
}
