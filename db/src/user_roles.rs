use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{RoleId, UserId},
    schema::*,
};

pub use crate::schema::user_roles::*;

/// A role held by the user across every project.
#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = user_roles)]
pub struct UserAndRole {
    pub role_id: RoleId,
    pub user_id: UserId,
}
