use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{MemberGroupId, UserId},
    schema::*,
};

pub use crate::schema::member_group_users::*;

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = member_group_users)]
pub struct MemberGroupUser {
    pub member_group_id: MemberGroupId,
    pub user_id: UserId,
}
