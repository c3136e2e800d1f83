use std::{borrow::Cow, fmt, str::FromStr};

use base64::{display::Base64Display, engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use diesel::{deserialize::FromSql, pg::Pg, serialize::ToSql, sql_types};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// The string prefix of each id kind, indexed by the `KIND` parameter of [`ObjectId`].
const PREFIXES: [&str; 6] = ["usr", "prj", "mbr", "mbg", "rol", "opp"];

pub type UserId = ObjectId<0>;
pub type ProjectId = ObjectId<1>;
pub type MemberId = ObjectId<2>;
pub type MemberGroupId = ObjectId<3>;
pub type RoleId = ObjectId<4>;
pub type OpPermissionId = ObjectId<5>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjectIdError {
    #[error("Expected an ID starting with {0}")]
    WrongKind(&'static str),

    #[error("Malformed ID")]
    Malformed,
}

/// The id of one row of the grant model. Stored as a UUID and written as the kind prefix
/// followed by the URL-safe base64 of the UUID, so an id of one kind never parses as another.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::Uuid)]
pub struct ObjectId<const KIND: usize>(Uuid);

impl<const KIND: usize> ObjectId<KIND> {
    /// Fails to compile for a `KIND` with no prefix.
    pub const PREFIX: &'static str = PREFIXES[KIND];

    pub fn new() -> Self {
        Self(crate::new_uuid())
    }
}

impl<const KIND: usize> Default for ObjectId<KIND> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const KIND: usize> fmt::Display for ObjectId<KIND> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = Base64Display::new(self.0.as_bytes(), &URL_SAFE_NO_PAD);
        write!(f, "{}{}", Self::PREFIX, encoded)
    }
}

impl<const KIND: usize> fmt::Debug for ObjectId<KIND> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl<const KIND: usize> FromStr for ObjectId<KIND> {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s
            .strip_prefix(Self::PREFIX)
            .ok_or(ObjectIdError::WrongKind(Self::PREFIX))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| ObjectIdError::Malformed)?;
        Uuid::from_slice(&bytes)
            .map(Self)
            .map_err(|_| ObjectIdError::Malformed)
    }
}

impl<const KIND: usize> Serialize for ObjectId<KIND> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, const KIND: usize> Deserialize<'de> for ObjectId<KIND> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = Cow::<'de, str>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl<const KIND: usize> FromSql<sql_types::Uuid, Pg> for ObjectId<KIND> {
    fn from_sql(bytes: diesel::backend::RawValue<'_, Pg>) -> diesel::deserialize::Result<Self> {
        <Uuid as FromSql<sql_types::Uuid, Pg>>::from_sql(bytes).map(Self)
    }
}

impl<const KIND: usize> ToSql<sql_types::Uuid, Pg> for ObjectId<KIND> {
    fn to_sql(&self, out: &mut diesel::serialize::Output<Pg>) -> diesel::serialize::Result {
        <Uuid as ToSql<sql_types::Uuid, Pg>>::to_sql(&self.0, &mut out.reborrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse() {
        let id = RoleId::new();
        let s = id.to_string();
        assert!(s.starts_with("rol"));
        assert_eq!(s.parse::<RoleId>(), Ok(id));
    }

    #[test]
    fn kinds_do_not_mix() {
        let project = ProjectId::new().to_string();
        assert_eq!(
            project.parse::<UserId>(),
            Err(ObjectIdError::WrongKind("usr"))
        );
    }

    #[test]
    fn malformed() {
        assert_eq!("usr!!".parse::<UserId>(), Err(ObjectIdError::Malformed));
        // Valid base64, but too short for a UUID.
        assert_eq!("usrAAAA".parse::<UserId>(), Err(ObjectIdError::Malformed));
        assert_eq!("".parse::<UserId>(), Err(ObjectIdError::WrongKind("usr")));
    }

    #[test]
    fn json_uses_string_form() {
        let id = OpPermissionId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
        assert_eq!(serde_json::from_value::<OpPermissionId>(json).unwrap(), id);

        let member = serde_json::json!(MemberId::new());
        assert!(serde_json::from_value::<OpPermissionId>(member).is_err());
    }
}
