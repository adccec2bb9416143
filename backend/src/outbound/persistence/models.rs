//! Row types mapping between the `users` table and the domain entity.

use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{User, UserValidationError};

use super::schema::users;

/// One row of the `users` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub nick_name: String,
    pub age: i32,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            nick_name: user.nick_name().as_ref().to_owned(),
            age: user.age().value(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = UserValidationError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Self::try_from_parts(row.id.to_string(), row.nick_name, row.age)
    }
}
