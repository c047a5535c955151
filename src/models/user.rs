use diesel::prelude::*;

/// Represents a registered user
///
/// Users only exist to authenticate requests. Not `Serialize`: responses
/// go through `UserResponse`, which has no password hash.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    id: i32,
    username: String,
    password_hash: String,
}

/// Insertable form of a user; `password_hash` is an argon2 PHC string
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

impl User {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_username(&self) -> String {
        self.username.clone()
    }

    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl NewUser {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            username,
            password_hash,
        }
    }
}
