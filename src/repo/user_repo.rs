use crate::db::DbPool;
use crate::models::{NewUser, User};
use crate::schema::users;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

/// Creates a new user
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `username` - The unique username
/// * `password_hash` - The already hashed password
///
/// ### Errors
///
/// Returns an error if the username is taken (UNIQUE constraint) or the
/// insert fails
#[instrument(skip(pool, password_hash), fields(username = %username))]
pub fn create_user(pool: &DbPool, username: String, password_hash: String) -> Result<User> {
    let conn = &mut pool.get()?;

    let user = diesel::insert_into(users::table)
        .values(&NewUser::new(username, password_hash))
        .returning(User::as_returning())
        .get_result(conn)?;

    info!("Created user with id: {}", user.get_id());

    Ok(user)
}

#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn get_user(pool: &DbPool, user_id: i32) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?;

    Ok(result)
}

/// Looks a user up by username, for login
#[instrument(skip(pool))]
pub fn find_user_by_username(pool: &DbPool, username: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .filter(users::username.eq(username))
        .select(User::as_select())
        .first(conn)
        .optional()?;

    if result.is_none() {
        debug!("No user with that username");
    }

    Ok(result)
}

/// Deletes a user, returning `true` if one was removed
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn delete_user(pool: &DbPool, user_id: i32) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(users::table.find(user_id)).execute(conn)?;

    Ok(deleted > 0)
}
