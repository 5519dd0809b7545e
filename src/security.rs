//! Password hashing for the authentication lookup.
//!
//! Stored passwords are `hex(sha256(salt || password))`. The same function is
//! registered on every connection as `dal_password_hash(salt, password)` so a
//! credential check is a single query.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Name of the SQL scalar function registered on every connection.
pub const PASSWORD_HASH_FUNCTION: &str = "dal_password_hash";

/// Hashes `password` with `salt` into a lowercase hex string.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// A fresh random salt.
pub fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Registers `dal_password_hash(salt, password)` on `connection`.
///
/// NULL arguments yield NULL so a missing salt never matches.
pub fn register_functions(connection: &Connection) -> rusqlite::Result<()> {
    connection.create_scalar_function(
        PASSWORD_HASH_FUNCTION,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let salt = ctx.get::<Option<String>>(0)?;
            let password = ctx.get::<Option<String>>(1)?;
            Ok(match (salt, password) {
                (Some(salt), Some(password)) => Some(hash_password(&salt, &password)),
                _ => None,
            })
        },
    )
}
