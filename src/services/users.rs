use crate::models::{NewUser, User};
use crate::{Database, ModelError};
use anyhow::Result;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USERNAME_LENGTH: usize = 150;
const MAX_EMAIL_LENGTH: usize = 254;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_staff, created_at";

fn invalid(message: impl Into<String>) -> anyhow::Error {
    ModelError::Validation(message.into()).into()
}

fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(invalid("Username cannot be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(invalid(format!(
            "Username must be {} characters or less",
            MAX_USERNAME_LENGTH
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@' | '+'))
    {
        return Err(invalid(
            "Username can only contain letters, numbers and @ . + - _",
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(invalid("Email cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(invalid(format!(
            "Email must be {} characters or less",
            MAX_EMAIL_LENGTH
        )));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(invalid("Invalid email format"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(invalid(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("Password cannot be entirely numeric"));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String> {
    validate_password(password)?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn create_user(db: &Database, user: &NewUser) -> Result<i64> {
    validate_username(&user.username)?;
    validate_email(&user.email)?;
    let password_hash = hash_password(&user.password)?;
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO users (username, email, password_hash, is_staff) VALUES (?, ?, ?, ?)",
        (&user.username, &user.email, &password_hash, user.is_staff),
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, staff = user.is_staff, "Created user '{}'", user.username);
    Ok(id)
}

pub fn get_user(db: &Database, id: i64) -> Result<Option<User>> {
    let conn = db.get()?;
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    match conn.query_row(&sql, [id], row_to_user) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_username(db: &Database, username: &str) -> Result<Option<User>> {
    let conn = db.get()?;
    let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
    match conn.query_row(&sql, [username], row_to_user) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_users(db: &Database) -> Result<Vec<User>> {
    let conn = db.get()?;
    let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn set_staff(db: &Database, id: i64, is_staff: bool) -> Result<()> {
    let conn = db.get()?;
    let affected = conn.execute(
        "UPDATE users SET is_staff = ? WHERE id = ?",
        (is_staff, id),
    )?;
    if affected == 0 {
        return Err(ModelError::UserNotFound(id).into());
    }
    Ok(())
}

/// Removes the user along with their posts, comments and likes.
pub fn delete_user(db: &Database, username: &str) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM users WHERE username = ?", [username])?;
    Ok(affected > 0)
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        is_staff: row.get(4)?,
        created_at: row.get(5)?,
    })
}
