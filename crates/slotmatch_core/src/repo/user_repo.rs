//! Account and session-token storage.
//!
//! # Responsibility
//! - Create accounts with salted password digests.
//! - Issue, resolve and revoke opaque session tokens.
//!
//! # Invariants
//! - Usernames are unique after trimming.
//! - A user holds at most one token; issuing again returns the existing one.
//! - Password material never leaves this module in clear text.

use crate::model::availability::UserId;
use crate::model::user::{normalize_username, password_digest, verify_password, UserAccount};
use crate::repo::availability_repo::{RepoError, RepoResult};
use crate::repo::schema::ensure_table_ready;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Repository interface for accounts and tokens.
pub trait UserRepository {
    /// Creates one account and returns it.
    fn create_user(&self, username: &str, password: &str, is_admin: bool)
        -> RepoResult<UserAccount>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<UserAccount>>;
    /// Returns the account when `password` matches, `None` otherwise.
    fn verify_credentials(&self, username: &str, password: &str)
        -> RepoResult<Option<UserAccount>>;
    /// Returns the user's token, creating one when absent.
    fn issue_token(&self, user_id: UserId) -> RepoResult<String>;
    fn resolve_token(&self, token: &str) -> RepoResult<Option<UserAccount>>;
    /// Deletes `token`. Returns whether a row was removed.
    fn revoke_token(&self, token: &str) -> RepoResult<bool>;
}

/// SQLite-backed account repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "users",
            &["id", "username", "password_digest", "password_salt", "is_admin"],
        )?;
        ensure_table_ready(conn, "auth_tokens", &["token", "user_id"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> RepoResult<UserAccount> {
        let username = normalize_username(username)
            .ok_or_else(|| RepoError::InvalidData("username cannot be empty".to_string()))?;
        if password.is_empty() {
            return Err(RepoError::InvalidData("password cannot be empty".to_string()));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let digest = password_digest(&salt, password);
        let inserted = self.conn.execute(
            "INSERT INTO users (username, password_digest, password_salt, is_admin)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (username) DO NOTHING;",
            params![username.as_str(), digest, salt, is_admin],
        )?;
        if inserted == 0 {
            return Err(RepoError::Conflict(format!(
                "username `{username}` is already taken"
            )));
        }

        Ok(UserAccount {
            id: self.conn.last_insert_rowid(),
            username,
            is_admin,
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<UserAccount>> {
        let account = self
            .conn
            .query_row(
                "SELECT id, username, is_admin FROM users WHERE id = ?1;",
                [id],
                parse_account_row,
            )
            .optional()?;
        Ok(account)
    }

    fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> RepoResult<Option<UserAccount>> {
        let Some(username) = normalize_username(username) else {
            return Ok(None);
        };

        let stored = self
            .conn
            .query_row(
                "SELECT id, username, is_admin, password_digest, password_salt
                 FROM users
                 WHERE username = ?1;",
                [username.as_str()],
                |row| {
                    Ok((
                        parse_account_row(row)?,
                        row.get::<_, String>("password_digest")?,
                        row.get::<_, String>("password_salt")?,
                    ))
                },
            )
            .optional()?;

        Ok(stored.and_then(|(account, digest, salt)| {
            verify_password(&digest, &salt, password).then_some(account)
        }))
    }

    fn issue_token(&self, user_id: UserId) -> RepoResult<String> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT token FROM auth_tokens WHERE user_id = ?1;",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(token) = existing {
            tx.commit()?;
            return Ok(token);
        }

        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [user_id],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::UnknownUser(user_id));
        }

        let token = Uuid::new_v4().simple().to_string();
        tx.execute(
            "INSERT INTO auth_tokens (token, user_id) VALUES (?1, ?2);",
            params![token.as_str(), user_id],
        )?;
        tx.commit()?;
        Ok(token)
    }

    fn resolve_token(&self, token: &str) -> RepoResult<Option<UserAccount>> {
        let account = self
            .conn
            .query_row(
                "SELECT u.id AS id, u.username AS username, u.is_admin AS is_admin
                 FROM auth_tokens t
                 INNER JOIN users u ON u.id = t.user_id
                 WHERE t.token = ?1;",
                [token.trim()],
                parse_account_row,
            )
            .optional()?;
        Ok(account)
    }

    fn revoke_token(&self, token: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM auth_tokens WHERE token = ?1;", [token.trim()])?;
        Ok(changed > 0)
    }
}

fn parse_account_row(row: &Row<'_>) -> rusqlite::Result<UserAccount> {
    Ok(UserAccount {
        id: row.get("id")?,
        username: row.get("username")?,
        is_admin: row.get("is_admin")?,
    })
}
