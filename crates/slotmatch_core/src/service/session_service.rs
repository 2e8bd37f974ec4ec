//! Token login/logout and caller resolution.
//!
//! # Responsibility
//! - Exchange credentials for a session token and back.
//! - Turn a presented token into a `Caller` for the other services.
//!
//! # Invariants
//! - Wrong username and wrong password are indistinguishable to callers.
//! - Logs never contain passwords or tokens.

use crate::access::{AccessError, Caller};
use crate::model::user::UserAccount;
use crate::repo::availability_repo::RepoError;
use crate::repo::user_repo::UserRepository;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SessionServiceError {
    InvalidCredentials,
    Access(AccessError),
    Repo(RepoError),
}

impl Display for SessionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Access(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCredentials => None,
            Self::Access(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SessionServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AccessError> for SessionServiceError {
    fn from(value: AccessError) -> Self {
        Self::Access(value)
    }
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub account: UserAccount,
}

pub struct SessionService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> SessionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an account. Used by operators and tests; not a public sign-up flow.
    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<UserAccount, SessionServiceError> {
        let account = self.repo.create_user(username, password, is_admin)?;
        info!(
            "event=user_create module=service status=ok user_id={} is_admin={}",
            account.id, account.is_admin
        );
        Ok(account)
    }

    /// Verifies credentials and returns the user's session token.
    ///
    /// Logging in twice returns the same token until logout.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, SessionServiceError> {
        let Some(account) = self.repo.verify_credentials(username, password)? else {
            warn!("event=login module=service status=rejected");
            return Err(SessionServiceError::InvalidCredentials);
        };
        let token = self.repo.issue_token(account.id)?;
        info!("event=login module=service status=ok user_id={}", account.id);
        Ok(Session { token, account })
    }

    /// Revokes `token`.
    ///
    /// # Errors
    /// - `Access(NotAuthenticated)` when the token is unknown.
    pub fn logout(&self, token: &str) -> Result<(), SessionServiceError> {
        if !self.repo.revoke_token(token)? {
            return Err(AccessError::NotAuthenticated.into());
        }
        info!("event=logout module=service status=ok");
        Ok(())
    }

    /// Resolves `token` into the caller identity used by core services.
    pub fn authenticate(&self, token: &str) -> Result<Caller, SessionServiceError> {
        let account = self
            .repo
            .resolve_token(token)?
            .ok_or(AccessError::NotAuthenticated)?;
        Ok(Caller {
            user_id: account.id,
            is_privileged: account.is_admin,
        })
    }
}
