use slotmatch_core::db::open_db_in_memory;
use slotmatch_core::{
    AccessError, RepoError, SessionService, SessionServiceError, SqliteUserRepository,
};

#[test]
fn login_returns_stable_token_and_resolves_caller() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionService::new(SqliteUserRepository::try_new(&conn).unwrap());
    let account = sessions.create_user("testuser", "password", false).unwrap();

    let first = sessions.login("testuser", "password").unwrap();
    let second = sessions.login(" testuser ", "password").unwrap();
    assert_eq!(first.token, second.token);
    assert_eq!(first.account, account);

    let caller = sessions.authenticate(&first.token).unwrap();
    assert_eq!(caller.user_id, account.id);
    assert!(!caller.is_privileged);
}

#[test]
fn admin_accounts_resolve_to_privileged_callers() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionService::new(SqliteUserRepository::try_new(&conn).unwrap());
    sessions.create_user("admin", "password", true).unwrap();

    let session = sessions.login("admin", "password").unwrap();
    assert!(sessions.authenticate(&session.token).unwrap().is_privileged);
}

#[test]
fn wrong_password_and_unknown_user_look_the_same() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionService::new(SqliteUserRepository::try_new(&conn).unwrap());
    sessions.create_user("testuser", "password", false).unwrap();

    let wrong_password = sessions.login("testuser", "nope").unwrap_err();
    let unknown_user = sessions.login("ghost", "password").unwrap_err();
    assert!(matches!(wrong_password, SessionServiceError::InvalidCredentials));
    assert!(matches!(unknown_user, SessionServiceError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[test]
fn logout_invalidates_token_and_next_login_issues_new_one() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionService::new(SqliteUserRepository::try_new(&conn).unwrap());
    sessions.create_user("testuser", "password", false).unwrap();

    let session = sessions.login("testuser", "password").unwrap();
    sessions.logout(&session.token).unwrap();

    assert!(matches!(
        sessions.authenticate(&session.token).unwrap_err(),
        SessionServiceError::Access(AccessError::NotAuthenticated)
    ));
    assert!(matches!(
        sessions.logout(&session.token).unwrap_err(),
        SessionServiceError::Access(AccessError::NotAuthenticated)
    ));

    let next = sessions.login("testuser", "password").unwrap();
    assert_ne!(next.token, session.token);
}

#[test]
fn duplicate_username_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionService::new(SqliteUserRepository::try_new(&conn).unwrap());
    sessions.create_user("testuser", "password", false).unwrap();

    let err = sessions.create_user("  testuser", "other", true).unwrap_err();
    assert!(matches!(err, SessionServiceError::Repo(RepoError::Conflict(_))));
}

#[test]
fn passwords_are_not_stored_in_clear_text() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionService::new(SqliteUserRepository::try_new(&conn).unwrap());
    sessions.create_user("testuser", "hunter2", false).unwrap();

    let digest: String = conn
        .query_row(
            "SELECT password_digest FROM users WHERE username = 'testuser';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(!digest.contains("hunter2"));
    assert!(digest.starts_with("pbkdf2_sha256$"));
}

#[test]
fn credentials_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.db");
    {
        let conn = slotmatch_core::db::open_db(&path).unwrap();
        let sessions = SessionService::new(SqliteUserRepository::try_new(&conn).unwrap());
        sessions.create_user("testuser", "s3cret", false).unwrap();
    }

    let conn = slotmatch_core::db::open_db(&path).unwrap();
    let sessions = SessionService::new(SqliteUserRepository::try_new(&conn).unwrap());
    assert!(sessions.login("testuser", "s3cret").is_ok());
    assert!(matches!(
        sessions.login("testuser", "s3cret ").unwrap_err(),
        SessionServiceError::InvalidCredentials
    ));
}
