//! User records and storage.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public user data; also the payload carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub id: u64,
    pub email: String,
    pub name: String,
}

/// A stored user including the password hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub claims: UserClaims,
    pub password_hash: String,
}

/// A user about to be stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Store a new user, assigning its id.
    async fn insert(&self, user: NewUser) -> Result<UserClaims, StoreError>;

    /// Look a user up by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
}

/// SQLite-backed user store. Emails are unique regardless of case.
#[derive(Clone, Debug)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    /// Pass `":memory:"` for a private in-memory database.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(unavailable)?;
        conn.execute_batch(
            "PRAGMA busy_timeout = 5000;

             CREATE TABLE IF NOT EXISTS users (
                 id            INTEGER PRIMARY KEY AUTOINCREMENT,
                 email         TEXT NOT NULL,
                 name          TEXT NOT NULL,
                 password_hash TEXT NOT NULL,
                 created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
             );

             CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email COLLATE NOCASE);",
        )
        .map_err(unavailable)?;

        tracing::info!(path, "User database ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("user database lock poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

fn unavailable(err: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn insert(&self, user: NewUser) -> Result<UserClaims, StoreError> {
        self.with_conn(move |conn| {
            let email = user.email.trim().to_string();
            let inserted = conn.execute(
                "INSERT INTO users (email, name, password_hash) VALUES (?1, ?2, ?3)",
                params![email, user.name, user.password_hash],
            );
            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                    return Err(StoreError::DuplicateEmail(email));
                }
                Err(e) => return Err(unavailable(e)),
            }

            Ok(UserClaims {
                id: conn.last_insert_rowid() as u64,
                email,
                name: user.name,
            })
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let email = email.trim().to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, email, name, password_hash FROM users WHERE email = ?1 COLLATE NOCASE",
                params![email],
                |row| {
                    Ok(UserRecord {
                        claims: UserClaims {
                            id: row.get::<_, i64>(0)? as u64,
                            email: row.get(1)?,
                            name: row.get(2)?,
                        },
                        password_hash: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(unavailable)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Test".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn memory_store() -> SqliteUserStore {
        SqliteUserStore::open(":memory:").unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = memory_store();
        let a = store.insert(new_user("a@test.com")).await.unwrap();
        let b = store.insert(new_user(" b@test.com ")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.email, "b@test.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_case_insensitive() {
        let store = memory_store();
        store.insert(new_user("Fan@Test.com")).await.unwrap();
        let err = store.insert(new_user("fan@test.com")).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail("fan@test.com".into()));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let store = memory_store();
        store.insert(new_user("fan@test.com")).await.unwrap();

        let found = store.find_by_email("FAN@test.com").await.unwrap().unwrap();
        assert_eq!(found.claims.email, "fan@test.com");
        assert_eq!(found.claims.id, 1);
        assert_eq!(found.password_hash, "hash");
        assert!(store.find_by_email("nobody@test.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_users_survive_reopen() {
        let dir = std::env::temp_dir().join(format!("rhythms-users-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("users.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteUserStore::open(path).unwrap();
            store.insert(new_user("fan@test.com")).await.unwrap();
        }

        let reopened = SqliteUserStore::open(path).unwrap();
        let found = reopened.find_by_email("fan@test.com").await.unwrap().unwrap();
        assert_eq!(found.claims.id, 1);
        let err = reopened.insert(new_user("FAN@test.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));

        drop(reopened);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_open_reports_unusable_path() {
        let dir = std::env::temp_dir().join(format!("rhythms-missing-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("users.db");
        let err = SqliteUserStore::open(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
