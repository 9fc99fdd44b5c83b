//! User repository implementation.
//!
//! Every call round-trips to the store as a single statement and is bounded
//! by the per-operation deadline. There is no caching and no transaction
//! spanning calls; concurrent writers to the same row resolve as
//! last-committed-wins inside the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set,
};
use tracing::{debug, error, warn};

use super::entities::user::{ActiveModel, Column, Entity as UserEntity};
use common::{AppError, AppResult, OptionExt};
use domain::{CreateUser, CredentialHasher, User, UserId, DEFAULT_OPERATION_TIMEOUT_SECS};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, ordered by last name ascending
    async fn get_all(&self) -> AppResult<Vec<User>>;

    /// Find user by email address
    async fn get_by_email(&self, email: &str) -> AppResult<User>;

    /// Find user by ID
    async fn get_by_id(&self, id: UserId) -> AppResult<User>;

    /// Hash the candidate's password and store the user, returning the new ID
    async fn insert(&self, candidate: CreateUser) -> AppResult<UserId>;

    /// Persist every mutable field of the record.
    ///
    /// The stored credential is written as given, whatever scheme produced
    /// it; callers changing a password must hash it first.
    async fn update(&self, user: &User) -> AppResult<()>;

    /// Delete the given user
    async fn delete(&self, user: &User) -> AppResult<()>;

    /// Delete user by ID
    async fn delete_by_id(&self, id: UserId) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: Arc<DatabaseConnection>,
    hasher: CredentialHasher,
    operation_timeout: Duration,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>, hasher: CredentialHasher) -> Self {
        Self {
            db,
            hasher,
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
        }
    }

    /// Override the per-operation deadline
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Run one operation under the deadline.
    ///
    /// When the deadline fires the in-flight future is dropped, which
    /// abandons the statement.
    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                if !err.is_expected() {
                    error!(
                        operation,
                        code = err.code(),
                        error = ?err,
                        "User store operation failed"
                    );
                }
                Err(err)
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.operation_timeout.as_millis() as u64,
                    "User store operation timed out"
                );
                Err(AppError::Timeout)
            }
        }
    }

    async fn hash_credential(&self, password: String) -> AppResult<String> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))??;
        Ok(hash)
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn get_all(&self) -> AppResult<Vec<User>> {
        self.with_deadline("get_all", async {
            let models = UserEntity::find()
                .order_by_asc(Column::LastName)
                .all(self.db.as_ref())
                .await
                .map_err(AppError::from)?;

            debug!(count = models.len(), "Listed users");
            Ok(models.into_iter().map(User::from).collect())
        })
        .await
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.with_deadline("get_by_email", async {
            let result = UserEntity::find()
                .filter(Column::Email.eq(email))
                .one(self.db.as_ref())
                .await
                .map_err(AppError::from)?;

            result.map(User::from).ok_or_not_found()
        })
        .await
    }

    async fn get_by_id(&self, id: UserId) -> AppResult<User> {
        self.with_deadline("get_by_id", async {
            let result = UserEntity::find_by_id(id)
                .one(self.db.as_ref())
                .await
                .map_err(AppError::from)?;

            result.map(User::from).ok_or_not_found()
        })
        .await
    }

    async fn insert(&self, candidate: CreateUser) -> AppResult<UserId> {
        let CreateUser {
            email,
            first_name,
            last_name,
            password,
            active,
        } = candidate;

        self.with_deadline("insert", async {
            let password_hash = self.hash_credential(password).await?;

            let now = Utc::now();
            let active_model = ActiveModel {
                id: NotSet,
                email: Set(email),
                first_name: Set(first_name),
                last_name: Set(last_name),
                password_hash: Set(password_hash),
                active: Set(active),
                created_at: Set(now),
                updated_at: Set(now),
            };

            let model = active_model
                .insert(self.db.as_ref())
                .await
                .map_err(AppError::from)?;
            debug!(user_id = model.id, "Inserted user");
            Ok(model.id)
        })
        .await
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let updated_at = user.next_updated_at();

        self.with_deadline("update", async {
            let result = UserEntity::update_many()
                .col_expr(Column::Email, Expr::value(user.email.clone()))
                .col_expr(Column::FirstName, Expr::value(user.first_name.clone()))
                .col_expr(Column::LastName, Expr::value(user.last_name.clone()))
                .col_expr(Column::PasswordHash, Expr::value(user.password_hash.clone()))
                .col_expr(Column::Active, Expr::value(user.active))
                .col_expr(Column::UpdatedAt, Expr::value(updated_at))
                .filter(Column::Id.eq(user.id))
                .exec(self.db.as_ref())
                .await
                .map_err(AppError::from)?;

            if result.rows_affected == 0 {
                return Err(AppError::NotFound);
            }

            debug!(user_id = user.id, "Updated user");
            Ok(())
        })
        .await
    }

    async fn delete(&self, user: &User) -> AppResult<()> {
        self.delete_by_id(user.id).await
    }

    async fn delete_by_id(&self, id: UserId) -> AppResult<()> {
        self.with_deadline("delete_by_id", async {
            let result = UserEntity::delete_by_id(id)
                .exec(self.db.as_ref())
                .await
                .map_err(AppError::from)?;

            if result.rows_affected == 0 {
                return Err(AppError::NotFound);
            }

            debug!(user_id = id, "Deleted user");
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use domain::HashingParams;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn mock_db(db: MockDatabase) -> Arc<DatabaseConnection> {
        Arc::new(db.into_connection())
    }

    /// Statements issued so far; the store must already be dropped.
    fn transaction_log(db: Arc<DatabaseConnection>) -> Vec<Transaction> {
        Arc::try_unwrap(db)
            .ok()
            .expect("store still holds the connection")
            .into_transaction_log()
    }

    fn stored_user(hasher: &CredentialHasher) -> User {
        let created = Utc::now() - ChronoDuration::hours(1);
        User {
            id: 5,
            email: "a@x.com".to_string(),
            first_name: "A".to_string(),
            last_name: "Zed".to_string(),
            password_hash: hasher.hash("secret123").unwrap(),
            active: true,
            created_at: created,
            // Written "in the future" so the next timestamp is deterministic
            updated_at: Utc::now() + ChronoDuration::hours(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_turns_slow_operation_into_timeout() {
        let db = mock_db(MockDatabase::new(DatabaseBackend::Postgres));
        let store = UserStore::new(db, fast_hasher())
            .with_operation_timeout(Duration::from_secs(3));

        let result: AppResult<()> = store
            .with_deadline("slow", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(AppError::Timeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_passes_fast_operation_through() {
        let db = mock_db(MockDatabase::new(DatabaseBackend::Postgres));
        let store = UserStore::new(db, fast_hasher());

        let result = store
            .with_deadline("fast", async {
                tokio::time::sleep(Duration::from_millis(2_900)).await;
                Ok(7)
            })
            .await;

        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_update_writes_strictly_later_timestamp() {
        let hasher = fast_hasher();
        let user = stored_user(&hasher);
        let expected = user.updated_at + ChronoDuration::microseconds(1);

        let db = mock_db(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]));
        let store = UserStore::new(db.clone(), hasher);

        store.update(&user).await.unwrap();
        drop(store);

        let log = format!("{:?}", transaction_log(db));
        assert!(log.contains("UPDATE"));
        assert!(log.contains(&format!("{:?}", expected)));
        // id and created_at are never written
        assert!(!log.contains("created_at"));
    }

    #[tokio::test]
    async fn test_update_writes_foreign_credential_untouched() {
        let hasher = fast_hasher();
        let mut user = stored_user(&hasher);
        // Legacy bcrypt value carried over from an older deployment
        let legacy = "$2a$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";
        user.password_hash = legacy.to_string();

        let db = mock_db(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]));
        let store = UserStore::new(db.clone(), hasher);

        store.update(&user).await.unwrap();
        drop(store);

        let log = format!("{:?}", transaction_log(db));
        assert!(log.contains(legacy));
        assert!(!log.contains("$argon2id$"));
    }
}
