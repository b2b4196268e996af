use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::health::ports::HealthProbe;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = "id, email, username, full_name, password_hash, is_active, \
                            is_superuser, role, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    full_name: Option<String>,
    password_hash: String,
    is_active: bool,
    is_superuser: bool,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            email: EmailAddress::new(row.email)?,
            username: Username::new(row.username)?,
            full_name: row.full_name.map(FullName::new).transpose()?,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            role: row.role.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map unique violations to the matching conflict error.
fn map_write_error(e: sqlx::Error, email: &EmailAddress, username: &Username) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("users_username_key") {
                return UserError::UsernameAlreadyExists(username.to_string());
            }
            if db_err.constraint() == Some("users_email_key") {
                return UserError::EmailAlreadyExists(email.to_string());
            }
        }
    }
    UserError::DatabaseError(e.to_string())
}

fn map_read_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        condition: &str,
        value: &str,
    ) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {condition}");

        sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let query = format!(
            "INSERT INTO users (email, username, full_name, password_hash, is_active, is_superuser, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user.email.as_str())
            .bind(user.username.as_str())
            .bind(user.full_name.as_ref().map(|n| n.as_str()))
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(user.is_superuser)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &user.email, &user.username))?;

        User::try_from(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, UserRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        self.fetch_one_where("email = $1", email.as_str()).await
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        self.fetch_one_where("username = $1", username.as_str())
            .await
    }

    async fn find_by_email_or_username(&self, identifier: &str) -> Result<Option<User>, UserError> {
        self.fetch_one_where("email = $1 OR username = $1 LIMIT 1", identifier)
            .await
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2"
        );

        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn count(&self) -> Result<i64, UserError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let query = format!(
            "UPDATE users SET email = $2, username = $3, full_name = $4, password_hash = $5, \
             is_active = $6, is_superuser = $7, role = $8, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user.id.0)
            .bind(user.email.as_str())
            .bind(user.username.as_str())
            .bind(user.full_name.as_ref().map(|n| n.as_str()))
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(user.is_superuser)
            .bind(user.role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &user.email, &user.username))?
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;

        User::try_from(row)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_read_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl HealthProbe for PostgresUserRepository {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
