use sqlx::PgPool;
use uuid::Uuid;

pub use crate::auth::repo_types::User;

impl User {
    /// Find a user by email (login key, case-sensitive as stored).
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password. The unique constraint on
    /// email is the authoritative duplicate check.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, avatar, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Record a newly uploaded avatar filename on the user row.
    pub async fn set_avatar(
        db: &PgPool,
        id: Uuid,
        filename: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET avatar = $1
            WHERE id = $2
            RETURNING id, name, email, password_hash, avatar, created_at
            "#,
        )
        .bind(filename)
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
