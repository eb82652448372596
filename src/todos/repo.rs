use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Todo record. Every query below filters on `user_id`, so a row belonging
/// to another user behaves exactly like a missing row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    #[serde(with = "time::serde::iso8601::option")]
    pub due_date: Option<OffsetDateTime>,
    pub completed: bool,
    #[serde(with = "time::serde::iso8601")]
    pub created_at: OffsetDateTime,
}

impl Todo {
    /// All todos owned by the user, newest first.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Todo>> {
        let rows = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, text, category, priority, due_date, completed, created_at
            FROM todos
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        text: &str,
        category: Option<&str>,
        priority: Option<&str>,
        due_date: Option<OffsetDateTime>,
    ) -> anyhow::Result<Todo> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (user_id, text, category, priority, due_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, text, category, priority, due_date, completed, created_at
            "#,
        )
        .bind(user_id)
        .bind(text)
        .bind(category)
        .bind(priority)
        .bind(due_date)
        .fetch_one(db)
        .await?;
        Ok(todo)
    }

    /// Toggle completion. Returns None when no row matches both id and
    /// owner, whether the todo is absent or owned by someone else.
    pub async fn set_completed(
        db: &PgPool,
        user_id: Uuid,
        todo_id: Uuid,
        completed: bool,
    ) -> anyhow::Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET completed = $1
            WHERE id = $2 AND user_id = $3
            RETURNING id, user_id, text, category, priority, due_date, completed, created_at
            "#,
        )
        .bind(completed)
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(todo)
    }

    /// Delete with the same ownership-scoped existence check as updates.
    pub async fn delete(db: &PgPool, user_id: Uuid, todo_id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            DELETE FROM todos
            WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(deleted.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_due_date_as_iso8601() {
        let todo = Todo {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            text: "Buy milk".into(),
            category: Some("daily".into()),
            priority: Some("high".into()),
            due_date: Some(time::macros::datetime!(2026-09-01 00:00:00 UTC)),
            completed: false,
            created_at: time::macros::datetime!(2026-08-28 12:00:00 UTC),
        };
        let json = serde_json::to_string(&todo).expect("serialize");
        assert!(json.contains("2026-09-01T00:00:00"));
        assert!(json.contains("\"completed\":false"));
    }

    #[test]
    fn todo_serializes_null_due_date() {
        let todo = Todo {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            text: "No deadline".into(),
            category: None,
            priority: None,
            due_date: None,
            completed: true,
            created_at: time::macros::datetime!(2026-08-28 12:00:00 UTC),
        };
        let json = serde_json::to_string(&todo).expect("serialize");
        assert!(json.contains("\"due_date\":null"));
        assert!(json.contains("\"completed\":true"));
    }
}
