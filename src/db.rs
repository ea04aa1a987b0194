use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{
        dto::PublicUser,
        repo::{User, UserStore},
    },
    config::AppConfig,
    error::StoreError,
    tasks::repo::{ListedTask, NewTask, Task, TaskChanges, TaskPage, TaskStore},
};

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run database migrations")?;

    Ok(db)
}

/// Postgres-backed credential store and task repository.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const TASK_COLUMNS: &str = "id, title, description, status, author_id, created_at, updated_at";

#[derive(FromRow)]
struct ListedTaskRow {
    #[sqlx(flatten)]
    task: Task,
    author_email: String,
    author_created_at: OffsetDateTime,
}

impl From<ListedTaskRow> for ListedTask {
    fn from(row: ListedTaskRow) -> Self {
        let author = PublicUser {
            id: row.task.author_id,
            email: row.author_email,
            created_at: row.author_created_at,
        };
        Self { task: row.task, author }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(task)
    }

    async fn find_by_owner_paged(&self, owner_id: Uuid, page: TaskPage) -> Result<Vec<ListedTask>, StoreError> {
        let rows = sqlx::query_as::<_, ListedTaskRow>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.author_id, t.created_at, t.updated_at,
                   u.email AS author_email, u.created_at AS author_created_at
            FROM tasks t
            JOIN users u ON u.id = t.author_id
            WHERE t.author_id = $1
              AND ($2::task_status IS NULL OR t.status = $2)
            ORDER BY t.created_at DESC, t.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id)
        .bind(page.status)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(ListedTask::from).collect())
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (id, title, description, status, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.author_id)
        .fetch_one(&self.db)
        .await?;
        Ok(task)
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
               SET title = $2,
                   description = COALESCE($3, description),
                   status = $4,
                   updated_at = $5
             WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.status)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(&self.db)
        .await?;
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
