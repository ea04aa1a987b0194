use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{auth::dto::PublicUser, error::StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

/// Task record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "authorId")]
    pub author_id: Uuid, // set at creation, never reassigned
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Listing entry: the task with its author's public fields embedded.
#[derive(Debug, Clone, Serialize)]
pub struct ListedTask {
    #[serde(flatten)]
    pub task: Task,
    pub author: PublicUser,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub author_id: Uuid,
}

/// Fields an update may touch. `description: None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct TaskChanges {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPage {
    pub page: i64,
    pub limit: i64,
    pub status: Option<TaskStatus>,
}

impl Default for TaskPage {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            status: None,
        }
    }
}

impl TaskPage {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Task repository. Newest tasks come first in paged listings.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;
    async fn find_by_owner_paged(&self, owner_id: Uuid, page: TaskPage) -> Result<Vec<ListedTask>, StoreError>;
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;
    /// Refreshes `updated_at`; `None` when the task is gone.
    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, StoreError>;
    /// `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        assert_eq!(TaskStatus::parse("invalid_status"), None);
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }

    #[test]
    fn page_offset() {
        assert_eq!(TaskPage::default().offset(), 0);
        let page = TaskPage { page: 2, limit: 5, status: None };
        assert_eq!(page.offset(), 5);
        let huge = TaskPage { page: i64::MAX, limit: i64::MAX, status: None };
        assert_eq!(huge.offset(), i64::MAX);
    }

    #[test]
    fn task_json_shape() {
        let task = Task {
            id: Uuid::nil(),
            title: "Task 1".into(),
            description: None,
            status: TaskStatus::InProgress,
            author_id: Uuid::nil(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["authorId"], Uuid::nil().to_string());
        assert!(json["description"].is_null());
        assert!(json["updated_at"].is_string());
    }

    #[test]
    fn listed_task_embeds_public_author() {
        let listed = ListedTask {
            task: Task {
                id: Uuid::nil(),
                title: "Task 1".into(),
                description: None,
                status: TaskStatus::Pending,
                author_id: Uuid::nil(),
                created_at: OffsetDateTime::UNIX_EPOCH,
                updated_at: OffsetDateTime::UNIX_EPOCH,
            },
            author: PublicUser {
                id: Uuid::nil(),
                email: "user@mail.com".into(),
                created_at: OffsetDateTime::UNIX_EPOCH,
            },
        };
        let json = serde_json::to_value(&listed).unwrap();
        assert_eq!(json["title"], "Task 1");
        assert_eq!(json["authorId"], json["author"]["id"]);
        assert_eq!(json["author"]["email"], "user@mail.com");
        assert!(json["author"].get("password_hash").is_none());
    }
}
