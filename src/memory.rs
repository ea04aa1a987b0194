//! In-process stores backing `AppState::fake()` in tests.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        dto::PublicUser,
        repo::{User, UserStore},
    },
    error::StoreError,
    tasks::repo::{ListedTask, NewTask, Task, TaskChanges, TaskPage, TaskStore},
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    tasks: RwLock<Vec<Task>>,
    blind_email_lookup: bool,
}

impl MemoryStore {
    /// `find_by_email` always misses, so only the insert-time
    /// uniqueness check can catch a duplicate (simulates a racing registration).
    pub fn hide_emails_from_lookup(mut self) -> Self {
        self.blind_email_lookup = true;
        self
    }

    pub async fn remove_user(&self, id: Uuid) {
        self.users.write().await.retain(|u| u.id != id);
        self.tasks.write().await.retain(|t| t.author_id != id);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        if self.blind_email_lookup {
            return Ok(None);
        }
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_owner_paged(&self, owner_id: Uuid, page: TaskPage) -> Result<Vec<ListedTask>, StoreError> {
        // inner-join semantics: no author row, no listing
        let Some(author) = self.users.read().await.iter().find(|u| u.id == owner_id).cloned() else {
            return Ok(Vec::new());
        };
        let author = PublicUser::from(author);

        let tasks = self.tasks.read().await;
        // stored oldest first; listing is newest first
        Ok(tasks
            .iter()
            .rev()
            .filter(|t| t.author_id == owner_id)
            .filter(|t| page.status.map_or(true, |s| t.status == s))
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .map(|t| ListedTask {
                task: t.clone(),
                author: author.clone(),
            })
            .collect())
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let now = OffsetDateTime::now_utc();
        let task = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            status: task.status,
            author_id: task.author_id,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.title = changes.title;
        if let Some(description) = changes.description {
            task.description = Some(description);
        }
        task.status = changes.status;
        task.updated_at = OffsetDateTime::now_utc();
        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() != before)
    }
}
