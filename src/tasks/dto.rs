use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::repo::{NewTask, TaskChanges, TaskPage, TaskStatus};
use crate::validation::{char_len, raw, Input, ValidationErrors};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;

fn status_message() -> String {
    let names: Vec<&str> = TaskStatus::ALL.iter().map(|s| s.as_str()).collect();
    format!("Status must be one of: {}", names.join(", "))
}

/// Body of `POST /tasks` and `PUT /tasks/:id`, read as raw JSON per field.
#[derive(Debug, Default, Deserialize)]
pub struct TaskBody {
    #[serde(default, deserialize_with = "raw")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "raw")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "raw")]
    pub status: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

impl TaskBody {
    pub fn validate(self) -> Result<ValidTask, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = match Input::from(self.title) {
            Input::Text(t) => {
                let len = char_len(&t);
                if len < TITLE_MIN {
                    errors.add("title", "Title must be at least 3 characters long");
                } else if len > TITLE_MAX {
                    errors.add("title", "Title must be at most 100 characters long");
                }
                t
            }
            Input::Missing | Input::NotText => {
                errors.add("title", "Title is required");
                String::new()
            }
        };

        // optional, but `null` is not a way to clear it
        let description = match Input::from(self.description) {
            Input::Missing => None,
            Input::Text(d) => {
                if char_len(&d) > DESCRIPTION_MAX {
                    errors.add("description", "Description must be at most 500 characters long");
                }
                Some(d)
            }
            Input::NotText => {
                errors.add("description", "Description must be a string");
                None
            }
        };

        let status = match Input::from(self.status) {
            Input::Missing => TaskStatus::default(),
            Input::Text(name) => TaskStatus::parse(&name).unwrap_or_else(|| {
                errors.add("status", status_message());
                TaskStatus::default()
            }),
            Input::NotText => {
                errors.add("status", status_message());
                TaskStatus::default()
            }
        };

        errors.finish(ValidTask {
            title,
            description,
            status,
        })
    }
}

impl ValidTask {
    pub fn into_new(self, author_id: Uuid) -> NewTask {
        NewTask {
            title: self.title,
            description: self.description,
            status: self.status,
            author_id,
        }
    }

    pub fn into_changes(self) -> TaskChanges {
        TaskChanges {
            title: self.title,
            description: self.description,
            status: self.status,
        }
    }
}

/// `GET /tasks?page&limit&status`, kept as strings so bad values become field errors.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

fn positive(raw: Option<&str>, default: i64, field: &'static str, label: &str, errors: &mut ValidationErrors) -> i64 {
    let Some(raw) = raw else { return default };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => n,
        Ok(_) => {
            errors.add(field, format!("{label} must be at least 1"));
            default
        }
        Err(_) => {
            errors.add(field, format!("{label} must be a number"));
            default
        }
    }
}

impl ListTasksQuery {
    pub fn validate(self) -> Result<TaskPage, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let defaults = TaskPage::default();
        let page = positive(self.page.as_deref(), defaults.page, "page", "Page", &mut errors);
        let limit = positive(self.limit.as_deref(), defaults.limit, "limit", "Limit", &mut errors);
        let status = match self.status.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = TaskStatus::parse(raw);
                if parsed.is_none() {
                    errors.add("status", status_message());
                }
                parsed
            }
        };
        errors.finish(TaskPage { page, limit, status })
    }
}
