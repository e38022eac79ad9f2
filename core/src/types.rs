//! Domain DTOs for the todo API.
//!
//! # Design
//! A single `Todo` type serves as stored record, create payload, and patch
//! payload. Every field except `id` is optional so a PATCH body like
//! `{"completed":true}` deserializes into the same type, and `merge` decides
//! which fields survive. `id` defaults to `0`, meaning "assign a new one".

use serde::{Deserialize, Serialize};

/// A single todo item as stored and returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Todo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: Some(false),
            ..Self::default()
        }
    }

    /// Combine a stored record with a partial update.
    ///
    /// `title`, `completed` and `order` come from `incoming` when present and
    /// from `self` otherwise. `id` and `url` always come from `self`: the id is
    /// immutable and the url is derived from it by the server.
    pub fn merge(&self, incoming: &Todo) -> Todo {
        Todo {
            id: self.id,
            title: incoming.title.clone().or_else(|| self.title.clone()),
            completed: incoming.completed.or(self.completed),
            order: incoming.order.or(self.order),
            url: self.url.clone(),
        }
    }

    /// Location of this todo under `base`, the collection URI it was posted to.
    pub fn location(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Todo {
        Todo {
            id: 7,
            title: Some("buy milk".to_string()),
            completed: Some(false),
            order: Some(3),
            url: Some("http://localhost:8082/todos/7".to_string()),
        }
    }

    #[test]
    fn merge_with_empty_patch_is_identity() {
        let base = stored();
        assert_eq!(base.merge(&Todo::default()), base);
    }

    #[test]
    fn merge_completed_only_keeps_other_fields() {
        let base = stored();
        let patch = Todo {
            completed: Some(true),
            ..Todo::default()
        };
        let merged = base.merge(&patch);
        assert_eq!(merged.completed, Some(true));
        assert_eq!(merged.title, base.title);
        assert_eq!(merged.order, base.order);
        assert_eq!(merged.url, base.url);
    }

    #[test]
    fn merge_never_changes_id_or_url() {
        let base = stored();
        let patch = Todo {
            id: 99,
            title: Some("walk dog".to_string()),
            url: Some("http://evil/todos/99".to_string()),
            ..Todo::default()
        };
        let merged = base.merge(&patch);
        assert_eq!(merged.id, 7);
        assert_eq!(merged.url, base.url);
        assert_eq!(merged.title.as_deref(), Some("walk dog"));
    }

    #[test]
    fn missing_id_deserializes_as_zero() {
        let todo: Todo = serde_json::from_str(r#"{"title":"No id"}"#).unwrap();
        assert_eq!(todo.id, 0);
        assert_eq!(todo.title.as_deref(), Some("No id"));
        assert!(todo.completed.is_none());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let todo = Todo {
            id: 1,
            title: Some("Test".to_string()),
            ..Todo::default()
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "title": "Test"}));
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let result: Result<Todo, _> = serde_json::from_str(r#"{"order":"first"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn location_appends_id_to_base() {
        let todo = Todo {
            id: 12,
            ..Todo::default()
        };
        assert_eq!(todo.location("http://h/todos"), "http://h/todos/12");
        assert_eq!(todo.location("http://h/todos/"), "http://h/todos/12");
    }
}
