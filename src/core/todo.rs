use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single task entry, belonging to exactly one category by name.
///
/// `category` is a denormalized copy of the owning `Category::name`, not a
/// stable reference; category renames rewrite this field on every affected
/// todo. `id` is an opaque unique string (UUID v4 at creation, but restored
/// backups may carry ids from older schemes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub name: String,
    pub category: String,
    pub completed: bool,
    #[serde(default)]
    pub comment: String,
}

impl Todo {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            category: category.into(),
            completed: false,
            comment: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_todo_defaults() {
        let todo = Todo::new("Write report", "Work");
        assert!(!todo.id.is_empty());
        assert!(!todo.completed);
        assert_eq!(todo.comment, "");
        assert_eq!(todo.category, "Work");
    }

    #[test]
    fn ids_are_unique() {
        let a = Todo::new("a", "X");
        let b = Todo::new("b", "X");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn missing_comment_defaults_to_empty() {
        let json = r#"{"id":"1","name":"n","category":"c","completed":false}"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.comment, "");
    }
}
