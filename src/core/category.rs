use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Icon identifiers the UI can render. Categories reference icons by name;
/// anything outside this set is rejected at creation/edit time.
pub const ICON_NAMES: &[&str] = &[
    "briefcase",
    "house",
    "cart-shopping",
    "dumbbell",
    "book",
    "graduation-cap",
    "utensils",
    "plane",
    "heart",
    "music",
    "paw",
    "wrench",
    "seedling",
    "gamepad",
    "phone",
    "envelope",
    "car",
    "gift",
    "palette",
    "star",
];

static ICON_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| ICON_NAMES.iter().copied().collect());

pub fn is_known_icon(icon: &str) -> bool {
    ICON_SET.contains(icon)
}

/// A user-defined grouping of todos. Todos reference a category by `name`,
/// so renames must cascade through the todo collection (see `TodoStore`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub icon: String,
}

impl Category {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}
