//! Course entity.

use serde::{Deserialize, Serialize};

/// Course identifier assigned by the course store.
pub type CourseId = i64;

/// A course students can enroll in. Read-only from the student service's
/// point of view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
}

impl Course {
    pub fn new(id: CourseId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
