//! The course record and its validation rules.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single catalog entry.
///
/// All attributes are free-form strings. The `code` identifies the course,
/// but uniqueness is not enforced anywhere: appending a duplicate code is
/// accepted, and a delete removes every entry carrying the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course code, e.g. "CS101".
    pub code: String,
    /// Course title.
    pub name: String,
    /// Instructor name.
    pub instructor: String,
    /// Semester offered.
    #[serde(default)]
    pub semester: String,
    /// Weekly schedule.
    #[serde(default)]
    pub schedule: String,
    /// Classroom location.
    #[serde(default)]
    pub classroom: String,
    /// Prerequisite courses.
    #[serde(default)]
    pub prerequisites: String,
    /// Grading policy.
    #[serde(default)]
    pub grading: String,
}

impl Course {
    /// Returns the names of required fields that are empty.
    #[must_use]
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.code.is_empty() {
            missing.push("code");
        }
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.instructor.is_empty() {
            missing.push("instructor");
        }
        missing
    }

    /// Validates the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFields`] naming every empty required field.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_required_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingFields { fields: missing })
        }
    }
}
