//! File-backed catalog storage.
//!
//! The catalog is a single JSON array on disk. Every operation reads or
//! rewrites the whole file; there is no partial I/O, no indexing, and no
//! locking, so concurrent writers can race.

use std::path::{Path, PathBuf};

use crate::course::Course;
use crate::error::{Error, Result};

/// Store for the course catalog file.
///
/// Holds only the file path. Each call opens the file fresh, so a `Catalog`
/// can be cloned freely and shared across handlers.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
}

impl Catalog {
    /// Creates a catalog store over the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every course from the file.
    ///
    /// A missing file yields an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse as a
    /// JSON array of courses.
    pub fn load(&self) -> Result<Vec<Course>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Rewrites the whole file with the given courses.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, courses: &[Course]) -> Result<()> {
        let contents = serde_json::to_string_pretty(courses)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Appends a course to the catalog.
    ///
    /// No uniqueness check is performed on the code.
    ///
    /// # Errors
    ///
    /// Returns an error if the load or the rewrite fails.
    pub fn append(&self, course: Course) -> Result<()> {
        let mut courses = self.load()?;
        courses.push(course);
        self.save(&courses)
    }

    /// Returns the first course with the given code, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the load fails.
    pub fn find(&self, code: &str) -> Result<Option<Course>> {
        let courses = self.load()?;
        Ok(courses.into_iter().find(|course| course.code == code))
    }

    /// Removes every course with the given code and rewrites the file.
    ///
    /// Returns the first removed course.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CourseNotFound`] if no course carries the code, or an
    /// I/O error if the load or rewrite fails.
    pub fn remove(&self, code: &str) -> Result<Course> {
        let courses = self.load()?;
        let (removed, retained): (Vec<Course>, Vec<Course>) =
            courses.into_iter().partition(|course| course.code == code);

        let Some(first) = removed.into_iter().next() else {
            return Err(Error::course_not_found(code));
        };

        self.save(&retained)?;
        Ok(first)
    }

    /// Returns the number of courses in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the load fails.
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, name: &str) -> Course {
        Course {
            code: code.to_string(),
            name: name.to_string(),
            instructor: "Prof. Byrd".to_string(),
            semester: String::new(),
            schedule: String::new(),
            classroom: String::new(),
            prerequisites: String::new(),
            grading: String::new(),
        }
    }

    fn temp_catalog() -> (tempfile::TempDir, Catalog) {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(dir.path().join("course_catalog.json"));
        (dir, catalog)
    }

    #[test]
    fn test_load_missing_file_yields_empty_catalog() {
        let (_dir, catalog) = temp_catalog();
        assert!(catalog.load().unwrap().is_empty());
        assert_eq!(catalog.count().unwrap(), 0);
    }

    #[test]
    fn test_append_increases_catalog_by_one() {
        let (_dir, catalog) = temp_catalog();
        catalog.append(course("CS101", "Intro")).unwrap();
        assert_eq!(catalog.count().unwrap(), 1);

        catalog.append(course("CS201", "Data Structures")).unwrap();
        assert_eq!(catalog.count().unwrap(), 2);
    }

    #[test]
    fn test_append_accepts_duplicate_codes() {
        let (_dir, catalog) = temp_catalog();
        catalog.append(course("CS101", "Intro")).unwrap();
        catalog.append(course("CS101", "Intro, again")).unwrap();
        assert_eq!(catalog.count().unwrap(), 2);
    }

    #[test]
    fn test_find_returns_first_match() {
        let (_dir, catalog) = temp_catalog();
        catalog.append(course("CS101", "Intro")).unwrap();
        catalog.append(course("CS201", "Data Structures")).unwrap();

        let found = catalog.find("CS201").unwrap().unwrap();
        assert_eq!(found.name, "Data Structures");
        assert!(catalog.find("CS999").unwrap().is_none());
    }

    #[test]
    fn test_remove_deletes_existing_course() {
        let (_dir, catalog) = temp_catalog();
        catalog.append(course("CS101", "Intro")).unwrap();
        catalog.append(course("CS201", "Data Structures")).unwrap();

        let removed = catalog.remove("CS101").unwrap();
        assert_eq!(removed.name, "Intro");
        assert_eq!(catalog.count().unwrap(), 1);
        assert!(catalog.find("CS101").unwrap().is_none());
    }

    #[test]
    fn test_remove_deletes_every_entry_with_the_code() {
        let (_dir, catalog) = temp_catalog();
        catalog.append(course("CS101", "Intro")).unwrap();
        catalog.append(course("CS101", "Intro, again")).unwrap();
        catalog.append(course("CS201", "Data Structures")).unwrap();

        let removed = catalog.remove("CS101").unwrap();
        assert_eq!(removed.name, "Intro");
        assert_eq!(catalog.count().unwrap(), 1);
    }

    #[test]
    fn test_remove_unknown_code_is_not_found() {
        let (_dir, catalog) = temp_catalog();
        catalog.append(course("CS101", "Intro")).unwrap();

        let err = catalog.remove("CS999").unwrap_err();
        assert!(matches!(err, Error::CourseNotFound { .. }));
        // The file is untouched.
        assert_eq!(catalog.count().unwrap(), 1);
    }

    #[test]
    fn test_file_is_a_pretty_printed_json_array() {
        let (_dir, catalog) = temp_catalog();
        catalog.append(course("CS101", "Intro")).unwrap();

        let contents = std::fs::read_to_string(catalog.path()).unwrap();
        assert!(contents.starts_with('['));
        assert!(contents.contains('\n'));

        let parsed: Vec<Course> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
