//! In-memory repository implementations (for development/testing).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use common::{AppError, AppResult};
use domain::{Course, CourseId, NewStudent, Student, StudentId};

use super::{CourseRepository, StudentRepository};

#[derive(Debug, Default)]
struct StudentTable {
    rows: BTreeMap<StudentId, Student>,
    last_id: StudentId,
}

impl StudentTable {
    fn email_taken(&self, email: &str, except: Option<StudentId>) -> bool {
        self.rows
            .values()
            .any(|s| s.email == email && Some(s.id) != except)
    }

    fn select(&self, predicate: impl Fn(&Student) -> bool) -> Vec<Student> {
        self.rows.values().filter(|&s| predicate(s)).cloned().collect()
    }
}

/// In-memory implementation of StudentRepository.
///
/// Ids are assigned sequentially from 1 and listings come back in id order,
/// matching the PostgreSQL store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStudentStore {
    table: Arc<RwLock<StudentTable>>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentStore {
    async fn find_all(&self) -> AppResult<Vec<Student>> {
        let table = self.table.read().await;
        Ok(table.select(|_| true))
    }

    async fn find_by_id(&self, id: StudentId) -> AppResult<Option<Student>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Student>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|s| s.email == email).cloned())
    }

    async fn find_all_by_enrollment_date_before(&self, date: NaiveDate) -> AppResult<Vec<Student>> {
        let table = self.table.read().await;
        Ok(table.select(|s| s.enrolled_before(date)))
    }

    async fn find_all_by_courses_containing(&self, course: &Course) -> AppResult<Vec<Student>> {
        let table = self.table.read().await;
        Ok(table.select(|s| s.attends(course.id)))
    }

    async fn find_all_by_courses_containing_and_enrollment_date_before(
        &self,
        course: &Course,
        date: NaiveDate,
    ) -> AppResult<Vec<Student>> {
        let table = self.table.read().await;
        Ok(table.select(|s| s.attends(course.id) && s.enrolled_before(date)))
    }

    async fn insert(&self, student: NewStudent) -> AppResult<Student> {
        let mut table = self.table.write().await;

        if table.email_taken(&student.email, None) {
            return Err(AppError::conflict("Email"));
        }

        table.last_id += 1;
        let student = student.with_id(table.last_id);
        table.rows.insert(student.id, student.clone());

        tracing::info!(student_id = student.id, "Inserted student");
        Ok(student)
    }

    async fn update(&self, student: Student) -> AppResult<Student> {
        let mut table = self.table.write().await;

        if !table.rows.contains_key(&student.id) {
            return Err(AppError::not_found("Student"));
        }
        if table.email_taken(&student.email, Some(student.id)) {
            return Err(AppError::conflict("Email"));
        }

        table.rows.insert(student.id, student.clone());

        tracing::info!(student_id = student.id, "Updated student");
        Ok(student)
    }

    async fn delete(&self, student: &Student) -> AppResult<()> {
        let mut table = self.table.write().await;

        if table.rows.remove(&student.id).is_none() {
            return Err(AppError::not_found("Student"));
        }

        tracing::info!(student_id = student.id, "Deleted student");
        Ok(())
    }
}

/// In-memory implementation of CourseRepository.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCourseStore {
    courses: Arc<RwLock<BTreeMap<CourseId, Course>>>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a fixed course list
    pub fn with_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let courses = courses.into_iter().map(|c| (c.id, c)).collect();
        Self {
            courses: Arc::new(RwLock::new(courses)),
        }
    }

    /// Add a course with the next free id
    pub async fn add(&self, name: impl Into<String>) -> Course {
        let mut courses = self.courses.write().await;
        let id = courses.keys().next_back().copied().unwrap_or(0) + 1;
        let course = Course::new(id, name);
        courses.insert(id, course.clone());
        course
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseStore {
    async fn find_by_id(&self, id: CourseId) -> AppResult<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(&id).cloned())
    }

    async fn find_all_by_id(&self, ids: &[CourseId]) -> AppResult<Vec<Course>> {
        let courses = self.courses.read().await;
        Ok(courses
            .values()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> AppResult<Vec<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::StudentType;

    fn new_student(email: &str, courses: Vec<Course>) -> NewStudent {
        NewStudent {
            name: "Ana".to_string(),
            email: email.to_string(),
            password: "hash".to_string(),
            student_type: StudentType::Student,
            courses,
            enrollment_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = InMemoryStudentStore::new();

        let first = store.insert(new_student("a@x.com", vec![])).await.unwrap();
        let second = store.insert(new_student("b@x.com", vec![])).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryStudentStore::new();
        store.insert(new_student("a@x.com", vec![])).await.unwrap();

        let result = store.insert(new_student("a@x.com", vec![])).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_student() {
        let store = InMemoryStudentStore::new();
        let ghost = new_student("ghost@x.com", vec![]).with_id(9);

        let result = store.delete(&ghost).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_course_containment() {
        let store = InMemoryStudentStore::new();
        let web = Course::new(1, "Web Programming");
        let db = Course::new(2, "Databases");

        store
            .insert(new_student("a@x.com", vec![web.clone()]))
            .await
            .unwrap();
        store
            .insert(new_student("b@x.com", vec![web.clone(), db.clone()]))
            .await
            .unwrap();

        assert_eq!(store.find_all_by_courses_containing(&web).await.unwrap().len(), 2);
        assert_eq!(store.find_all_by_courses_containing(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_course_store_resolves_known_ids_only() {
        let store = InMemoryCourseStore::new();
        let web = store.add("Web Programming").await;
        let db = store.add("Databases").await;

        let found = store.find_all_by_id(&[db.id, 77, web.id]).await.unwrap();
        assert_eq!(found, vec![web, db]);
    }
}
