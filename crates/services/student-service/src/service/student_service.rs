//! Student service - Handles student lifecycle use cases.
//!
//! Resolves course ids, encodes passwords and decides which store query a
//! filter request maps to. It also backs the login lookup through
//! `CredentialsProvider`.

use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{
    CourseId, NewStudent, PasswordEncoder, Principal, Student, StudentId, StudentInput,
    MONTHS_PER_YEAR,
};

use super::{CourseService, CredentialsProvider};
use crate::repository::{CourseRepository, StudentRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Student service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StudentService: Send + Sync {
    /// List every student, in store order
    async fn list_all(&self) -> AppResult<Vec<Student>>;

    /// Get a student by id, failing with NotFound if absent
    async fn find_by_id(&self, id: StudentId) -> AppResult<Student>;

    /// Create a student from the given fields
    async fn create(&self, input: StudentInput) -> AppResult<Student>;

    /// Replace every field of an existing student
    async fn update(&self, id: StudentId, input: StudentInput) -> AppResult<Student>;

    /// Remove a student, returning the removed entity
    async fn delete(&self, id: StudentId) -> AppResult<Student>;

    /// Filter by course membership and/or minimum years since enrollment.
    ///
    /// Either argument may be absent; with both absent this is `list_all`.
    async fn filter(
        &self,
        course_id: Option<CourseId>,
        years_of_studying: Option<u32>,
    ) -> AppResult<Vec<Student>>;
}

/// Concrete implementation of StudentService.
pub struct StudentManager {
    students: Arc<dyn StudentRepository>,
    courses: Arc<dyn CourseRepository>,
    course_service: Arc<dyn CourseService>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl StudentManager {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        courses: Arc<dyn CourseRepository>,
        course_service: Arc<dyn CourseService>,
        encoder: Arc<dyn PasswordEncoder>,
    ) -> Self {
        Self {
            students,
            courses,
            course_service,
            encoder,
        }
    }

    /// Resolve the course set and encode the password of an input.
    async fn prepare(&self, input: StudentInput) -> AppResult<NewStudent> {
        let mut course_ids = input.course_ids;
        course_ids.sort_unstable();
        course_ids.dedup();

        let courses = self.courses.find_all_by_id(&course_ids).await?;
        let password = self.encoder.encode(&input.password)?;

        Ok(NewStudent {
            name: input.name,
            email: input.email,
            password,
            student_type: input.student_type,
            courses,
            enrollment_date: input.enrollment_date,
        })
    }

    /// Fail if `email` belongs to a student other than `owner`.
    async fn ensure_email_free(&self, email: &str, owner: Option<StudentId>) -> AppResult<()> {
        match self.students.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::conflict("Email")),
            _ => Ok(()),
        }
    }
}

/// Latest enrollment date (exclusive) of someone studying for `years` years
/// as of `today`. Feb 29 clamps to Feb 28.
pub fn enrollment_cutoff(today: NaiveDate, years: u32) -> AppResult<NaiveDate> {
    years
        .checked_mul(MONTHS_PER_YEAR)
        .and_then(|months| today.checked_sub_months(Months::new(months)))
        .ok_or_else(|| AppError::validation(format!("Years of studying out of range: {}", years)))
}

#[async_trait]
impl StudentService for StudentManager {
    async fn list_all(&self) -> AppResult<Vec<Student>> {
        self.students.find_all().await
    }

    async fn find_by_id(&self, id: StudentId) -> AppResult<Student> {
        self.students.find_by_id(id).await?.ok_or_not_found("Student")
    }

    async fn create(&self, input: StudentInput) -> AppResult<Student> {
        self.ensure_email_free(&input.email, None).await?;

        let student = self.prepare(input).await?;
        let student = self.students.insert(student).await?;

        tracing::info!(student_id = student.id, "Created student");
        Ok(student)
    }

    async fn update(&self, id: StudentId, input: StudentInput) -> AppResult<Student> {
        let mut student = self.find_by_id(id).await?;
        self.ensure_email_free(&input.email, Some(id)).await?;

        let details = self.prepare(input).await?;
        student.overwrite(details);

        self.students.update(student).await
    }

    async fn delete(&self, id: StudentId) -> AppResult<Student> {
        let student = self.find_by_id(id).await?;
        self.students.delete(&student).await?;
        Ok(student)
    }

    async fn filter(
        &self,
        course_id: Option<CourseId>,
        years_of_studying: Option<u32>,
    ) -> AppResult<Vec<Student>> {
        let today = Utc::now().date_naive();

        match (course_id, years_of_studying) {
            (None, None) => self.list_all().await,
            (None, Some(years)) => {
                let cutoff = enrollment_cutoff(today, years)?;
                self.students.find_all_by_enrollment_date_before(cutoff).await
            }
            (Some(course_id), None) => {
                let course = self.course_service.find_by_id(course_id).await?;
                self.students.find_all_by_courses_containing(&course).await
            }
            (Some(course_id), Some(years)) => {
                let course = self.course_service.find_by_id(course_id).await?;
                let cutoff = enrollment_cutoff(today, years)?;
                self.students
                    .find_all_by_courses_containing_and_enrollment_date_before(&course, cutoff)
                    .await
            }
        }
    }
}

#[async_trait]
impl CredentialsProvider for StudentManager {
    async fn load_credentials_by_username(&self, username: &str) -> AppResult<Principal> {
        self.students
            .find_by_email(username)
            .await?
            .map(Principal::from)
            .ok_or_else(|| AppError::UsernameNotFound(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockCourseRepository, MockStudentRepository};
    use crate::service::MockCourseService;
    use domain::{Course, MockPasswordEncoder, StudentType};
    use mockall::predicate::eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_student(id: StudentId) -> Student {
        Student {
            id,
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password: "encoded:pw1".to_string(),
            student_type: StudentType::Student,
            courses: vec![Course::new(1, "Web Programming")],
            enrollment_date: date(2020, 1, 1),
        }
    }

    fn input(course_ids: Vec<CourseId>) -> StudentInput {
        StudentInput {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password: "pw1".to_string(),
            student_type: StudentType::Student,
            course_ids,
            enrollment_date: date(2020, 1, 1),
        }
    }

    fn prefix_encoder() -> MockPasswordEncoder {
        let mut encoder = MockPasswordEncoder::new();
        encoder
            .expect_encode()
            .returning(|raw| Ok(format!("encoded:{}", raw)));
        encoder
    }

    struct Mocks {
        students: MockStudentRepository,
        courses: MockCourseRepository,
        course_service: MockCourseService,
        encoder: MockPasswordEncoder,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                students: MockStudentRepository::new(),
                courses: MockCourseRepository::new(),
                course_service: MockCourseService::new(),
                encoder: MockPasswordEncoder::new(),
            }
        }

        fn build(self) -> StudentManager {
            StudentManager::new(
                Arc::new(self.students),
                Arc::new(self.courses),
                Arc::new(self.course_service),
                Arc::new(self.encoder),
            )
        }
    }

    #[tokio::test]
    async fn test_find_by_id_success() {
        let mut mocks = Mocks::new();
        mocks
            .students
            .expect_find_by_id()
            .with(eq(5))
            .returning(|id| Ok(Some(create_test_student(id))));

        let student = mocks.build().find_by_id(5).await.unwrap();
        assert_eq!(student.id, 5);
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let mut mocks = Mocks::new();
        mocks.students.expect_find_by_id().returning(|_| Ok(None));

        let result = mocks.build().find_by_id(5).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_resolves_courses_and_encodes_password() {
        let mut mocks = Mocks::new();
        mocks.encoder = prefix_encoder();
        mocks.students.expect_find_by_email().returning(|_| Ok(None));
        mocks
            .courses
            .expect_find_all_by_id()
            .withf(|ids: &[CourseId]| ids == [1, 2])
            .returning(|_| Ok(vec![Course::new(1, "Web Programming")]));
        mocks
            .students
            .expect_insert()
            .withf(|s: &NewStudent| s.password == "encoded:pw1" && s.courses.len() == 1)
            .returning(|s| Ok(s.with_id(11)));

        // Duplicate and unknown ids collapse to the resolved set
        let student = mocks.build().create(input(vec![2, 1, 2])).await.unwrap();

        assert_eq!(student.id, 11);
        assert_eq!(student.course_ids(), vec![1]);
        assert_ne!(student.password, "pw1");
    }

    #[tokio::test]
    async fn test_create_rejects_taken_email() {
        let mut mocks = Mocks::new();
        mocks
            .students
            .expect_find_by_email()
            .returning(|_| Ok(Some(create_test_student(1))));
        mocks.students.expect_insert().never();

        let result = mocks.build().create(input(vec![])).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_replaces_every_field() {
        let mut mocks = Mocks::new();
        mocks.encoder = prefix_encoder();
        mocks
            .students
            .expect_find_by_id()
            .returning(|id| Ok(Some(create_test_student(id))));
        // Own email is not a conflict
        mocks
            .students
            .expect_find_by_email()
            .returning(|_| Ok(Some(create_test_student(3))));
        mocks
            .courses
            .expect_find_all_by_id()
            .returning(|_| Ok(vec![Course::new(2, "Databases")]));
        mocks.students.expect_update().returning(Ok);

        let mut changes = input(vec![2]);
        changes.name = "Ana Marija".to_string();
        changes.password = "pw2".to_string();
        changes.student_type = StudentType::Master;
        changes.enrollment_date = date(2022, 10, 1);

        let student = mocks.build().update(3, changes).await.unwrap();

        assert_eq!(student.id, 3);
        assert_eq!(student.name, "Ana Marija");
        assert_eq!(student.password, "encoded:pw2");
        assert_eq!(student.student_type, StudentType::Master);
        assert_eq!(student.course_ids(), vec![2]);
        assert_eq!(student.enrollment_date, date(2022, 10, 1));
    }

    #[tokio::test]
    async fn test_update_missing_student() {
        let mut mocks = Mocks::new();
        mocks.students.expect_find_by_id().returning(|_| Ok(None));
        mocks.students.expect_update().never();

        let result = mocks.build().update(3, input(vec![])).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_student() {
        let mut mocks = Mocks::new();
        mocks
            .students
            .expect_find_by_id()
            .returning(|id| Ok(Some(create_test_student(id))));
        mocks
            .students
            .expect_delete()
            .withf(|s: &Student| s.id == 8)
            .times(1)
            .returning(|_| Ok(()));

        let removed = mocks.build().delete(8).await.unwrap();
        assert_eq!(removed.id, 8);
    }

    #[tokio::test]
    async fn test_filter_without_arguments_lists_all() {
        let mut mocks = Mocks::new();
        mocks
            .students
            .expect_find_all()
            .times(1)
            .returning(|| Ok(vec![create_test_student(1), create_test_student(2)]));

        let students = mocks.build().filter(None, None).await.unwrap();
        assert_eq!(students.len(), 2);
    }

    #[tokio::test]
    async fn test_filter_by_years_uses_cutoff() {
        let expected = enrollment_cutoff(Utc::now().date_naive(), 2).unwrap();

        let mut mocks = Mocks::new();
        mocks
            .students
            .expect_find_all_by_enrollment_date_before()
            .with(eq(expected))
            .times(1)
            .returning(|_| Ok(vec![]));

        mocks.build().filter(None, Some(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_filter_by_course_resolves_course() {
        let mut mocks = Mocks::new();
        mocks
            .course_service
            .expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Course::new(id, "Web Programming")));
        mocks
            .students
            .expect_find_all_by_courses_containing()
            .withf(|course: &Course| course.id == 1)
            .returning(|_| Ok(vec![create_test_student(1)]));

        let students = mocks.build().filter(Some(1), None).await.unwrap();
        assert_eq!(students.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_by_unknown_course_fails() {
        let mut mocks = Mocks::new();
        mocks
            .course_service
            .expect_find_by_id()
            .returning(|_| Err(AppError::not_found("Course")));

        let result = mocks.build().filter(Some(9), Some(1)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filter_by_both_uses_single_query() {
        let expected = enrollment_cutoff(Utc::now().date_naive(), 3).unwrap();

        let mut mocks = Mocks::new();
        mocks
            .course_service
            .expect_find_by_id()
            .returning(|id| Ok(Course::new(id, "Web Programming")));
        mocks
            .students
            .expect_find_all_by_courses_containing_and_enrollment_date_before()
            .withf(move |course: &Course, cutoff: &NaiveDate| {
                course.id == 1 && *cutoff == expected
            })
            .times(1)
            .returning(|_, _| Ok(vec![]));
        mocks.students.expect_find_all_by_courses_containing().never();
        mocks
            .students
            .expect_find_all_by_enrollment_date_before()
            .never();

        mocks.build().filter(Some(1), Some(3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_credentials() {
        let mut mocks = Mocks::new();
        mocks
            .students
            .expect_find_by_email()
            .withf(|email: &str| email == "ana@x.com")
            .returning(|_| Ok(Some(create_test_student(1))));

        let principal = mocks
            .build()
            .load_credentials_by_username("ana@x.com")
            .await
            .unwrap();

        assert_eq!(principal.username, "ana@x.com");
        assert_eq!(principal.password, "encoded:pw1");
        assert_eq!(principal.role, "STUDENT");
    }

    #[tokio::test]
    async fn test_load_credentials_unknown_user() {
        let mut mocks = Mocks::new();
        mocks.students.expect_find_by_email().returning(|_| Ok(None));

        let result = mocks.build().load_credentials_by_username("nobody@x.com").await;
        assert!(matches!(result, Err(AppError::UsernameNotFound(_))));
    }

    #[test]
    fn test_enrollment_cutoff() {
        assert_eq!(enrollment_cutoff(date(2026, 10, 16), 2).unwrap(), date(2024, 10, 16));
        assert_eq!(enrollment_cutoff(date(2024, 2, 29), 1).unwrap(), date(2023, 2, 28));
        assert_eq!(enrollment_cutoff(date(2026, 10, 16), 0).unwrap(), date(2026, 10, 16));
        assert!(matches!(
            enrollment_cutoff(date(2026, 10, 16), u32::MAX),
            Err(AppError::Validation(_))
        ));
    }
}
