//! Student repository implementation backed by PostgreSQL.

use async_trait::async_trait;
use std::sync::Arc;
use chrono::NaiveDate;
use sea_orm::sea_query::{Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    LoaderTrait, ModelTrait, QueryFilter, QueryOrder, Select, Set, SqlErr, TransactionTrait,
};

use super::entities::{
    course,
    student::{self, ActiveModel, Entity as StudentEntity},
    student_course,
};
use common::{AppError, AppResult};
use domain::{Course, NewStudent, Student, StudentId};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Student repository trait for dependency injection.
///
/// All list queries return students in ascending id order, each with its
/// full course set loaded.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// List every student
    async fn find_all(&self) -> AppResult<Vec<Student>>;

    /// Find student by ID
    async fn find_by_id(&self, id: StudentId) -> AppResult<Option<Student>>;

    /// Find student by email address (the login username)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Student>>;

    /// Students whose enrollment date is strictly before `date`
    async fn find_all_by_enrollment_date_before(&self, date: NaiveDate) -> AppResult<Vec<Student>>;

    /// Students enrolled in `course`
    async fn find_all_by_courses_containing(&self, course: &Course) -> AppResult<Vec<Student>>;

    /// Students enrolled in `course` whose enrollment date is strictly before `date`
    async fn find_all_by_courses_containing_and_enrollment_date_before(
        &self,
        course: &Course,
        date: NaiveDate,
    ) -> AppResult<Vec<Student>>;

    /// Persist a new student; the store assigns the id
    async fn insert(&self, student: NewStudent) -> AppResult<Student>;

    /// Persist every field of an existing student, replacing its course set
    async fn update(&self, student: Student) -> AppResult<Student>;

    /// Remove a student and its course associations
    async fn delete(&self, student: &Student) -> AppResult<()>;
}

/// Concrete implementation of StudentRepository
pub struct StudentStore {
    db: Arc<DatabaseConnection>,
}

impl StudentStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Run a student query and attach each row's courses.
    async fn fetch(&self, query: Select<StudentEntity>) -> AppResult<Vec<Student>> {
        let models = query
            .order_by_asc(student::Column::Id)
            .all(self.db.as_ref())
            .await?;

        if models.is_empty() {
            return Ok(Vec::new());
        }

        let courses = models
            .load_many_to_many(
                course::Entity::find().order_by_asc(course::Column::Id),
                student_course::Entity,
                self.db.as_ref(),
            )
            .await?;

        models
            .into_iter()
            .zip(courses)
            .map(|(model, courses)| model.into_student(courses))
            .collect()
    }

    /// Load one row's courses.
    async fn attach_courses(&self, model: student::Model) -> AppResult<Student> {
        let courses = model
            .find_related(course::Entity)
            .order_by_asc(course::Column::Id)
            .all(self.db.as_ref())
            .await?;

        model.into_student(courses)
    }
}

/// `students.id IN (SELECT student_id FROM student_courses WHERE course_id = ?)`
fn enrolled_in(course: &Course) -> SimpleExpr {
    student::Column::Id.in_subquery(
        Query::select()
            .column(student_course::Column::StudentId)
            .from(student_course::Entity)
            .and_where(student_course::Column::CourseId.eq(course.id))
            .to_owned(),
    )
}

/// Map a failed student row write, turning the unique email index into a
/// conflict.
fn write_error(err: DbErr) -> AppError {
    let sql_err = err.sql_err();
    classify_write_error(err, sql_err)
}

fn classify_write_error(err: DbErr, sql_err: Option<SqlErr>) -> AppError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Email"),
        _ => AppError::from(err),
    }
}

/// Write the association rows for one student.
async fn link_courses<C: ConnectionTrait>(
    conn: &C,
    student_id: StudentId,
    courses: &[Course],
) -> Result<(), DbErr> {
    if courses.is_empty() {
        return Ok(());
    }

    let rows = courses.iter().map(|course| student_course::ActiveModel {
        student_id: Set(student_id),
        course_id: Set(course.id),
    });

    student_course::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Drop every association row of one student.
async fn unlink_courses<C: ConnectionTrait>(conn: &C, student_id: StudentId) -> Result<(), DbErr> {
    student_course::Entity::delete_many()
        .filter(student_course::Column::StudentId.eq(student_id))
        .exec(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl StudentRepository for StudentStore {
    async fn find_all(&self) -> AppResult<Vec<Student>> {
        self.fetch(StudentEntity::find()).await
    }

    async fn find_by_id(&self, id: StudentId) -> AppResult<Option<Student>> {
        match StudentEntity::find_by_id(id).one(self.db.as_ref()).await? {
            Some(model) => self.attach_courses(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Student>> {
        let result = StudentEntity::find()
            .filter(student::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?;

        match result {
            Some(model) => self.attach_courses(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_all_by_enrollment_date_before(&self, date: NaiveDate) -> AppResult<Vec<Student>> {
        self.fetch(StudentEntity::find().filter(student::Column::EnrollmentDate.lt(date)))
            .await
    }

    async fn find_all_by_courses_containing(&self, course: &Course) -> AppResult<Vec<Student>> {
        self.fetch(StudentEntity::find().filter(enrolled_in(course)))
            .await
    }

    async fn find_all_by_courses_containing_and_enrollment_date_before(
        &self,
        course: &Course,
        date: NaiveDate,
    ) -> AppResult<Vec<Student>> {
        self.fetch(
            StudentEntity::find()
                .filter(enrolled_in(course))
                .filter(student::Column::EnrollmentDate.lt(date)),
        )
        .await
    }

    async fn insert(&self, student: NewStudent) -> AppResult<Student> {
        let txn = self.db.begin().await?;

        let model = ActiveModel::from(&student)
            .insert(&txn)
            .await
            .map_err(write_error)?;
        link_courses(&txn, model.id, &student.courses).await?;

        txn.commit().await?;

        tracing::info!(student_id = model.id, "Inserted student");
        Ok(student.with_id(model.id))
    }

    async fn update(&self, student: Student) -> AppResult<Student> {
        let txn = self.db.begin().await?;

        match ActiveModel::from(&student).update(&txn).await {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => return Err(AppError::not_found("Student")),
            Err(e) => return Err(write_error(e)),
        }
        unlink_courses(&txn, student.id).await?;
        link_courses(&txn, student.id, &student.courses).await?;

        txn.commit().await?;

        tracing::info!(student_id = student.id, "Updated student");
        Ok(student)
    }

    async fn delete(&self, student: &Student) -> AppResult<()> {
        let txn = self.db.begin().await?;

        unlink_courses(&txn, student.id).await?;
        let result = StudentEntity::delete_by_id(student.id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Student"));
        }

        txn.commit().await?;

        tracing::info!(student_id = student.id, "Deleted student");
        Ok(())
    }
}
