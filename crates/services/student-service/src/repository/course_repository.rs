//! Course repository implementation backed by PostgreSQL.

use async_trait::async_trait;
use std::sync::Arc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::entities::course::{self, Entity as CourseEntity};
use common::AppResult;
use domain::{Course, CourseId};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Course repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Find course by ID
    async fn find_by_id(&self, id: CourseId) -> AppResult<Option<Course>>;

    /// Find the courses matching any of `ids`; ids without a course are skipped
    async fn find_all_by_id(&self, ids: &[CourseId]) -> AppResult<Vec<Course>>;

    /// List every course
    async fn find_all(&self) -> AppResult<Vec<Course>>;
}

/// Concrete implementation of CourseRepository
pub struct CourseStore {
    db: Arc<DatabaseConnection>,
}

impl CourseStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepository for CourseStore {
    async fn find_by_id(&self, id: CourseId) -> AppResult<Option<Course>> {
        let result = CourseEntity::find_by_id(id).one(self.db.as_ref()).await?;
        Ok(result.map(Course::from))
    }

    async fn find_all_by_id(&self, ids: &[CourseId]) -> AppResult<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = CourseEntity::find()
            .filter(course::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(course::Column::Id)
            .all(self.db.as_ref())
            .await?;

        tracing::debug!(requested = ids.len(), found = models.len(), "Resolved courses");
        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn find_all(&self) -> AppResult<Vec<Course>> {
        let models = CourseEntity::find()
            .order_by_asc(course::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Course::from).collect())
    }
}
