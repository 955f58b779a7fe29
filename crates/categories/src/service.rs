use crate::models::{Category, CategoryOptions, CreateCategoryRequest, RawCreateCategoryRequest, default_categories};
use crate::repository::CategoryRepository;
use database::{Database, RepositoryError};
use rollup::RecordKind;
use tracing::instrument;
use validator::Validate;

pub const DUPLICATE_CATEGORY: &str = "Category already exists.";

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Category already exists.")]
    Conflict,
    #[error("Category not found")]
    NotFound,
}

impl From<RepositoryError> for CategoryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => CategoryError::NotFound,
            RepositoryError::UniqueViolation(_) => CategoryError::Conflict,
            RepositoryError::CheckViolation(msg) => CategoryError::InvalidInput(msg),
            RepositoryError::Infrastructure(e) => CategoryError::Infrastructure(e.to_string()),
            _ => CategoryError::Infrastructure(err.to_string()),
        }
    }
}

pub struct CategoryService;

impl CategoryService {
    #[instrument(skip(db))]
    pub async fn create_category(
        db: &Database,
        raw: RawCreateCategoryRequest,
    ) -> Result<Category, CategoryError> {
        raw.validate()
            .map_err(|e| CategoryError::InvalidInput(e.to_string()))?;
        let req = CreateCategoryRequest::new(raw.name, raw.kind)
            .map_err(CategoryError::InvalidInput)?;

        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        if repo.find_by_name(req.kind().as_str(), req.name()).await?.is_some() {
            return Err(CategoryError::Conflict);
        }

        let created_at = chrono::Utc::now().timestamp_millis();
        let id = repo.create(&req, created_at).await?;

        uow.commit().await?;

        tracing::info!(id, kind = %req.kind(), "category created");
        Ok(Category {
            id,
            name: req.name().to_string(),
            kind: req.kind(),
            created_at,
        })
    }

    #[instrument(skip(db))]
    pub async fn list_categories(db: &Database) -> Result<Vec<Category>, CategoryError> {
        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let categories = repo.list().await?;
        Ok(categories)
    }

    /// Stored names for `kind`, or the built-in defaults while none exist.
    #[instrument(skip(db))]
    pub async fn options_for_kind(
        db: &Database,
        kind: RecordKind,
    ) -> Result<CategoryOptions, CategoryError> {
        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let stored = repo.list_by_kind(kind.as_str()).await?;
        if stored.is_empty() {
            return Ok(CategoryOptions {
                kind,
                names: default_categories(kind).iter().map(|s| s.to_string()).collect(),
                is_default: true,
            });
        }

        Ok(CategoryOptions {
            kind,
            names: stored.into_iter().map(|c| c.name).collect(),
            is_default: false,
        })
    }

    #[instrument(skip(db))]
    pub async fn delete_category(db: &Database, id: i64) -> Result<(), CategoryError> {
        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        repo.delete(id).await?;

        uow.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::get_test_db;

    fn raw(name: &str, kind: RecordKind) -> RawCreateCategoryRequest {
        RawCreateCategoryRequest {
            name: name.to_string(),
            kind,
        }
    }

    #[tokio::test]
    async fn test_options_fall_back_to_defaults() {
        let db = get_test_db().await;

        let options = CategoryService::options_for_kind(&db, RecordKind::Expense).await.unwrap();
        assert!(options.is_default);
        assert_eq!(options.names, vec!["Food", "Beverage", "Supplies", "Rent", "Misc"]);
    }

    #[tokio::test]
    async fn test_options_use_stored_names() {
        let db = get_test_db().await;
        CategoryService::create_category(&db, raw("Wholesale", RecordKind::Sale)).await.unwrap();
        CategoryService::create_category(&db, raw("catering", RecordKind::Sale)).await.unwrap();

        let options = CategoryService::options_for_kind(&db, RecordKind::Sale).await.unwrap();
        assert!(!options.is_default);
        assert_eq!(options.names, vec!["catering", "Wholesale"]);

        let expense = CategoryService::options_for_kind(&db, RecordKind::Expense).await.unwrap();
        assert!(expense.is_default);
    }

    #[tokio::test]
    async fn test_duplicate_ignores_case() {
        let db = get_test_db().await;
        CategoryService::create_category(&db, raw("Rent", RecordKind::Expense)).await.unwrap();

        let err = CategoryService::create_category(&db, raw(" rent ", RecordKind::Expense))
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::Conflict));
        assert_eq!(err.to_string(), "Category already exists.");
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let db = get_test_db().await;

        let err = CategoryService::create_category(&db, raw("  ", RecordKind::Sale)).await.unwrap_err();
        assert!(matches!(err, CategoryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let db = get_test_db().await;

        let err = CategoryService::delete_category(&db, 7).await.unwrap_err();
        assert!(matches!(err, CategoryError::NotFound));
    }
}
