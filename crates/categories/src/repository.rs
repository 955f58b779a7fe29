use crate::models::{Category, CreateCategoryRequest};
use database::{self, RepositoryError};
use sqlx::FromRow;

#[derive(FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    kind: String,
    created_at: i64,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: row.id,
            name: row.name,
            kind: row.kind.parse().map_err(RepositoryError::CheckViolation)?,
            created_at: row.created_at,
        })
    }
}

pub(crate) struct CategoryRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, req: &CreateCategoryRequest, created_at: i64) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO record_categories (name, kind, created_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(req.name())
        .bind(req.kind().as_str())
        .bind(created_at)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn list(&mut self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, kind, created_at FROM record_categories ORDER BY name COLLATE NOCASE, id",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    pub async fn list_by_kind(&mut self, kind: &str) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, kind, created_at FROM record_categories WHERE kind = $1 ORDER BY name COLLATE NOCASE, id",
        )
        .bind(kind)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    /// Case-insensitive lookup within one kind.
    pub async fn find_by_name(&mut self, kind: &str, name: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, kind, created_at FROM record_categories WHERE kind = $1 AND name = $2 COLLATE NOCASE",
        )
        .bind(kind)
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Category::try_from).transpose()
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM record_categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::get_test_db;
    use rollup::RecordKind;

    fn req(name: &str, kind: RecordKind) -> CreateCategoryRequest {
        CreateCategoryRequest::new(name.to_string(), kind).unwrap()
    }

    #[tokio::test]
    async fn test_create_category() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&req("Cigarette", RecordKind::Sale), 5).await.unwrap();
        assert!(id > 0);

        let cat = repo.find_by_name("Sale", "cigarette").await.unwrap().unwrap();
        assert_eq!(cat.id, id);
        assert_eq!(cat.name, "Cigarette");
        assert_eq!(cat.kind, RecordKind::Sale);
    }

    #[tokio::test]
    async fn test_list_sorted_case_insensitively() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        repo.create(&req("beverage", RecordKind::Expense), 1).await.unwrap();
        repo.create(&req("Utilities", RecordKind::Expense), 2).await.unwrap();
        repo.create(&req("Apparel", RecordKind::Sale), 3).await.unwrap();

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Apparel", "beverage", "Utilities"]);

        let expense = repo.list_by_kind("Expense").await.unwrap();
        assert_eq!(expense.len(), 2);
    }

    #[tokio::test]
    async fn test_same_name_allowed_across_kinds() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        repo.create(&req("Food", RecordKind::Sale), 1).await.unwrap();
        repo.create(&req("Food", RecordKind::Expense), 1).await.unwrap();
        let dup = repo.create(&req("FOOD", RecordKind::Expense), 1).await;
        assert!(matches!(dup, Err(RepositoryError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_delete_category() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&req("Delete Me", RecordKind::Sale), 1).await.unwrap();
        repo.delete(id).await.unwrap();
        assert!(repo.find_by_name("Sale", "Delete Me").await.unwrap().is_none());
        assert!(matches!(repo.delete(id).await, Err(RepositoryError::NotFound)));
    }
}
