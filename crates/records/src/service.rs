use crate::models::{CreateRecordsRequest, RawCreateRecordsRequest, Record};
use crate::repository::RecordRepository;
use common::{ChangeFeed, RecordChange};
use database::{Database, RepositoryError};
use rollup::{LedgerTotals, MonthKey, RecordKind, compute_ledger_totals};
use tracing::instrument;
use validator::Validate;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Record not found")]
    NotFound,
}

impl From<RepositoryError> for RecordError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => RecordError::NotFound,
            RepositoryError::CheckViolation(msg) => RecordError::InvalidInput(msg),
            RepositoryError::Infrastructure(e) => RecordError::Infrastructure(e.to_string()),
            _ => RecordError::Infrastructure(err.to_string()),
        }
    }
}

pub struct RecordService;

impl RecordService {
    /// Stores every line item of one submission atomically and announces the
    /// new ids on the feed once committed.
    #[instrument(skip(db, feed))]
    pub async fn create_records(
        db: &Database,
        feed: &ChangeFeed,
        raw: RawCreateRecordsRequest,
    ) -> Result<Vec<i64>, RecordError> {
        raw.validate()
            .map_err(|e| RecordError::InvalidInput(e.to_string()))?;
        let req = CreateRecordsRequest::from_raw(raw).map_err(RecordError::InvalidInput)?;

        let created_at = chrono::Utc::now().timestamp_millis();

        let mut uow = db.begin().await?;
        let mut repo = RecordRepository::new(uow.connection());

        let ids = repo.create(&req, created_at).await?;

        uow.commit().await?;

        tracing::info!(kind = %req.kind(), count = ids.len(), "records created");
        feed.publish(&RecordChange::Added(ids.clone()));

        Ok(ids)
    }

    #[instrument(skip(db))]
    pub async fn list_records(db: &Database) -> Result<Vec<Record>, RecordError> {
        let mut uow = db.begin().await?;
        let mut repo = RecordRepository::new(uow.connection());

        let records = repo.list_all().await?;
        Ok(records)
    }

    #[instrument(skip(db))]
    pub async fn get_record(db: &Database, id: i64) -> Result<Record, RecordError> {
        let mut uow = db.begin().await?;
        let mut repo = RecordRepository::new(uow.connection());

        let record = repo.find_by_id(id).await?
            .ok_or(RecordError::NotFound)?;

        Ok(record)
    }

    #[instrument(skip(db))]
    pub async fn list_month(
        db: &Database,
        kind: RecordKind,
        month: MonthKey,
    ) -> Result<Vec<Record>, RecordError> {
        let mut uow = db.begin().await?;
        let mut repo = RecordRepository::new(uow.connection());

        let records = repo.list_by_month(kind.as_str(), &month.to_string()).await?;
        Ok(records)
    }

    /// Records of `kind` dated anywhere from the first day of `first` to the
    /// last day of `last`.
    #[instrument(skip(db))]
    pub async fn list_months(
        db: &Database,
        kind: RecordKind,
        first: MonthKey,
        last: MonthKey,
    ) -> Result<Vec<Record>, RecordError> {
        let (Some(from), Some(to)) = (first.first_day(), last.last_day()) else {
            return Err(RecordError::InvalidInput(format!(
                "Month range {}..{} is out of range",
                first, last
            )));
        };

        let mut uow = db.begin().await?;
        let mut repo = RecordRepository::new(uow.connection());

        let records = repo
            .list_between(
                kind.as_str(),
                &from.format("%Y-%m-%d").to_string(),
                &to.format("%Y-%m-%d").to_string(),
            )
            .await?;
        Ok(records)
    }

    #[instrument(skip(db))]
    pub async fn ledger_totals(db: &Database) -> Result<LedgerTotals, RecordError> {
        let records = Self::list_records(db).await?;
        Ok(compute_ledger_totals(&records))
    }

    #[instrument(skip(db, feed))]
    pub async fn delete_record(db: &Database, feed: &ChangeFeed, id: i64) -> Result<(), RecordError> {
        let mut uow = db.begin().await?;
        let mut repo = RecordRepository::new(uow.connection());

        repo.delete(id).await?;

        uow.commit().await?;

        feed.publish(&RecordChange::Removed(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawLineItem;
    use database::get_test_db;
    use rollup::RawAmount;
    use std::sync::{Arc, Mutex};

    fn raw(kind: RecordKind, date: &str, items: &[(&str, f64)]) -> RawCreateRecordsRequest {
        RawCreateRecordsRequest {
            kind,
            payment: "Cash".into(),
            date: date.into(),
            notes: None,
            items: items
                .iter()
                .map(|(c, a)| RawLineItem {
                    category: c.to_string(),
                    amount: Some(RawAmount::Number(*a)),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_publishes_after_commit() {
        let db = get_test_db().await;
        let feed = ChangeFeed::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = feed.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

        let ids = RecordService::create_records(
            &db,
            &feed,
            raw(RecordKind::Sale, "2024-02-01", &[("Retail", 10.0), ("Services", 2.5)]),
        )
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![RecordChange::Added(ids.clone())]);
        assert_eq!(RecordService::list_records(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_submission_publishes_nothing() {
        let db = get_test_db().await;
        let feed = ChangeFeed::new();
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let _sub = feed.subscribe(move |_| *sink.lock().unwrap() += 1);

        let err = RecordService::create_records(
            &db,
            &feed,
            raw(RecordKind::Expense, "2024-02-01", &[("Food", 0.0)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RecordError::InvalidInput(_)));
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unstorable_amounts_are_invalid_input() {
        let db = get_test_db().await;
        let feed = ChangeFeed::new();

        for amount in [1e300, 0.001] {
            let err = RecordService::create_records(
                &db,
                &feed,
                raw(RecordKind::Sale, "2024-02-01", &[("Retail", amount)]),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, RecordError::InvalidInput(_)));
        }
        assert!(RecordService::list_records(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overlong_category_fails_validation() {
        let db = get_test_db().await;
        let feed = ChangeFeed::new();
        let long = "x".repeat(65);

        let err = RecordService::create_records(
            &db,
            &feed,
            raw(RecordKind::Expense, "2024-02-01", &[(long.as_str(), 1.0)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RecordError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_month_listing_and_totals() {
        let db = get_test_db().await;
        let feed = ChangeFeed::new();

        RecordService::create_records(&db, &feed, raw(RecordKind::Sale, "2024-02-03", &[("Retail", 300.0)])).await.unwrap();
        RecordService::create_records(&db, &feed, raw(RecordKind::Sale, "2024-01-03", &[("Retail", 20.0)])).await.unwrap();
        RecordService::create_records(&db, &feed, raw(RecordKind::Expense, "2024-02-04", &[("Rent", 120.0)])).await.unwrap();

        let feb: MonthKey = "2024-02".parse().unwrap();
        let sales = RecordService::list_month(&db, RecordKind::Sale, feb).await.unwrap();
        assert_eq!(sales.len(), 1);

        let span = RecordService::list_months(&db, RecordKind::Sale, feb.offset(-5), feb).await.unwrap();
        assert_eq!(span.len(), 2);

        let totals = RecordService::ledger_totals(&db).await.unwrap();
        assert_eq!(totals.sales, 320.0);
        assert_eq!(totals.expenses, 120.0);
        assert_eq!(totals.profit, 200.0);
        assert_eq!(totals.record_count, 3);
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let db = get_test_db().await;
        let feed = ChangeFeed::new();

        let err = RecordService::delete_record(&db, &feed, 99).await.unwrap_err();
        assert!(matches!(err, RecordError::NotFound));
    }
}
