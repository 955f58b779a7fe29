use crate::models::{CreateRecordsRequest, Record};
use database::{self, RepositoryError};
use sqlx::FromRow;

#[derive(FromRow)]
struct RecordRow {
    id: i64,
    kind: String,
    category: String,
    amount: i64,
    payment: String,
    record_date: String,
    notes: Option<String>,
    created_at: i64,
}

impl TryFrom<RecordRow> for Record {
    type Error = RepositoryError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse().map_err(RepositoryError::CheckViolation)?;
        Ok(Record {
            id: row.id,
            kind,
            category: row.category,
            amount: row.amount,
            payment: row.payment,
            record_date: row.record_date,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

fn into_records(rows: Vec<RecordRow>) -> Result<Vec<Record>, RepositoryError> {
    rows.into_iter().map(Record::try_from).collect()
}

const SELECT_RECORDS: &str =
    "SELECT id, kind, category, amount, payment, record_date, notes, created_at FROM records";

pub(crate) struct RecordRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> RecordRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    /// Inserts every line item of `req`; all rows share `created_at`.
    pub async fn create(&mut self, req: &CreateRecordsRequest, created_at: i64) -> Result<Vec<i64>, RepositoryError> {
        let mut ids = Vec::with_capacity(req.items().len());
        for item in req.items() {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO records (kind, category, amount, payment, record_date, notes, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
            )
            .bind(req.kind().as_str())
            .bind(item.category())
            .bind(item.amount())
            .bind(req.payment())
            .bind(req.record_date())
            .bind(req.notes())
            .bind(created_at)
            .fetch_one(&mut *self.conn)
            .await?;
            ids.push(id);
        }
        Ok(ids)
    }

    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Record>, RepositoryError> {
        let row = sqlx::query_as::<_, RecordRow>(&format!("{} WHERE id = $1", SELECT_RECORDS))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        row.map(Record::try_from).transpose()
    }

    /// Newest first.
    pub async fn list_all(&mut self) -> Result<Vec<Record>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "{} ORDER BY created_at DESC, id DESC",
            SELECT_RECORDS
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        into_records(rows)
    }

    pub async fn list_by_month(&mut self, kind: &str, month: &str) -> Result<Vec<Record>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "{} WHERE kind = $1 AND strftime('%Y-%m', record_date) = $2 ORDER BY created_at DESC, id DESC",
            SELECT_RECORDS
        ))
        .bind(kind)
        .bind(month)
        .fetch_all(&mut *self.conn)
        .await?;

        into_records(rows)
    }

    /// Inclusive on both ends; dates are `YYYY-MM-DD` so text order is date order.
    pub async fn list_between(&mut self, kind: &str, from: &str, to: &str) -> Result<Vec<Record>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "{} WHERE kind = $1 AND record_date >= $2 AND record_date <= $3 ORDER BY created_at DESC, id DESC",
            SELECT_RECORDS
        ))
        .bind(kind)
        .bind(from)
        .bind(to)
        .fetch_all(&mut *self.conn)
        .await?;

        into_records(rows)
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM records WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
