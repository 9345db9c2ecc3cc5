//! Maintenance request domain methods on Repository

use chrono::NaiveDate;

use super::{constraint_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestStatus,
        request::{MaintenanceRequest, RequestFilter, RequestInput, StatusChange},
    },
};

/// WHERE clause for the set fields of `filter`, numbered in the order
/// `bind_filter!` binds them
fn filter_clause(filter: &RequestFilter) -> String {
    let mut conditions = Vec::new();
    let mut idx = 1;

    macro_rules! add_condition {
        ($field:expr, $clause:literal) => {
            if $field.is_some() {
                conditions.push(format!($clause, idx));
                idx += 1;
            }
        };
    }

    add_condition!(filter.status, "status = ${}");
    add_condition!(filter.request_type, "request_type = ${}");
    add_condition!(filter.scheduled_from, "scheduled_date >= ${}");
    add_condition!(filter.scheduled_to, "scheduled_date <= ${}");
    add_condition!(filter.equipment_id, "equipment_id = ${}");
    add_condition!(filter.team_id, "team_id = ${}");
    add_condition!(filter.open, "(status IN ('New', 'In Progress')) = ${}");

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

macro_rules! bind_filter {
    ($builder:ident, $filter:expr) => {
        if let Some(val) = $filter.status { $builder = $builder.bind(val); }
        if let Some(val) = $filter.request_type { $builder = $builder.bind(val); }
        if let Some(val) = $filter.scheduled_from { $builder = $builder.bind(val); }
        if let Some(val) = $filter.scheduled_to { $builder = $builder.bind(val); }
        if let Some(val) = $filter.equipment_id { $builder = $builder.bind(val); }
        if let Some(val) = $filter.team_id { $builder = $builder.bind(val); }
        if let Some(val) = $filter.open { $builder = $builder.bind(val); }
    };
}

impl Repository {
    pub async fn requests_find(&self, id: i32) -> AppResult<Option<MaintenanceRequest>> {
        let row = sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Requests matching every set filter field, ordered by id
    pub async fn requests_query(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>> {
        let sql = format!("SELECT * FROM maintenance_requests {} ORDER BY id", filter_clause(filter));

        let mut builder = sqlx::query_as::<_, MaintenanceRequest>(&sql);
        bind_filter!(builder, filter);

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn requests_count(&self, filter: &RequestFilter) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM maintenance_requests {}", filter_clause(filter));

        let mut builder = sqlx::query_scalar::<_, i64>(&sql);
        bind_filter!(builder, filter);

        let count = builder.fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Row count per status; statuses without requests are absent
    pub async fn requests_count_by_status(&self) -> AppResult<Vec<(RequestStatus, i64)>> {
        let rows = sqlx::query_as::<_, (RequestStatus, i64)>(
            "SELECT status, COUNT(*) FROM maintenance_requests GROUP BY status"
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Open requests scheduled before `today`, oldest schedule first
    pub async fn requests_overdue(&self, today: NaiveDate) -> AppResult<Vec<MaintenanceRequest>> {
        let rows = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            SELECT * FROM maintenance_requests
            WHERE status IN ('New', 'In Progress') AND scheduled_date < $1
            ORDER BY scheduled_date, id
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn requests_create(&self, data: &RequestInput) -> AppResult<MaintenanceRequest> {
        sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests (subject, request_type, equipment_id, team_id,
                                              technician_id, scheduled_date, duration_hours,
                                              status, priority)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&data.subject)
        .bind(data.request_type)
        .bind(data.equipment_id)
        .bind(data.team_id)
        .bind(data.technician_id)
        .bind(data.scheduled_date)
        .bind(data.duration_hours)
        .bind(RequestStatus::New)
        .bind(data.priority)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "Request"))
    }

    /// Edit every field except status
    pub async fn requests_update(&self, id: i32, data: &RequestInput) -> AppResult<MaintenanceRequest> {
        sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET subject = $1, request_type = $2, equipment_id = $3, team_id = $4,
                technician_id = $5, scheduled_date = $6, duration_hours = $7, priority = $8
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&data.subject)
        .bind(data.request_type)
        .bind(data.equipment_id)
        .bind(data.team_id)
        .bind(data.technician_id)
        .bind(data.scheduled_date)
        .bind(data.duration_hours)
        .bind(data.priority)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "Request"))?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    pub async fn requests_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Request {} not found", id)));
        }
        Ok(())
    }

    /// Status and scrap flag commit together. The equipment is the one the
    /// updated row points at, read under the row lock taken by the UPDATE.
    /// Any early return drops the transaction, which rolls it back.
    pub async fn requests_commit_status_change(&self, change: &StatusChange) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, MaintenanceRequest>(
            "UPDATE maintenance_requests SET status = $1 WHERE id = $2 RETURNING *"
        )
        .bind(change.status)
        .bind(change.request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", change.request_id)))?;

        if change.scrap {
            let result = sqlx::query("UPDATE equipment SET is_scrapped = TRUE WHERE id = $1")
                .bind(request.equipment_id)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::InconsistentState(format!(
                    "Request {} references missing equipment {}",
                    change.request_id, request.equipment_id
                )));
            }
        }

        tx.commit().await?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clause_numbers_set_fields() {
        assert_eq!(filter_clause(&RequestFilter::default()), "");

        let filter = RequestFilter {
            status: Some(RequestStatus::New),
            team_id: Some(4),
            open: Some(true),
            ..Default::default()
        };
        assert_eq!(
            filter_clause(&filter),
            "WHERE status = $1 AND team_id = $2 AND (status IN ('New', 'In Progress')) = $3"
        );
    }
}
