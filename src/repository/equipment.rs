//! Equipment domain methods on Repository

use super::{constraint_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::equipment::{Equipment, EquipmentInput, EquipmentQuery},
};

/// ILIKE pattern matching `term` literally anywhere in the column
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Repository {
    /// List equipment matching the query, ordered by name
    pub async fn equipment_list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.department.is_some() {
            conditions.push(format!("department = ${}", idx));
            idx += 1;
        }
        if query.employee.is_some() {
            conditions.push(format!("assigned_employee = ${}", idx));
            idx += 1;
        }
        if query.search.is_some() {
            conditions.push(format!(
                "(name ILIKE ${0} ESCAPE '\\' OR serial_number ILIKE ${0} ESCAPE '\\')",
                idx
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("SELECT * FROM equipment {} ORDER BY name, id", where_clause);

        let mut builder = sqlx::query_as::<_, Equipment>(&sql);
        if let Some(ref department) = query.department { builder = builder.bind(department); }
        if let Some(ref employee) = query.employee { builder = builder.bind(employee); }
        if let Some(ref search) = query.search { builder = builder.bind(contains_pattern(search)); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Registry size as (total, scrapped)
    pub async fn equipment_count(&self) -> AppResult<(i64, i64)> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_scrapped) FROM equipment"
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn equipment_count_for_team(&self, team_id: i32) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM equipment WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn equipment_find(&self, id: i32) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Create equipment (never scrapped at creation)
    pub async fn equipment_create(&self, data: &EquipmentInput) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (name, serial_number, department, assigned_employee,
                                   purchase_date, warranty_expiry, location, team_id,
                                   default_technician_id, is_scrapped)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.serial_number)
        .bind(&data.department)
        .bind(&data.assigned_employee)
        .bind(data.purchase_date)
        .bind(data.warranty_expiry)
        .bind(&data.location)
        .bind(data.team_id)
        .bind(data.default_technician_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, &format!("Equipment with serial '{}'", data.serial_number)))
    }

    /// Replace every editable field; `is_scrapped` is left untouched
    pub async fn equipment_update(&self, id: i32, data: &EquipmentInput) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment
            SET name = $1, serial_number = $2, department = $3, assigned_employee = $4,
                purchase_date = $5, warranty_expiry = $6, location = $7, team_id = $8,
                default_technician_id = $9
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.serial_number)
        .bind(&data.department)
        .bind(&data.assigned_employee)
        .bind(data.purchase_date)
        .bind(data.warranty_expiry)
        .bind(&data.location)
        .bind(data.team_id)
        .bind(data.default_technician_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| constraint_error(e, &format!("Equipment with serial '{}'", data.serial_number)))?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    pub async fn equipment_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, &format!("Equipment {}", id)))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }
}
