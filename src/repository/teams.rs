//! Team and technician domain methods on Repository

use super::{constraint_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::team::{MaintenanceTeam, TeamInput, Technician, TechnicianInput},
};

impl Repository {
    // ---- Teams ----

    /// List all teams ordered by name
    pub async fn teams_list(&self) -> AppResult<Vec<MaintenanceTeam>> {
        let rows = sqlx::query_as::<_, MaintenanceTeam>(
            "SELECT * FROM maintenance_teams ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn teams_find(&self, id: i32) -> AppResult<Option<MaintenanceTeam>> {
        let row = sqlx::query_as::<_, MaintenanceTeam>("SELECT * FROM maintenance_teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn teams_create(&self, data: &TeamInput) -> AppResult<MaintenanceTeam> {
        sqlx::query_as::<_, MaintenanceTeam>(
            "INSERT INTO maintenance_teams (name) VALUES ($1) RETURNING *"
        )
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, &format!("Team '{}'", data.name)))
    }

    pub async fn teams_rename(&self, id: i32, data: &TeamInput) -> AppResult<MaintenanceTeam> {
        sqlx::query_as::<_, MaintenanceTeam>(
            "UPDATE maintenance_teams SET name = $1 WHERE id = $2 RETURNING *"
        )
        .bind(&data.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| constraint_error(e, &format!("Team '{}'", data.name)))?
        .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))
    }

    /// Delete a team and its technicians in one transaction. Equipment and
    /// requests hold a RESTRICT reference, so a referenced team fails here.
    pub async fn teams_delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM technicians WHERE team_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM maintenance_teams WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| constraint_error(e, &format!("Team {}", id)))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Team {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    // ---- Technicians ----

    pub async fn technicians_list(&self, team_id: i32) -> AppResult<Vec<Technician>> {
        let rows = sqlx::query_as::<_, Technician>(
            "SELECT * FROM technicians WHERE team_id = $1 ORDER BY name"
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn technicians_find(&self, id: i32) -> AppResult<Option<Technician>> {
        let row = sqlx::query_as::<_, Technician>("SELECT * FROM technicians WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn technicians_create(&self, team_id: i32, data: &TechnicianInput) -> AppResult<Technician> {
        sqlx::query_as::<_, Technician>(
            "INSERT INTO technicians (name, team_id) VALUES ($1, $2) RETURNING *"
        )
        .bind(&data.name)
        .bind(team_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, &format!("Technician '{}'", data.name)))
    }

    /// Equipment defaults and request assignments are cleared by ON DELETE SET NULL
    pub async fn technicians_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM technicians WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Technician {} not found", id)));
        }
        Ok(())
    }
}
