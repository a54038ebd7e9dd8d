use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::models::{DbSeries, SeriesFields, SeriesSummary, decode_ts, encode_ts};
use super::sqlite::PresenterStorage;
use crate::error::PresenterError;

const SERIES_SUMMARY_SELECT: &str = r#"
    SELECT s.id, s.name, s.description, s.min_value, s.max_value, s.unit, s.color, s.icon,
           s.created_at, s.is_active,
           (SELECT COUNT(*) FROM measurements m WHERE m.series_id = s.id) AS measurement_count
    FROM series s"#;

impl PresenterStorage {
    pub async fn list_series(&self) -> Result<Vec<SeriesSummary>, PresenterError> {
        let rows = sqlx::query(&format!("{SERIES_SUMMARY_SELECT} ORDER BY s.id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(series_summary_from_row).collect()
    }

    pub async fn get_series_summary(
        &self,
        id: i64,
    ) -> Result<Option<SeriesSummary>, PresenterError> {
        let row = sqlx::query(&format!("{SERIES_SUMMARY_SELECT} WHERE s.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(series_summary_from_row).transpose()
    }

    pub async fn find_series(&self, id: i64) -> Result<Option<DbSeries>, PresenterError> {
        let row = sqlx::query(
            r#"SELECT id, name, description, min_value, max_value, unit, color, icon,
               created_at, is_active FROM series WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(series_from_row).transpose()
    }

    pub async fn insert_series(&self, fields: SeriesFields) -> Result<DbSeries, PresenterError> {
        let created_at = Utc::now();
        let id = sqlx::query(
            r#"INSERT INTO series (
                name, description, min_value, max_value, unit, color, icon, created_at, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.min_value)
        .bind(fields.max_value)
        .bind(&fields.unit)
        .bind(&fields.color)
        .bind(&fields.icon)
        .bind(encode_ts(&created_at))
        .bind(fields.is_active as i64)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(DbSeries {
            id,
            name: fields.name,
            description: fields.description,
            min_value: fields.min_value,
            max_value: fields.max_value,
            unit: fields.unit,
            color: fields.color,
            icon: fields.icon,
            created_at,
            is_active: fields.is_active,
        })
    }

    /// Overwrite every editable column. Returns false when the id is unknown.
    pub async fn update_series(
        &self,
        id: i64,
        fields: SeriesFields,
    ) -> Result<bool, PresenterError> {
        let done = sqlx::query(
            r#"UPDATE series SET
                name = ?,
                description = ?,
                min_value = ?,
                max_value = ?,
                unit = ?,
                color = ?,
                icon = ?,
                is_active = ?
              WHERE id = ?"#,
        )
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.min_value)
        .bind(fields.max_value)
        .bind(fields.unit)
        .bind(fields.color)
        .bind(fields.icon)
        .bind(fields.is_active as i64)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn count_series_measurements(&self, id: i64) -> Result<i64, PresenterError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM measurements WHERE series_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Sensors attached to the series go with it.
    pub async fn delete_series(&self, id: i64) -> Result<bool, PresenterError> {
        let done = sqlx::query("DELETE FROM series WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

pub(super) fn series_from_row(row: &SqliteRow) -> Result<DbSeries, PresenterError> {
    let created_at: String = row.try_get("created_at")?;
    let is_active: i64 = row.try_get("is_active")?;
    Ok(DbSeries {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        min_value: row.try_get("min_value")?,
        max_value: row.try_get("max_value")?,
        unit: row.try_get("unit")?,
        color: row.try_get("color")?,
        icon: row.try_get("icon")?,
        created_at: decode_ts(&created_at)?,
        is_active: is_active != 0,
    })
}

fn series_summary_from_row(row: SqliteRow) -> Result<SeriesSummary, PresenterError> {
    Ok(SeriesSummary {
        series: series_from_row(&row)?,
        measurement_count: row.try_get("measurement_count")?,
    })
}
