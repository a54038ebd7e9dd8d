use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::models::{
    DbSensor, DbSeries, NewSensor, SensorChanges, SensorStats, SensorSummary, decode_opt_ts,
    decode_ts, encode_ts,
};
use super::sqlite::PresenterStorage;
use crate::error::PresenterError;

const SENSOR_COLUMNS: &str = r#"
    SELECT id, name, api_key, series_id, description, is_active, created_at, last_data_received
    FROM sensors"#;

const SENSOR_SUMMARY_SELECT: &str = r#"
    SELECT se.id, se.name, se.api_key, se.series_id, se.description, se.is_active,
           se.created_at, se.last_data_received,
           s.name AS series_name,
           (SELECT COUNT(*) FROM measurements m WHERE m.sensor_id = se.id) AS measurement_count
    FROM sensors se
    JOIN series s ON s.id = se.series_id"#;

impl PresenterStorage {
    pub async fn list_sensors(&self) -> Result<Vec<SensorSummary>, PresenterError> {
        let rows = sqlx::query(&format!("{SENSOR_SUMMARY_SELECT} ORDER BY se.id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(sensor_summary_from_row).collect()
    }

    pub async fn get_sensor_summary(
        &self,
        id: i64,
    ) -> Result<Option<SensorSummary>, PresenterError> {
        let row = sqlx::query(&format!("{SENSOR_SUMMARY_SELECT} WHERE se.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(sensor_summary_from_row).transpose()
    }

    pub async fn find_sensor(&self, id: i64) -> Result<Option<DbSensor>, PresenterError> {
        let row = sqlx::query(&format!("{SENSOR_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(sensor_from_row).transpose()
    }

    /// Resolve an ingestion key to its sensor and series. Inactive sensors never match.
    pub async fn find_active_sensor_by_key(
        &self,
        api_key: &str,
    ) -> Result<Option<(DbSensor, DbSeries)>, PresenterError> {
        let row = sqlx::query(&format!("{SENSOR_COLUMNS} WHERE api_key = ? AND is_active = 1"))
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await?;
        let Some(sensor) = row.as_ref().map(sensor_from_row).transpose()? else {
            return Ok(None);
        };
        let series = self
            .find_series(sensor.series_id)
            .await?
            .ok_or(PresenterError::DatabaseError(sqlx::Error::RowNotFound))?;
        Ok(Some((sensor, series)))
    }

    pub async fn insert_sensor(&self, sensor: NewSensor) -> Result<DbSensor, PresenterError> {
        let created_at = Utc::now();
        let id = sqlx::query(
            r#"INSERT INTO sensors (name, api_key, series_id, description, is_active, created_at)
               VALUES (?, ?, ?, ?, 1, ?)"#,
        )
        .bind(&sensor.name)
        .bind(&sensor.api_key)
        .bind(sensor.series_id)
        .bind(&sensor.description)
        .bind(encode_ts(&created_at))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(DbSensor {
            id,
            name: sensor.name,
            api_key: sensor.api_key,
            series_id: sensor.series_id,
            description: sensor.description,
            is_active: true,
            created_at,
            last_data_received: None,
        })
    }

    pub async fn update_sensor(
        &self,
        id: i64,
        changes: SensorChanges,
    ) -> Result<bool, PresenterError> {
        let done =
            sqlx::query("UPDATE sensors SET name = ?, description = ?, is_active = ? WHERE id = ?")
                .bind(changes.name)
                .bind(changes.description)
                .bind(changes.is_active as i64)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn set_sensor_api_key(&self, id: i64, api_key: &str) -> Result<bool, PresenterError> {
        let done = sqlx::query("UPDATE sensors SET api_key = ? WHERE id = ?")
            .bind(api_key)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    /// Measurements recorded by the sensor stay behind with `sensor_id = NULL`.
    pub async fn delete_sensor(&self, id: i64) -> Result<bool, PresenterError> {
        let done = sqlx::query("DELETE FROM sensors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn sensor_stats(&self, id: i64) -> Result<Option<SensorStats>, PresenterError> {
        let Some(summary) = self.get_sensor_summary(id).await? else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"SELECT COUNT(*) AS total,
                      MIN(timestamp) AS first_ts,
                      MAX(timestamp) AS last_ts,
                      AVG(value) AS avg_value,
                      MIN(value) AS min_value,
                      MAX(value) AS max_value
               FROM measurements WHERE sensor_id = ?"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let avg: Option<f64> = row.try_get("avg_value")?;
        let min: Option<f64> = row.try_get("min_value")?;
        let max: Option<f64> = row.try_get("max_value")?;
        Ok(Some(SensorStats {
            sensor: summary.sensor,
            series_name: summary.series_name,
            total_measurements: row.try_get("total")?,
            first_measurement: decode_opt_ts(row.try_get("first_ts")?)?,
            last_measurement: decode_opt_ts(row.try_get("last_ts")?)?,
            average_value: avg.unwrap_or(0.0),
            min_value: min.unwrap_or(0.0),
            max_value: max.unwrap_or(0.0),
        }))
    }
}

fn sensor_from_row(row: &SqliteRow) -> Result<DbSensor, PresenterError> {
    let created_at: String = row.try_get("created_at")?;
    let is_active: i64 = row.try_get("is_active")?;
    Ok(DbSensor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        api_key: row.try_get("api_key")?,
        series_id: row.try_get("series_id")?,
        description: row.try_get("description")?,
        is_active: is_active != 0,
        created_at: decode_ts(&created_at)?,
        last_data_received: decode_opt_ts(row.try_get("last_data_received")?)?,
    })
}

fn sensor_summary_from_row(row: SqliteRow) -> Result<SensorSummary, PresenterError> {
    Ok(SensorSummary {
        sensor: sensor_from_row(&row)?,
        series_name: row.try_get("series_name")?,
        measurement_count: row.try_get("measurement_count")?,
    })
}
