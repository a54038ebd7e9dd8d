use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::models::{
    DbMeasurement, MeasurementChanges, MeasurementFilter, MeasurementView, NewMeasurement,
    SeriesStats, decode_opt_ts, decode_ts, encode_ts,
};
use super::sqlite::PresenterStorage;
use crate::error::PresenterError;

const MEASUREMENT_VIEW_SELECT: &str = r#"
    SELECT m.id, m.value, m.timestamp, m.series_id, m.user_id, m.sensor_id, m.notes, m.created_at,
           s.name AS series_name, s.unit AS series_unit, s.color AS series_color,
           se.name AS sensor_name
    FROM measurements m
    JOIN series s ON s.id = m.series_id
    LEFT JOIN sensors se ON se.id = m.sensor_id"#;

impl PresenterStorage {
    pub async fn list_measurements(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<MeasurementView>, PresenterError> {
        let mut qb = QueryBuilder::<Sqlite>::new(MEASUREMENT_VIEW_SELECT);
        qb.push(" WHERE 1 = 1");
        push_filter(&mut qb, filter);
        qb.push(if filter.descending {
            " ORDER BY m.timestamp DESC, m.id DESC"
        } else {
            " ORDER BY m.timestamp ASC, m.id ASC"
        });
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(view_from_row).collect()
    }

    /// Per-series aggregates over the measurements matching `filter` (limit and order ignored).
    pub async fn measurement_stats(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<SeriesStats>, PresenterError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"SELECT m.series_id, s.name AS series_name,
                      COUNT(*) AS count,
                      MIN(m.value) AS min_value,
                      MAX(m.value) AS max_value,
                      AVG(m.value) AS avg_value,
                      MIN(m.timestamp) AS first_ts,
                      MAX(m.timestamp) AS last_ts
               FROM measurements m
               JOIN series s ON s.id = m.series_id
               WHERE 1 = 1"#,
        );
        push_filter(&mut qb, filter);
        qb.push(" GROUP BY m.series_id, s.name ORDER BY m.series_id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| -> Result<SeriesStats, PresenterError> {
                let min: Option<f64> = row.try_get("min_value")?;
                let max: Option<f64> = row.try_get("max_value")?;
                let avg: Option<f64> = row.try_get("avg_value")?;
                Ok(SeriesStats {
                    series_id: row.try_get("series_id")?,
                    series_name: row.try_get("series_name")?,
                    count: row.try_get("count")?,
                    min_value: min.unwrap_or(0.0),
                    max_value: max.unwrap_or(0.0),
                    avg_value: avg.unwrap_or(0.0),
                    first_measurement: decode_opt_ts(row.try_get("first_ts")?)?,
                    last_measurement: decode_opt_ts(row.try_get("last_ts")?)?,
                })
            })
            .collect()
    }

    pub async fn get_measurement(
        &self,
        id: i64,
    ) -> Result<Option<MeasurementView>, PresenterError> {
        let row = sqlx::query(&format!("{MEASUREMENT_VIEW_SELECT} WHERE m.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(view_from_row).transpose()
    }

    pub async fn find_measurement(
        &self,
        id: i64,
    ) -> Result<Option<DbMeasurement>, PresenterError> {
        let row = sqlx::query(
            r#"SELECT id, value, timestamp, series_id, user_id, sensor_id, notes, created_at
               FROM measurements WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(measurement_from_row).transpose()
    }

    /// Insert a measurement and return its id.
    pub async fn insert_measurement(&self, new: NewMeasurement) -> Result<i64, PresenterError> {
        let id = sqlx::query(
            r#"INSERT INTO measurements (
                value, timestamp, series_id, user_id, sensor_id, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(new.value)
        .bind(encode_ts(&new.timestamp))
        .bind(new.series_id)
        .bind(new.user_id)
        .bind(new.sensor_id)
        .bind(new.notes)
        .bind(encode_ts(&Utc::now()))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// Insert a sensor reading and stamp the sensor's `last_data_received` in one transaction.
    pub async fn insert_sensor_measurement(
        &self,
        sensor_id: i64,
        new: NewMeasurement,
        received_at: DateTime<Utc>,
    ) -> Result<i64, PresenterError> {
        let mut tx = self.pool.begin().await?;
        let received = encode_ts(&received_at);

        let id = sqlx::query(
            r#"INSERT INTO measurements (
                value, timestamp, series_id, user_id, sensor_id, notes, created_at
            ) VALUES (?, ?, ?, NULL, ?, ?, ?)"#,
        )
        .bind(new.value)
        .bind(encode_ts(&new.timestamp))
        .bind(new.series_id)
        .bind(sensor_id)
        .bind(new.notes)
        .bind(&received)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("UPDATE sensors SET last_data_received = ? WHERE id = ?")
            .bind(&received)
            .bind(sensor_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    pub async fn update_measurement(
        &self,
        id: i64,
        changes: MeasurementChanges,
    ) -> Result<bool, PresenterError> {
        let done =
            sqlx::query("UPDATE measurements SET value = ?, timestamp = ?, notes = ? WHERE id = ?")
                .bind(changes.value)
                .bind(encode_ts(&changes.timestamp))
                .bind(changes.notes)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn delete_measurement(&self, id: i64) -> Result<bool, PresenterError> {
        let done = sqlx::query("DELETE FROM measurements WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &MeasurementFilter) {
    if let Some(start) = &filter.start {
        qb.push(" AND m.timestamp >= ").push_bind(encode_ts(start));
    }
    if let Some(end) = &filter.end {
        qb.push(" AND m.timestamp <= ").push_bind(encode_ts(end));
    }
    if let Some(ids) = &filter.series_ids
        && !ids.is_empty()
    {
        qb.push(" AND m.series_id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }
}

fn measurement_from_row(row: &SqliteRow) -> Result<DbMeasurement, PresenterError> {
    let timestamp: String = row.try_get("timestamp")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(DbMeasurement {
        id: row.try_get("id")?,
        value: row.try_get("value")?,
        timestamp: decode_ts(&timestamp)?,
        series_id: row.try_get("series_id")?,
        user_id: row.try_get("user_id")?,
        sensor_id: row.try_get("sensor_id")?,
        notes: row.try_get("notes")?,
        created_at: decode_ts(&created_at)?,
    })
}

fn view_from_row(row: SqliteRow) -> Result<MeasurementView, PresenterError> {
    Ok(MeasurementView {
        measurement: measurement_from_row(&row)?,
        series_name: row.try_get("series_name")?,
        series_unit: row.try_get("series_unit")?,
        series_color: row.try_get("series_color")?,
        sensor_name: row.try_get("sensor_name")?,
    })
}
