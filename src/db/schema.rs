//! SQL DDL and demo seed data.
//! SQLite-first design; statements are split on `;` when executed.

/// SQLite schema with:
/// - `measurements.series_id` RESTRICT so a series with data cannot be removed
/// - `measurements.user_id` / `sensor_id` SET NULL when the owner goes away
/// - `sensors.series_id` CASCADE
/// - booleans stored as INTEGER 0/1, timestamps as RFC 3339 text
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_login TEXT NULL
);

CREATE TABLE IF NOT EXISTS series (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NULL,
    min_value REAL NOT NULL,
    max_value REAL NOT NULL,
    unit TEXT NOT NULL DEFAULT '',
    color TEXT NOT NULL DEFAULT '#3B82F6',
    icon TEXT NULL,
    created_at TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS sensors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    api_key TEXT NOT NULL UNIQUE,
    series_id INTEGER NOT NULL REFERENCES series(id) ON DELETE CASCADE,
    description TEXT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    last_data_received TEXT NULL
);

CREATE TABLE IF NOT EXISTS measurements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value REAL NOT NULL,
    timestamp TEXT NOT NULL,
    series_id INTEGER NOT NULL REFERENCES series(id) ON DELETE RESTRICT,
    user_id INTEGER NULL REFERENCES users(id) ON DELETE SET NULL,
    sensor_id INTEGER NULL REFERENCES sensors(id) ON DELETE SET NULL,
    notes TEXT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_measurements_timestamp ON measurements(timestamp);
CREATE INDEX IF NOT EXISTS idx_measurements_series_id ON measurements(series_id);
CREATE INDEX IF NOT EXISTS idx_sensors_series_id ON sensors(series_id);
"#;

/// Demo users, series, sensors and measurements. Only applied to an empty database.
/// The two non-admin hashes are deliberately unusable placeholders.
pub const SQLITE_SEED: &str = r#"
INSERT INTO users (id, username, email, password_hash, created_at) VALUES
    (1, 'admin', 'admin@example.com', '$2a$11$zA2MzBfG5URvZ7.RZoP9.O3UQprC5ZBlhz6ZcY5aJrk0Gq2a4u0yW', '2024-11-01T00:00:00.000Z'),
    (2, 'jan_kowalski', 'jan.kowalski@example.com', '$2a$11$testhash000000000000000000000000000000000000000000000000', '2024-11-01T00:00:00.000Z'),
    (3, 'anna_nowak', 'anna.nowak@example.com', '$2a$11$testhash111111111111111111111111111111111111111111111111', '2024-11-01T00:00:00.000Z');

INSERT INTO series (id, name, description, min_value, max_value, unit, color, icon, created_at) VALUES
    (1, 'Temperatura pokojowa', 'Pomiar temperatury w pomieszczeniach', -10.0, 50.0, '°C', '#EF4444', 'thermometer', '2024-11-01T00:00:00.000Z'),
    (2, 'Wilgotność powietrza', 'Pomiar wilgotności względnej', 0.0, 100.0, '%', '#3B82F6', 'droplet', '2024-11-01T00:00:00.000Z'),
    (3, 'Ciśnienie atmosferyczne', 'Pomiar ciśnienia powietrza', 950.0, 1050.0, 'hPa', '#10B981', 'gauge', '2024-11-01T00:00:00.000Z'),
    (4, 'Natężenie światła', 'Pomiar jasności otoczenia', 0.0, 10000.0, 'lx', '#FBBF24', 'sun', '2024-11-01T00:00:00.000Z'),
    (5, 'Stężenie CO₂', 'Pomiar dwutlenku węgla w powietrzu', 300.0, 2000.0, 'ppm', '#6B7280', 'cloud', '2024-11-01T00:00:00.000Z');

INSERT INTO sensors (id, name, api_key, series_id, description, created_at) VALUES
    (1, 'Sensor temperatury - Salon', 'TEMP_SALON_KEY', 1, 'Czujnik DHT22 w salonie', '2024-11-01T00:00:00.000Z'),
    (2, 'Sensor wilgotności - Salon', 'HUM_SALON_KEY', 2, 'Czujnik DHT22 w salonie', '2024-11-01T00:00:00.000Z'),
    (3, 'Sensor ciśnienia - Balkon', 'PRESS_OUT_KEY', 3, 'Czujnik BMP180 na balkonie', '2024-11-01T00:00:00.000Z'),
    (4, 'Sensor światła - Biuro', 'LIGHT_OFFICE_KEY', 4, 'Czujnik LDR w biurze', '2024-11-01T00:00:00.000Z'),
    (5, 'Sensor CO2 - Kuchnia', 'CO2_KITCHEN_KEY', 5, 'Czujnik MH-Z19B w kuchni', '2024-11-01T00:00:00.000Z');

INSERT INTO measurements (id, value, timestamp, series_id, user_id, sensor_id, created_at) VALUES
    (1, 22.4, '2024-11-01T06:00:00.000Z', 1, 2, 1, '2024-11-01T00:00:00.000Z'),
    (2, 23.1, '2024-11-01T12:00:00.000Z', 1, 2, 1, '2024-11-01T00:00:00.000Z'),
    (3, 24.5, '2024-11-02T06:00:00.000Z', 1, 3, 1, '2024-11-01T00:00:00.000Z'),
    (4, 48.3, '2024-11-01T06:00:00.000Z', 2, 2, 2, '2024-11-01T00:00:00.000Z'),
    (5, 51.8, '2024-11-01T12:00:00.000Z', 2, 1, 2, '2024-11-01T00:00:00.000Z'),
    (6, 55.2, '2024-11-02T06:00:00.000Z', 2, 3, 2, '2024-11-01T00:00:00.000Z'),
    (7, 1013.2, '2024-11-01T06:00:00.000Z', 3, 1, 3, '2024-11-01T00:00:00.000Z'),
    (8, 1011.7, '2024-11-01T12:00:00.000Z', 3, 2, 3, '2024-11-01T00:00:00.000Z'),
    (9, 1008.5, '2024-11-02T06:00:00.000Z', 3, 3, 3, '2024-11-01T00:00:00.000Z'),
    (10, 320.0, '2024-11-01T08:00:00.000Z', 4, 1, 4, '2024-11-01T00:00:00.000Z'),
    (11, 750.0, '2024-11-01T14:00:00.000Z', 4, 1, 4, '2024-11-01T00:00:00.000Z'),
    (12, 50.0, '2024-11-01T22:00:00.000Z', 4, 1, 4, '2024-11-01T00:00:00.000Z'),
    (13, 420.0, '2024-11-01T06:00:00.000Z', 5, 1, 5, '2024-11-01T00:00:00.000Z'),
    (14, 780.0, '2024-11-01T12:00:00.000Z', 5, 1, 5, '2024-11-01T00:00:00.000Z'),
    (15, 610.0, '2024-11-01T18:00:00.000Z', 5, 3, 5, '2024-11-01T00:00:00.000Z');
"#;

/// Split a bundled SQL script into executable statements.
pub(crate) fn statements(script: &str) -> impl Iterator<Item = &str> {
    script.split(';').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_split_into_expected_statements() {
        assert_eq!(statements(SQLITE_INIT).count(), 7);
        assert_eq!(statements(SQLITE_SEED).count(), 4);
        assert!(statements(SQLITE_SEED).all(|s| s.starts_with("INSERT INTO")));
    }
}
