//! SQLite data adapter.

use crate::domain::error::StocklensError;
use crate::domain::prediction::Prediction;
use crate::domain::price_bar::{PriceBar, TIMESTAMP_FORMAT};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> StocklensError {
    StocklensError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn conversion_err<E>(len: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(len, rusqlite::types::Type::Text, Box::new(e))
}

/// Default connection count when `[sqlite] pool_size` is absent.
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// `[sqlite] pool_size` as a positive connection count.
pub fn pool_size(config: &dyn ConfigPort) -> Result<u32, StocklensError> {
    let raw = config.get_int("sqlite", "pool_size", i64::from(DEFAULT_POOL_SIZE));
    u32::try_from(raw)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| StocklensError::ConfigInvalid {
            section: "sqlite".into(),
            key: "pool_size".into(),
            reason: format!("{raw} is not a connection count between 1 and {}", u32::MAX),
        })
}

fn build_pool(
    manager: SqliteConnectionManager,
    max_size: u32,
) -> Result<Pool<SqliteConnectionManager>, StocklensError> {
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| StocklensError::Database {
            reason: e.to_string(),
        })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StocklensError> {
        let db_path = config.get_string("sqlite", "path").ok_or_else(|| {
            StocklensError::ConfigMissing {
                section: "sqlite".into(),
                key: "path".into(),
            }
        })?;
        let size = pool_size(config)?;
        let pool = build_pool(SqliteConnectionManager::file(&db_path), size)?;
        Ok(Self { pool })
    }

    /// Private in-memory database on a single connection.
    pub fn in_memory() -> Result<Self, StocklensError> {
        let pool = build_pool(SqliteConnectionManager::memory(), 1)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StocklensError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| StocklensError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), StocklensError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS price_bars (
                symbol TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                PRIMARY KEY (symbol, timestamp)
            );
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                batch INTEGER NOT NULL,
                date TEXT NOT NULL,
                predicted_price REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_predictions_symbol_batch ON predictions(symbol, batch);",
        )
        .map_err(query_err)?;

        Ok(())
    }
}

impl DataPort for SqliteAdapter {
    fn upsert_bars(&self, bars: &[PriceBar]) -> Result<usize, StocklensError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO price_bars (symbol, timestamp, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    bar.symbol,
                    bar.timestamp_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        Ok(bars.len())
    }

    fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, StocklensError> {
        let conn = self.conn()?;

        let query = "SELECT symbol, timestamp, open, high, low, close, volume
                     FROM price_bars
                     WHERE symbol = ?1
                     ORDER BY timestamp ASC";

        let mut stmt = conn.prepare(query).map_err(query_err)?;

        let rows = stmt
            .query_map(params![symbol], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = NaiveDateTime::parse_from_str(&ts_str, TIMESTAMP_FORMAT)
                    .map_err(|e| conversion_err(ts_str.len(), e))?;
                Ok(PriceBar {
                    symbol: row.get(0)?,
                    timestamp,
                    open: row.get(2)?,
                    high: row.get(3)?,
                    low: row.get(4)?,
                    close: row.get(5)?,
                    volume: row.get(6)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StocklensError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM price_bars ORDER BY symbol")
            .map_err(query_err)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;

        rows.collect::<Result<Vec<String>, _>>().map_err(query_err)
    }

    fn insert_predictions(&self, predictions: &[Prediction]) -> Result<i64, StocklensError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        let mut batch = 0i64;
        for (i, p) in predictions.iter().enumerate() {
            if i == 0 {
                batch = tx
                    .query_row(
                        "SELECT COALESCE(MAX(batch), 0) + 1 FROM predictions WHERE symbol = ?1",
                        params![p.symbol],
                        |row| row.get(0),
                    )
                    .map_err(query_err)?;
            }
            tx.execute(
                "INSERT INTO predictions (symbol, batch, date, predicted_price)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    p.symbol,
                    batch,
                    p.date.format("%Y-%m-%d").to_string(),
                    p.predicted_price
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        Ok(batch)
    }

    fn latest_predictions(&self, symbol: &str) -> Result<Vec<Prediction>, StocklensError> {
        let conn = self.conn()?;

        let query = "SELECT symbol, date, predicted_price
                     FROM predictions
                     WHERE symbol = ?1
                       AND batch = (SELECT MAX(batch) FROM predictions WHERE symbol = ?1)
                     ORDER BY date ASC, id ASC";

        let mut stmt = conn.prepare(query).map_err(query_err)?;

        let rows = stmt
            .query_map(params![symbol], |row| {
                let date_str: String = row.get(1)?;
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                    .map_err(|e| conversion_err(date_str.len(), e))?;
                Ok(Prediction {
                    symbol: row.get(0)?,
                    date,
                    predicted_price: row.get(2)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }
}
