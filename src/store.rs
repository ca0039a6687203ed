use std::sync::RwLock;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use tracing::info;

use crate::model::attendance::RawPunch;

/// Where imported punches live. Reads return rows in arrival order, which
/// the pairing step relies on for first-wins.
#[async_trait]
pub trait PunchStore: Send + Sync {
    /// Returns the number of rows stored.
    async fn append(&self, punches: &[RawPunch]) -> Result<u64>;

    async fn load_all(&self) -> Result<Vec<RawPunch>>;
}

// 9 bound columns per row keeps a chunk well under MySQL's placeholder limit
const INSERT_CHUNK: usize = 1000;

pub struct MySqlPunchStore {
    pool: MySqlPool,
}

impl MySqlPunchStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendance_import (
                id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
                cloud_id VARCHAR(64) NOT NULL DEFAULT '',
                employee_id VARCHAR(64) NOT NULL DEFAULT '',
                employee_name VARCHAR(255) NOT NULL DEFAULT '',
                punch_date VARCHAR(32) NOT NULL DEFAULT '',
                punch_time VARCHAR(32) NOT NULL DEFAULT '',
                verification VARCHAR(64) NOT NULL DEFAULT '',
                punch_type_label VARCHAR(64) NOT NULL DEFAULT '',
                position VARCHAR(128) NOT NULL DEFAULT '',
                location VARCHAR(128) NOT NULL DEFAULT '',
                imported_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("attendance_import table ready");
        Ok(())
    }
}

#[async_trait]
impl PunchStore for MySqlPunchStore {
    async fn append(&self, punches: &[RawPunch]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in punches.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
                "INSERT INTO attendance_import \
                 (cloud_id, employee_id, employee_name, punch_date, punch_time, \
                 verification, punch_type_label, position, location) ",
            );
            builder.push_values(chunk, |mut row, p| {
                row.push_bind(p.cloud_id.as_str())
                    .push_bind(p.employee_id.as_str())
                    .push_bind(p.employee_name.as_str())
                    .push_bind(p.date.as_str())
                    .push_bind(p.time.as_str())
                    .push_bind(p.verification.as_str())
                    .push_bind(p.punch_type_label.as_str())
                    .push_bind(p.position.as_str())
                    .push_bind(p.location.as_str());
            });

            let result = builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn load_all(&self) -> Result<Vec<RawPunch>> {
        let punches: Vec<RawPunch> = sqlx::query_as::<_, RawPunch>(
            r#"
            SELECT cloud_id, employee_id, employee_name, punch_date, punch_time,
                   verification, punch_type_label, position, location
            FROM attendance_import
            ORDER BY id ASC
            "#,
        )
        .fetch(&self.pool)
        .try_collect()
        .await?;

        Ok(punches)
    }
}

/// Process-local store, used by tests and for trying the service without MySQL.
#[derive(Default)]
pub struct MemoryPunchStore {
    punches: RwLock<Vec<RawPunch>>,
}

impl MemoryPunchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PunchStore for MemoryPunchStore {
    async fn append(&self, punches: &[RawPunch]) -> Result<u64> {
        let mut stored = self
            .punches
            .write()
            .map_err(|_| anyhow!("punch store lock poisoned"))?;
        stored.extend_from_slice(punches);
        Ok(punches.len() as u64)
    }

    async fn load_all(&self) -> Result<Vec<RawPunch>> {
        let stored = self
            .punches
            .read()
            .map_err(|_| anyhow!("punch store lock poisoned"))?;
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn punch(time: &str) -> RawPunch {
        RawPunch {
            employee_id: "E1".to_string(),
            employee_name: "Alice".to_string(),
            date: "2024-01-10".to_string(),
            time: time.to_string(),
            punch_type_label: "Absensi Masuk".to_string(),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn memory_store_keeps_arrival_order() {
        let store = MemoryPunchStore::new();

        assert_eq!(store.append(&[punch("08:10")]).await.unwrap(), 1);
        assert_eq!(store.append(&[punch("07:50"), punch("09:00")]).await.unwrap(), 2);

        let times: Vec<String> = store
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.time)
            .collect();
        assert_eq!(times, ["08:10", "07:50", "09:00"]);
    }

    #[actix_web::test]
    async fn memory_store_starts_empty() {
        let store = MemoryPunchStore::new();
        assert!(store.load_all().await.unwrap().is_empty());
    }
}
