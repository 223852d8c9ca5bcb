use std::collections::BTreeMap;

use async_trait::async_trait;
use mastery_core::model::UserLevel;
use mastery_core::progress::ProgressSnapshot;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_record_row, ser};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self) -> Result<Option<ProgressSnapshot>, StorageError> {
        let Some(meta) = sqlx::query(
            r"
            SELECT full_features_override, user_level
            FROM progress_meta
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        else {
            return Ok(None);
        };

        let full_features_override: bool = meta.try_get("full_features_override").map_err(ser)?;
        let user_level: UserLevel = meta
            .try_get::<String, _>("user_level")
            .map_err(ser)?
            .parse()
            .map_err(ser)?;

        let rows = sqlx::query(
            r"
            SELECT task_id, status, best_score
            FROM task_records
            ORDER BY task_id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut records = BTreeMap::new();
        for row in rows {
            let (task_id, record) = map_record_row(&row)?;
            records.insert(task_id, record);
        }

        Ok(Some(ProgressSnapshot {
            records,
            user_level,
            full_features_override,
        }))
    }

    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for (task_id, record) in &snapshot.records {
            sqlx::query(
                r"
                INSERT INTO task_records (task_id, status, best_score)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(task_id) DO UPDATE SET
                    status = excluded.status,
                    best_score = excluded.best_score
                ",
            )
            .bind(task_id.as_str())
            .bind(record.status.as_str())
            .bind(i64::from(record.best_score.value()))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        sqlx::query(
            r"
            INSERT INTO progress_meta (id, full_features_override, user_level)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                full_features_override = excluded.full_features_override,
                user_level = excluded.user_level
            ",
        )
        .bind(snapshot.full_features_override)
        .bind(snapshot.user_level.as_str())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
