use async_trait::async_trait;
use mastery_core::model::{TaskId, TaskResult};

use super::SqliteRepository;
use super::mapping::{conn, map_result_row, map_result_row_with_id};
use crate::repository::{StorageError, TaskResultRepository, TaskResultRow};

#[async_trait]
impl TaskResultRepository for SqliteRepository {
    async fn append_result(&self, result: &TaskResult) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO task_results (
                    task_id, session_id, score, points,
                    questions_closed, questions_solved, started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(result.task_id().as_str())
        .bind(result.session_id().to_string())
        .bind(i64::from(result.score().value()))
        .bind(i64::from(result.points()))
        .bind(i64::from(result.questions_closed()))
        .bind(i64::from(result.questions_solved()))
        .bind(result.started_at())
        .bind(result.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            other => conn(other),
        })?;

        Ok(res.last_insert_rowid())
    }

    async fn get_result(&self, id: i64) -> Result<TaskResult, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    task_id, session_id, score, points,
                    questions_closed, questions_solved, started_at, completed_at
                FROM task_results
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_result_row(&row)
    }

    async fn list_results(
        &self,
        task_id: TaskId,
        limit: u32,
    ) -> Result<Vec<TaskResultRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, task_id, session_id, score, points,
                    questions_closed, questions_solved, started_at, completed_at
                FROM task_results
                WHERE task_id = ?1
                ORDER BY completed_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(task_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_result_row_with_id(&row)?);
        }
        Ok(out)
    }
}
