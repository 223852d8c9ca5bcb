use mastery_core::model::{Score, SessionId, TaskId, TaskRecord, TaskResult, TaskStatus};
use sqlx::Row;

use crate::repository::{StorageError, TaskResultRow};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn score_from_i64(field: &'static str, v: i64) -> Result<Score, StorageError> {
    Score::new(u32_from_i64(field, v)?).map_err(ser)
}

pub(crate) fn map_record_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(TaskId, TaskRecord), StorageError> {
    let task_id: TaskId = row
        .try_get::<String, _>("task_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let status: TaskStatus = row
        .try_get::<String, _>("status")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let best_score = score_from_i64("best_score", row.try_get("best_score").map_err(ser)?)?;

    Ok((task_id, TaskRecord { status, best_score }))
}

pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<TaskResult, StorageError> {
    let task_id: TaskId = row
        .try_get::<String, _>("task_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let session_id: SessionId = row
        .try_get::<String, _>("session_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let score = score_from_i64("score", row.try_get("score").map_err(ser)?)?;
    let points = u32_from_i64("points", row.try_get("points").map_err(ser)?)?;
    let closed = u32_from_i64(
        "questions_closed",
        row.try_get("questions_closed").map_err(ser)?,
    )?;
    let solved = u32_from_i64(
        "questions_solved",
        row.try_get("questions_solved").map_err(ser)?,
    )?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    TaskResult::from_persisted(
        task_id,
        session_id,
        score,
        points,
        closed,
        solved,
        started_at,
        completed_at,
    )
    .map_err(ser)
}

pub(crate) fn map_result_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<TaskResultRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(TaskResultRow::new(id, map_result_row(row)?))
}
