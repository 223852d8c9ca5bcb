use chrono::Duration;
use mastery_core::model::{QuestionKey, Score, TaskId, TaskStatus, UserLevel};
use mastery_core::time::fixed_now;
use mastery_core::{ProgressRegistry, ProgressionSettings, TaskSession};
use storage::repository::{ProgressRepository, StorageError, TaskResultRepository};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_progress_round_trip_rebuilds_registry() {
    let repo = connect("memdb_progress_roundtrip").await;
    assert!(repo.load_progress().await.unwrap().is_none());

    let mut registry = ProgressRegistry::default();
    for id in TaskId::basic() {
        registry.select_task(id).unwrap();
        registry.report_task_result(id, Score::new(85).unwrap());
    }
    registry.select_task(TaskId::SectorCalculation).unwrap();
    let snapshot = registry.snapshot();
    assert_eq!(snapshot.user_level, UserLevel::Advanced);

    repo.save_progress(&snapshot).await.unwrap();
    let loaded = repo.load_progress().await.unwrap().expect("saved snapshot");
    assert_eq!(loaded, snapshot);

    let restored = ProgressRegistry::from_snapshot(&loaded, ProgressionSettings::default()).unwrap();
    assert_eq!(restored, registry);
    assert_eq!(
        restored.status(TaskId::SectorCalculation),
        TaskStatus::InProgress
    );
}

#[tokio::test]
async fn sqlite_save_overwrites_previous_snapshot() {
    let repo = connect("memdb_progress_overwrite").await;

    let mut registry = ProgressRegistry::default();
    registry.set_full_features_override(true);
    repo.save_progress(&registry.snapshot()).await.unwrap();

    registry.set_full_features_override(false);
    registry.report_task_result(TaskId::AreaCalculation, Score::new(64).unwrap());
    repo.save_progress(&registry.snapshot()).await.unwrap();

    let loaded = repo.load_progress().await.unwrap().unwrap();
    assert!(!loaded.full_features_override);
    assert_eq!(
        loaded.record(TaskId::AreaCalculation).unwrap().best_score,
        Score::new(64).unwrap()
    );
    assert_eq!(
        loaded.record(TaskId::CompoundShapeArea).unwrap().status,
        TaskStatus::Locked
    );
}

#[tokio::test]
async fn sqlite_task_results_append_and_list() {
    let repo = connect("memdb_task_results").await;
    let started = fixed_now();

    let mut first = TaskSession::new(TaskId::CircleCalculation, started);
    for id in 1..=4 {
        first.record_attempt(QuestionKey::new(id), true).unwrap();
    }
    let first_id = repo
        .append_result(&first.build_result(started + Duration::minutes(3)).unwrap())
        .await
        .unwrap();

    let mut second = TaskSession::new(TaskId::CircleCalculation, started);
    for id in 1..=4 {
        second.record_attempt(QuestionKey::new(id), false).unwrap();
        second.record_attempt(QuestionKey::new(id), true).unwrap();
    }
    let second_result = second.build_result(started + Duration::minutes(9)).unwrap();
    let second_id = repo.append_result(&second_result).await.unwrap();

    let fetched = repo.get_result(second_id).await.unwrap();
    assert_eq!(fetched, second_result);
    assert_eq!(fetched.score().value(), 66);

    let rows = repo
        .list_results(TaskId::CircleCalculation, 10)
        .await
        .unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second_id, first_id]);
    assert_eq!(rows[1].result.score(), Score::MAX);

    assert!(
        repo.list_results(TaskId::SectorCalculation, 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn sqlite_rejects_duplicate_session_result() {
    let repo = connect("memdb_duplicate_session").await;
    let session = TaskSession::new(TaskId::AreaCalculation, fixed_now());
    let result = session.build_result(fixed_now()).unwrap();

    repo.append_result(&result).await.unwrap();
    let err = repo.append_result(&result).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_missing_result_is_not_found() {
    let repo = connect("memdb_missing_result").await;
    assert!(matches!(
        repo.get_result(42).await,
        Err(StorageError::NotFound)
    ));
}
