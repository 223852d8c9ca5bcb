use mastery_core::model::{Score, TaskId, TaskStatus, UserLevel};
use mastery_core::time::fixed_clock;
use mastery_core::ProgressionSettings;
use services::{AppServices, ServicesConfig};

fn config(name: &str) -> ServicesConfig {
    ServicesConfig {
        db_url: format!("sqlite:file:{name}?mode=memory&cache=shared"),
        settings: ProgressionSettings::default(),
    }
}

fn score(v: u32) -> Score {
    Score::new(v).unwrap()
}

#[tokio::test]
async fn progress_survives_service_restart() {
    let config = config("memdb_services_restart");
    let first = AppServices::new_sqlite(&config, fixed_clock()).await.unwrap();
    let progress = first.progress();
    for task in TaskId::basic() {
        progress.report_task_result(task, score(90)).await.unwrap();
    }
    progress
        .report_task_result(TaskId::SectorCalculation, score(95))
        .await
        .unwrap();
    let before = progress.snapshot().await;
    let overall = progress.overall_progress().await;
    assert_eq!(before.user_level, UserLevel::Expert);

    // The first instance keeps the shared in-memory database alive.
    let second = AppServices::new_sqlite(&config, fixed_clock()).await.unwrap();
    let after = second.progress().snapshot().await;
    assert_eq!(after, before);
    assert_eq!(second.progress().overall_progress().await, overall);
    drop(first);
}

#[tokio::test]
async fn override_round_trip_relocks_unqualified_tasks() {
    let app = AppServices::new_sqlite(&config("memdb_services_override"), fixed_clock())
        .await
        .unwrap();
    let progress = app.progress();
    let exercises = app.exercises();

    progress
        .report_task_result(TaskId::AreaCalculation, score(40))
        .await
        .unwrap();
    let changes = progress.set_full_features_override(true).await.unwrap();
    assert_eq!(changes.len(), 2);

    exercises
        .start_exercise(TaskId::SectorCalculation)
        .await
        .unwrap();
    progress
        .report_task_result(TaskId::CompoundShapeArea, score(30))
        .await
        .unwrap();

    progress.set_full_features_override(false).await.unwrap();
    let snapshot = progress.snapshot().await;
    assert_eq!(
        snapshot.record(TaskId::SectorCalculation).unwrap().status,
        TaskStatus::Locked
    );
    assert_eq!(
        snapshot.record(TaskId::CompoundShapeArea).unwrap().status,
        TaskStatus::Completed
    );
    assert!(progress.select_task(TaskId::SectorCalculation).await.is_err());
}

#[tokio::test]
async fn best_score_never_decreases() {
    let app = AppServices::new_sqlite(&config("memdb_services_best"), fixed_clock())
        .await
        .unwrap();
    let progress = app.progress();

    progress
        .report_task_result(TaskId::CircleCalculation, score(80))
        .await
        .unwrap();
    let report = progress
        .report_task_result(TaskId::CircleCalculation, score(50))
        .await
        .unwrap();

    assert_eq!(report.final_score, score(50));
    assert_eq!(report.record.best_score, score(80));
    assert_eq!(report.snapshot.total_score(), 80);
}
