use std::sync::Arc;

use chrono::Duration;
use mastery_core::model::{Category, QuestionKey, Score, TaskId, TaskStatus, UserLevel};
use mastery_core::time::fixed_now;
use mastery_core::ProgressionSettings;
use services::{AppServices, Clock, ExerciseError, ExerciseLoopService, ProgressService};
use storage::repository::{InMemoryRepository, TaskResultRepository};

fn key(id: u32, category: &str) -> QuestionKey {
    QuestionKey::with_category(id, Category::new(category).unwrap())
}

#[tokio::test]
async fn exercise_loop_persists_result_and_reports_score() {
    let repo = InMemoryRepository::new();
    let mut clock = Clock::fixed(fixed_now());
    let progress = Arc::new(
        ProgressService::load(ProgressionSettings::default(), Arc::new(repo.clone()))
            .await
            .unwrap(),
    );

    let start_svc = ExerciseLoopService::new(clock, Arc::clone(&progress), Arc::new(repo.clone()));
    let mut exercise = start_svc
        .start_exercise(TaskId::CircleCalculation)
        .await
        .unwrap();
    assert_eq!(
        progress.snapshot().await.record(TaskId::CircleCalculation).unwrap().status,
        TaskStatus::InProgress
    );

    clock.advance(Duration::minutes(5));
    let loop_svc = ExerciseLoopService::new(clock, Arc::clone(&progress), Arc::new(repo.clone()));

    let mut last = None;
    for id in 1..=4 {
        let answer = loop_svc
            .answer(&mut exercise, QuestionKey::new(id), true)
            .await
            .unwrap();
        assert_eq!(answer.is_complete, id == 4);
        last = Some(answer);
    }

    let answer = last.unwrap();
    let report = answer.report.expect("completing answer carries a report");
    assert_eq!(report.final_score, Score::MAX);
    assert_eq!(report.record.status, TaskStatus::Completed);

    let result_id = answer.result_id.expect("result persisted");
    let stored = repo.get_result(result_id).await.unwrap();
    assert_eq!(stored.score(), Score::MAX);
    assert_eq!(stored.questions_solved(), 4);
    assert_eq!(stored.completed_at() - stored.started_at(), Duration::minutes(5));
}

#[tokio::test]
async fn three_misses_on_single_question_score_zero() {
    let app = AppServices::in_memory(ProgressionSettings::default(), Clock::fixed(fixed_now()))
        .await
        .unwrap();
    let exercises = app.exercises();
    let mut exercise = exercises
        .start_exercise(TaskId::AreaCalculation)
        .await
        .unwrap();

    for _ in 0..3 {
        exercises
            .answer(&mut exercise, QuestionKey::new(7), false)
            .await
            .unwrap();
    }
    let err = exercises
        .answer(&mut exercise, QuestionKey::new(7), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ExerciseError::InvalidAttempt(_)));

    let report = exercises.finish(&mut exercise).await.unwrap();
    assert_eq!(report.final_score, Score::ZERO);
    assert_eq!(report.record.best_score, Score::ZERO);
}

#[tokio::test]
async fn angle_task_completes_on_category_coverage() {
    let app = AppServices::in_memory(ProgressionSettings::default(), Clock::fixed(fixed_now()))
        .await
        .unwrap();
    let exercises = app.exercises();
    let mut exercise = exercises
        .start_exercise(TaskId::AngleClassification)
        .await
        .unwrap();

    let plan = [
        (key(1, "acute"), true),
        (key(2, "acute"), true),
        (key(3, "obtuse"), true),
        (key(4, "right"), false),
        (key(4, "right"), true),
    ];
    for (k, correct) in plan {
        let answer = exercises.answer(&mut exercise, k, correct).await.unwrap();
        assert!(!answer.is_complete);
    }

    let answer = exercises
        .answer(&mut exercise, key(5, "straight"), true)
        .await
        .unwrap();
    assert!(answer.is_complete);
    assert_eq!(answer.progress.categories_covered, 4);
    // (3 + 3 + 3 + 2 + 3) / 15
    assert_eq!(answer.report.unwrap().final_score, Score::new(93).unwrap());
}

#[tokio::test]
async fn basics_unlock_advanced_and_raise_level() {
    let app = AppServices::in_memory(ProgressionSettings::default(), Clock::fixed(fixed_now()))
        .await
        .unwrap();
    let exercises = app.exercises();
    let progress = app.progress();

    assert!(matches!(
        exercises.start_exercise(TaskId::CompoundShapeArea).await,
        Err(ExerciseError::TaskLocked(_))
    ));

    for task in TaskId::basic() {
        let mut exercise = exercises.start_exercise(task).await.unwrap();
        let mut id = 0;
        while !exercise.progress().is_complete {
            id += 1;
            let category = format!("c{id}");
            exercises
                .answer(&mut exercise, key(id, &category), true)
                .await
                .unwrap();
        }
    }

    let snapshot = progress.snapshot().await;
    assert_eq!(snapshot.total_score(), 500);
    assert_eq!(snapshot.completed_count(), 5);
    assert_eq!(snapshot.user_level, UserLevel::Advanced);
    assert_eq!(
        snapshot.record(TaskId::CompoundShapeArea).unwrap().status,
        TaskStatus::Unlocked
    );

    let rows = exercises
        .recent_results(TaskId::ShapeRecognition2D, 5)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}
