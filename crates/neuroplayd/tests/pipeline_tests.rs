//! End-to-end pipeline tests: orchestrator, queue and dispatcher wired with
//! in-memory repositories.

use async_trait::async_trait;
use neuroplay_common::{
    GameType, JobStatusResponse, PipelineError, StudentRewardState,
};
use neuroplayd::dispatcher::{process_job, spawn_workers, RetryPolicy};
use neuroplayd::intake::IntakeQueue;
use neuroplayd::orchestrator::CompletionOrchestrator;
use neuroplayd::repos::{
    InMemoryAchievementRepository, InMemoryGameRepository, InMemoryStudentRepository,
    StudentRepository, XpApplied,
};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn payload(session_id: &str, score: u32, accuracy: f64, duration: u32) -> serde_json::Value {
    json!({
        "session_id": session_id,
        "student_id": 1,
        "game_type": "cyber_runner",
        "score": score,
        "duration_seconds": duration,
        "accuracy": accuracy,
        "completed": true,
    })
}

struct Fixture {
    students: Arc<InMemoryStudentRepository>,
    orchestrator: Arc<CompletionOrchestrator>,
}

fn fixture() -> Fixture {
    let students = Arc::new(InMemoryStudentRepository::new());
    let games = Arc::new(InMemoryGameRepository::new());
    let achievements = Arc::new(InMemoryAchievementRepository::new());
    let students_port: Arc<dyn StudentRepository> = students.clone();
    let orchestrator = Arc::new(CompletionOrchestrator::new(
        students_port,
        games,
        achievements,
    ));
    Fixture {
        students,
        orchestrator,
    }
}

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(5),
        job_timeout: Duration::from_secs(5),
    }
}

fn queue() -> (Arc<IntakeQueue>, tokio::sync::mpsc::Receiver<String>) {
    let (queue, rx) = IntakeQueue::new(32, Duration::from_secs(60), Duration::from_secs(60), 3);
    (Arc::new(queue), rx)
}

async fn poll_until_terminal(queue: &IntakeQueue, job_id: &str) -> JobStatusResponse {
    for _ in 0..200 {
        match queue.poll(job_id).await {
            JobStatusResponse::Processing { .. } => {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            terminal => return terminal,
        }
    }
    panic!("job {job_id} never reached a terminal state");
}

#[tokio::test]
async fn submission_flows_to_exact_result() {
    let fx = fixture();
    fx.students.register(1, StudentRewardState::default()).await;

    let (queue, rx) = queue();
    let _workers = spawn_workers(2, Arc::clone(&queue), rx, fx.orchestrator, policy());

    let ack = queue
        .submit(payload("s1", 100, 0.95, 50))
        .await
        .unwrap();
    assert_eq!(ack.status, "processing");

    let status = poll_until_terminal(&queue, "s1").await;
    let JobStatusResponse::Completed { result, .. } = status else {
        panic!("expected completion, got {status:?}");
    };

    // 100 * 1.5 = 150, * 1.25 (under 120s) = 187, + 100 completion = 287.
    assert_eq!(result.xp_gained, 287);
    // First play +200, no streak, improvement over absent record +100.
    assert_eq!(result.bonus_xp, 300);
    assert_eq!(result.total_xp, 587);
    assert_eq!(result.new_total_xp, 587);
    assert_eq!(result.level, 1);
    assert!(!result.leveled_up);

    let ids: Vec<_> = result.new_achievements.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "first_cyber_runner",
            "perfect_score_cyber_runner",
            "speed_demon_cyber_runner",
        ]
    );
    assert_eq!(result.difficulty_level, 5);
    assert_eq!(result.feedback.achievements_unlocked, 3);
    assert!(result.feedback.suggestions.is_empty());
}

#[tokio::test]
async fn suspicious_score_fails_without_retry() {
    let fx = fixture();
    fx.students.register(1, StudentRewardState::default()).await;

    let (queue, _rx) = queue();
    queue.submit(payload("s1", 1000, 0.9, 1)).await.unwrap();
    process_job(&queue, &fx.orchestrator, &policy(), "s1").await;

    let status = queue.poll("s1").await;
    let JobStatusResponse::Failed { reason, .. } = status else {
        panic!("expected failure, got {status:?}");
    };
    assert!(reason.contains("suspicious score"));
    assert_eq!(queue.job("s1").await.unwrap().attempts, 1);
}

#[tokio::test]
async fn missing_student_fails_terminally() {
    let fx = fixture();

    let (queue, _rx) = queue();
    queue.submit(payload("s1", 100, 0.8, 100)).await.unwrap();
    process_job(&queue, &fx.orchestrator, &policy(), "s1").await;

    let JobStatusResponse::Failed { reason, .. } = queue.poll("s1").await else {
        panic!("expected failure");
    };
    assert!(reason.contains("not found"));
    assert_eq!(queue.job("s1").await.unwrap().attempts, 1);
}

#[tokio::test]
async fn replayed_session_never_double_reports_achievements() {
    let fx = fixture();
    fx.students.register(1, StudentRewardState::default()).await;

    let first = fx
        .orchestrator
        .execute(&payload("s1", 100, 0.95, 50))
        .await
        .unwrap();
    assert_eq!(first.new_achievements.len(), 3);

    let replay = fx
        .orchestrator
        .execute(&payload("s2", 100, 0.95, 50))
        .await
        .unwrap();
    assert!(replay.new_achievements.is_empty());
    assert_eq!(replay.feedback.achievements_unlocked, 0);
}

#[tokio::test]
async fn concurrent_completions_lose_no_xp() {
    let fx = fixture();
    fx.students.register(1, StudentRewardState::default()).await;
    // Pre-record the game so first-play and improvement bonuses stay off.
    fx.students
        .record_game_result(1, GameType::CyberRunner, 0.9)
        .await
        .unwrap();

    // Slow, incomplete, mid-accuracy run: exactly 200 XP, no bonuses.
    let per_run = 200u64;
    let runs = 16;

    let mut handles = Vec::new();
    for i in 0..runs {
        let orchestrator = Arc::clone(&fx.orchestrator);
        handles.push(tokio::spawn(async move {
            let body = json!({
                "session_id": format!("s{i}"),
                "student_id": 1,
                "game_type": "cyber_runner",
                "score": 200,
                "duration_seconds": 200,
                "accuracy": 0.5,
                "completed": false,
            });
            orchestrator.execute(&body).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let state = fx.students.get_by_id(1).await.unwrap();
    assert_eq!(state.xp, per_run * runs as u64);
}

/// Student repository whose reads fail transiently a fixed number of times.
struct FlakyStudentRepository {
    inner: InMemoryStudentRepository,
    failures_left: AtomicU32,
}

impl FlakyStudentRepository {
    async fn new(failures: u32) -> Self {
        let inner = InMemoryStudentRepository::new();
        inner.register(1, StudentRewardState::default()).await;
        Self {
            inner,
            failures_left: AtomicU32::new(failures),
        }
    }

    fn maybe_fail(&self) -> Result<(), PipelineError> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(PipelineError::Storage("simulated timeout".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StudentRepository for FlakyStudentRepository {
    async fn get_by_id(&self, student_id: i64) -> Result<StudentRewardState, PipelineError> {
        self.maybe_fail()?;
        self.inner.get_by_id(student_id).await
    }

    async fn apply_xp(&self, student_id: i64, delta: u64) -> Result<XpApplied, PipelineError> {
        self.inner.apply_xp(student_id, delta).await
    }

    async fn record_game_result(
        &self,
        student_id: i64,
        game_type: GameType,
        accuracy: f64,
    ) -> Result<(), PipelineError> {
        self.inner.record_game_result(student_id, game_type, accuracy).await
    }
}

fn orchestrator_with_students(students: Arc<dyn StudentRepository>) -> Arc<CompletionOrchestrator> {
    Arc::new(CompletionOrchestrator::new(
        students,
        Arc::new(InMemoryGameRepository::new()),
        Arc::new(InMemoryAchievementRepository::new()),
    ))
}

#[tokio::test]
async fn transient_failures_retry_then_succeed() {
    let students = Arc::new(FlakyStudentRepository::new(2).await);
    let orchestrator = orchestrator_with_students(students);

    let (queue, _rx) = queue();
    queue.submit(payload("s1", 100, 0.8, 100)).await.unwrap();
    process_job(&queue, &orchestrator, &policy(), "s1").await;

    assert!(matches!(
        queue.poll("s1").await,
        JobStatusResponse::Completed { .. }
    ));
    assert_eq!(queue.job("s1").await.unwrap().attempts, 3);
}

#[tokio::test]
async fn permanent_transient_failure_exhausts_retries() {
    let students = Arc::new(FlakyStudentRepository::new(u32::MAX).await);
    let orchestrator = orchestrator_with_students(students);

    let (queue, _rx) = queue();
    queue.submit(payload("s1", 100, 0.8, 100)).await.unwrap();
    process_job(&queue, &orchestrator, &policy(), "s1").await;

    let JobStatusResponse::Failed { reason, .. } = queue.poll("s1").await else {
        panic!("expected failure");
    };
    assert!(reason.contains("retries exhausted after 3 attempts"));
    assert_eq!(queue.job("s1").await.unwrap().attempts, 3);
}
