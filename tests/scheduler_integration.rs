//! Integration tests for the challenge rotation loop
//!
//! These tests drive the scheduler against an in-memory API with tokio's
//! paused clock, so pacing waits complete instantly but stay observable.

mod common;

use common::{full_cycle_duration, names, MockApi, Status};
use lichess_challenger::config::{Config, PacingConfig};
use lichess_challenger::models::{Availability, Challenge};
use lichess_challenger::roster::Roster;
use lichess_challenger::scheduler::{ChallengeScheduler, CycleOutcome};
use lichess_challenger::utils::{shutdown_channel, RetryStack};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn roster() -> Roster {
    Roster::new(
        names(&["bot1", "bot2", "bot3"]),
        vec![Challenge::new(60, 0), Challenge::new(180, 2)],
    )
    .unwrap()
}

fn scheduler(api: &Arc<MockApi>) -> ChallengeScheduler<Arc<MockApi>> {
    ChallengeScheduler::new("me", roster(), PacingConfig::default(), Arc::clone(api))
}

// ============================================================================
// CheckSelf
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_self_playing_skips_without_moving_cursor() {
    let api = Arc::new(MockApi::new());
    api.set("me", Status::Playing);
    let mut scheduler = scheduler(&api);
    let before = scheduler.cursor();
    let (_handle, mut signal) = shutdown_channel();

    let outcome = scheduler.run_cycle(&mut signal).await;

    assert_eq!(outcome, CycleOutcome::SelfUnavailable(Availability::Playing));
    assert_eq!(scheduler.cursor(), before);
    assert_eq!(api.status_calls(), names(&["me"]));
    assert!(api.challenges().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_self_offline_or_unknown_skips() {
    let (_handle, mut signal) = shutdown_channel();

    for (status, expected) in [
        (Status::Offline, Availability::Offline),
        (Status::Failing, Availability::Unknown),
        (Status::Absent, Availability::Unknown),
    ] {
        let api = Arc::new(MockApi::new());
        api.set("me", status);
        let mut scheduler = scheduler(&api);
        let before = scheduler.cursor();

        let outcome = scheduler.run_cycle(&mut signal).await;

        assert_eq!(outcome, CycleOutcome::SelfUnavailable(expected));
        assert_eq!(scheduler.cursor(), before);
        assert!(api.challenges().is_empty());
    }
}

#[tokio::test(start_paused = true)]
async fn test_self_skip_does_not_shift_turn() {
    let api = Arc::new(MockApi::new());
    api.set("me", Status::Playing);
    let mut scheduler = scheduler(&api);
    let (_handle, mut signal) = shutdown_channel();

    scheduler.run_cycle(&mut signal).await;
    scheduler.run_cycle(&mut signal).await;
    api.set("me", Status::Online);
    let outcome = scheduler.run_cycle(&mut signal).await;

    assert!(matches!(
        outcome,
        CycleOutcome::ChallengeSent { ref candidate, .. } if candidate == "bot2"
    ));
}

// ============================================================================
// CheckCandidate
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_candidate_unreachable_advances_cursor() {
    let api = Arc::new(MockApi::new());
    api.set("bot2", Status::Failing);
    let mut scheduler = scheduler(&api);
    let (_handle, mut signal) = shutdown_channel();

    let outcome = scheduler.run_cycle(&mut signal).await;

    assert_eq!(
        outcome,
        CycleOutcome::CandidateUnavailable {
            candidate: "bot2".to_string(),
            availability: Availability::Unknown,
        }
    );
    assert_eq!(scheduler.cursor().bot_index(), 1);
    assert_eq!(api.status_calls(), names(&["me", "bot2"]));
    assert!(api.challenges().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_candidate_playing_or_offline_not_challenged() {
    let api = Arc::new(MockApi::new());
    api.set("bot2", Status::Playing).set("bot3", Status::Offline);
    let mut scheduler = scheduler(&api);
    let (_handle, mut signal) = shutdown_channel();

    let first = scheduler.run_cycle(&mut signal).await;
    let second = scheduler.run_cycle(&mut signal).await;

    assert!(matches!(
        first,
        CycleOutcome::CandidateUnavailable { availability: Availability::Playing, .. }
    ));
    assert!(matches!(
        second,
        CycleOutcome::CandidateUnavailable { availability: Availability::Offline, .. }
    ));
    assert_eq!(scheduler.cursor().bot_index(), 2);
    assert!(api.challenges().is_empty());
}

// ============================================================================
// Challenge
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_successful_challenge_counts() {
    let api = Arc::new(MockApi::new());
    let mut scheduler = scheduler(&api);
    let (_handle, mut signal) = shutdown_channel();

    let outcome = scheduler.run_cycle(&mut signal).await;

    assert_eq!(
        outcome,
        CycleOutcome::ChallengeSent {
            candidate: "bot2".to_string(),
            time_control: Challenge::new(60, 0),
            challenge_count: 1,
        }
    );
    assert_eq!(scheduler.challenge_count(), 1);
    assert_eq!(
        api.challenges(),
        vec![("bot2".to_string(), Challenge::new(60, 0))]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_challenge_not_counted() {
    let api = Arc::new(MockApi::new());
    api.fail_challenges(true);
    let mut scheduler = scheduler(&api);
    let (_handle, mut signal) = shutdown_channel();

    let outcome = scheduler.run_cycle(&mut signal).await;

    assert!(matches!(outcome, CycleOutcome::ChallengeFailed { .. }));
    assert_eq!(scheduler.challenge_count(), 0);
    assert_eq!(scheduler.cursor().bot_index(), 1);
    assert_eq!(api.challenges().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_full_rotation_order() {
    let api = Arc::new(MockApi::new());
    let mut scheduler = scheduler(&api);
    let (_handle, mut signal) = shutdown_channel();

    for _ in 0..6 {
        scheduler.run_cycle(&mut signal).await;
    }

    let sent: Vec<(String, String)> = api
        .challenges()
        .into_iter()
        .map(|(bot, tc)| (bot, tc.to_string()))
        .collect();

    let expected: Vec<(String, String)> = [
        ("bot2", "1+0"),
        ("bot3", "1+0"),
        ("bot1", "3+2"),
        ("bot2", "3+2"),
        ("bot3", "3+2"),
        ("bot1", "1+0"),
    ]
    .iter()
    .map(|(b, t)| (b.to_string(), t.to_string()))
    .collect();

    assert_eq!(sent, expected);
    assert_eq!(scheduler.challenge_count(), 6);
}

// ============================================================================
// Pacing and cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_cycle_respects_pacing() {
    let api = Arc::new(MockApi::new());
    let mut scheduler = scheduler(&api);
    let (_handle, mut signal) = shutdown_channel();

    let started = Instant::now();
    scheduler.run_cycle(&mut signal).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= full_cycle_duration());
    assert!(elapsed < full_cycle_duration() + Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_self_skip_only_waits_idle_interval() {
    let api = Arc::new(MockApi::new());
    api.set("me", Status::Offline);
    let mut scheduler = scheduler(&api);
    let (_handle, mut signal) = shutdown_channel();

    let started = Instant::now();
    scheduler.run_cycle(&mut signal).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(30));
    assert!(elapsed < Duration::from_secs(31));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_idle_wait_is_prompt() {
    let api = Arc::new(MockApi::new());
    let mut scheduler = scheduler(&api);
    let (handle, signal) = shutdown_channel();

    let started = Instant::now();
    let (count, _) = tokio::join!(scheduler.run(signal), async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.shutdown();
    });

    assert_eq!(count, 0);
    assert!(started.elapsed() < Duration::from_secs(11));
    assert!(api.status_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_in_flight_probe() {
    let api = Arc::new(MockApi::new());
    api.set("bot2", Status::Hang);
    let mut scheduler = scheduler(&api);
    let (handle, signal) = shutdown_channel();

    let started = Instant::now();
    let (count, _) = tokio::join!(scheduler.run(signal), async {
        tokio::time::sleep(Duration::from_secs(120)).await;
        handle.shutdown();
    });

    assert_eq!(count, 0);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(120));
    assert!(elapsed < Duration::from_secs(121));
    assert_eq!(api.status_calls(), names(&["me", "bot2"]));
}

#[tokio::test(start_paused = true)]
async fn test_run_keeps_going_after_failures() {
    let api = Arc::new(MockApi::new());
    api.set("bot2", Status::Failing);
    api.fail_challenges(true);
    let mut scheduler = scheduler(&api);
    let (handle, signal) = shutdown_channel();

    tokio::join!(scheduler.run(signal), async {
        // Three full cycles and part of a fourth
        tokio::time::sleep(full_cycle_duration() * 3 + Duration::from_secs(1)).await;
        handle.shutdown();
    });

    assert!(api.challenges().len() >= 2);
    assert_eq!(scheduler.challenge_count(), 0);
}

// ============================================================================
// Against the real client
// ============================================================================

fn live_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.account.username = Some("me".to_string());
    config.account.token = Some("lip_test_token".to_string());
    config.lichess.base_url = server.uri();
    config.pacing = PacingConfig {
        time_between_challenges_ms: 0,
        time_between_find_user_requests_ms: 1,
        challenge_settle_ms: 0,
    };
    config.roster.average_bots = names(&["bot1", "bot2", "bot3"]);
    config.time_controls = vec![Challenge::new(60, 0)];
    config
}

#[tokio::test]
async fn test_shutdown_interrupts_rate_limit_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "me", "online": true},
            {"name": "bot2", "online": true, "playing": false}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/challenge/bot2"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = live_config(&mock_server);
    assert_eq!(config.retry, RetryStack::default());

    let mut scheduler =
        ChallengeScheduler::from_config(&config, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    assert_eq!(scheduler.roster().bots(), names(&["bot1", "bot2", "bot3"]));
    let (handle, signal) = shutdown_channel();

    let started = std::time::Instant::now();
    let (count, _) = tokio::join!(scheduler.run(signal), async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.shutdown();
    });

    assert_eq!(count, 0);
    assert_eq!(scheduler.challenge_count(), 0);
    assert!(started.elapsed() < Duration::from_secs(5));
}
