//! End-to-end scenarios: envelope in, player calls and permit accounting out.

use std::sync::Arc;
use std::time::Duration;

use media_relay::envelope::SignalEnvelope;
use media_relay::signal::keycodes;
use media_relay::testing::{JoinScheduler, PlayerCall, ScriptedPlayer};
use media_relay::trigger::TriggerDescriptor;
use media_relay::{BoundedDispatcher, Command, KeyAction, KeyEvent, PermitLedger};

struct Harness {
    player: Arc<ScriptedPlayer>,
    scheduler: Arc<JoinScheduler>,
    ledger: Arc<PermitLedger>,
    dispatcher: BoundedDispatcher<ScriptedPlayer>,
}

fn harness(player: ScriptedPlayer) -> Harness {
    let player = Arc::new(player);
    let scheduler = Arc::new(JoinScheduler::new());
    let ledger = Arc::new(PermitLedger::new());
    let dispatcher = BoundedDispatcher::new(player.clone(), scheduler.clone(), ledger.clone());
    Harness {
        player,
        scheduler,
        ledger,
        dispatcher,
    }
}

fn key(key_code: i32, action: KeyAction) -> SignalEnvelope {
    SignalEnvelope::media_button(KeyEvent::new(key_code, action))
}

/// Fast-forward key released: step forward, then resume, then release.
#[tokio::test]
async fn test_fast_forward_key_up() {
    let h = harness(ScriptedPlayer::new());
    let signal = key(keycodes::MEDIA_FAST_FORWARD, KeyAction::Up).to_signal();

    assert_eq!(h.dispatcher.on_signal(&signal), Some(Command::FastForward));
    assert_eq!(h.scheduler.join_all().await, 0);

    assert_eq!(
        h.player.calls(),
        vec![
            PlayerCall::AwaitReady,
            PlayerCall::FastForward,
            PlayerCall::Play
        ]
    );
    let stats = h.ledger.stats();
    assert_eq!(stats.acquired, 1);
    assert_eq!(stats.released, 1);
}

/// Play-pause key pressed down: nothing happens at all.
#[tokio::test]
async fn test_play_pause_key_down_is_ignored() {
    let h = harness(ScriptedPlayer::new());
    let signal = key(keycodes::MEDIA_PLAY_PAUSE, KeyAction::Down).to_signal();

    assert_eq!(h.dispatcher.on_signal(&signal), None);
    assert_eq!(h.scheduler.spawned(), 0);
    assert_eq!(h.ledger.stats().acquired, 0);
    assert!(h.player.calls().is_empty());
}

/// Player never connects: abandoned after the deadline, permit released once.
#[tokio::test(start_paused = true)]
async fn test_player_never_ready() {
    let h = harness(ScriptedPlayer::new().never_ready());
    let signal = SignalEnvelope::widget("PlayPause").to_signal();

    assert_eq!(h.dispatcher.on_signal(&signal), Some(Command::PlayPause));
    assert!(!h.ledger.is_idle());

    let started = tokio::time::Instant::now();
    h.scheduler.join_all().await;
    assert!(started.elapsed() >= Duration::from_secs(20));

    assert_eq!(h.player.calls(), vec![PlayerCall::AwaitReady]);
    let stats = h.ledger.stats();
    assert_eq!(stats.released, 1);
    assert_eq!(stats.double_releases, 0);
}

/// Every outcome settles with acquire == release.
#[tokio::test(start_paused = true)]
async fn test_permits_balance_for_all_outcomes() {
    let players = [
        ScriptedPlayer::new(),
        ScriptedPlayer::new().never_ready(),
        ScriptedPlayer::new().failing_on(PlayerCall::AwaitReady),
        ScriptedPlayer::new().failing_on(PlayerCall::FastForward),
        ScriptedPlayer::new().panicking_on(PlayerCall::Play),
    ];
    for player in players {
        let h = harness(player);
        h.dispatcher.dispatch(Command::FastForward);
        h.scheduler.join_all().await;
        let stats = h.ledger.stats();
        assert_eq!(stats.acquired, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.double_releases, 0);
    }
}

/// Two concurrent commands settle independently; one failing does not affect the other.
#[tokio::test(start_paused = true)]
async fn test_concurrent_dispatches_are_independent() {
    let h = harness(
        ScriptedPlayer::new()
            .failing_on(PlayerCall::Rewind)
            .with_call_delay(Duration::from_secs(1)),
    );

    h.dispatcher.dispatch(Command::Rewind);
    h.dispatcher.dispatch(Command::PlayPause);
    assert_eq!(h.ledger.stats().outstanding(), 2);
    assert_eq!(h.scheduler.spawned(), 2);

    assert_eq!(h.scheduler.join_all().await, 0);

    let calls = h.player.calls();
    assert_eq!(
        calls.iter().filter(|c| **c == PlayerCall::AwaitReady).count(),
        2
    );
    assert!(calls.contains(&PlayerCall::PlayPause));
    assert!(calls.contains(&PlayerCall::Rewind));
    assert!(!calls.contains(&PlayerCall::Play));

    let stats = h.ledger.stats();
    assert_eq!(stats.acquired, 2);
    assert_eq!(stats.released, 2);
}

/// Trigger descriptors fire directives that dispatch their own command.
#[tokio::test]
async fn test_trigger_descriptors_dispatch() {
    let h = harness(ScriptedPlayer::new());
    for trigger in TriggerDescriptor::all("relay") {
        let signal = trigger.to_envelope().to_signal();
        assert!(h.dispatcher.on_signal(&signal).is_some());
    }
    h.scheduler.join_all().await;

    let calls = h.player.calls();
    assert_eq!(calls.len(), 2 + 3 + 3);
    assert_eq!(h.ledger.stats().released, 3);
    h.ledger.wait_idle().await;
}

/// Legacy payloads resolve exactly like current ones.
#[tokio::test]
async fn test_legacy_payload_dispatches() {
    let h = harness(ScriptedPlayer::new());
    let json = r#"{"action":"media.intent.MEDIA_BUTTON","payload_version":1,"extras":{"legacy_key_event":[1,273,5]}}"#;
    let signal = SignalEnvelope::from_json(json).unwrap().to_signal();

    assert_eq!(h.dispatcher.on_signal(&signal), Some(Command::Rewind));
    h.scheduler.join_all().await;
    assert_eq!(
        h.player.calls(),
        vec![PlayerCall::AwaitReady, PlayerCall::Rewind, PlayerCall::Play]
    );
}
