use calira_cortex::actuator::Actuator;
use calira_cortex::stabilizer::VoteWindow;
use calira_cortex::*;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Records commands and optionally fails for one of them
struct ScriptedActuator {
    executed: Arc<Mutex<Vec<Command>>>,
    fail_on: Option<Command>,
}

impl Actuator for ScriptedActuator {
    fn execute(&mut self, command: &Command) -> Result<(), ActuatorError> {
        self.executed.lock().unwrap().push(*command);
        if self.fail_on == Some(*command) {
            return Err(ActuatorError::Backend("actuator offline".to_string()));
        }
        Ok(())
    }
}

fn engine_with(
    confidence_threshold: f32,
    history_length: usize,
    cooldown_frames: u32,
    fail_on: Option<Command>,
) -> (StabilizationEngine, Arc<Mutex<Vec<Command>>>) {
    let executed = Arc::new(Mutex::new(Vec::new()));
    let actuator = ScriptedActuator {
        executed: Arc::clone(&executed),
        fail_on,
    };
    let config = StabilizerConfig {
        confidence_threshold,
        history_length,
        cooldown_frames,
    };
    let engine = StabilizationEngine::new(config, CommandRouter::with_default_table(Box::new(actuator)))
        .expect("valid config");
    (engine, executed)
}

fn seen(engine: &mut StabilizationEngine, label: &str) -> FrameOutcome {
    engine.process_frame(Some(&Prediction::new(label, 0.95)))
}

fn window(capacity: usize, labels: &[&str]) -> VoteWindow {
    let mut w = VoteWindow::new(NonZeroUsize::new(capacity).unwrap());
    for label in labels {
        w.push(*label);
    }
    w
}

#[test]
fn scenario_a_simple_majority() {
    assert_eq!(window(3, &["fist", "fist", "open"]).majority(), Some("fist"));
}

#[test]
fn scenario_b_tie_resolves_to_most_recent() {
    assert_eq!(window(4, &["fist", "open", "fist", "open"]).majority(), Some("open"));
}

#[test]
fn scenario_c_low_confidence_not_pushed() {
    let (mut engine, _) = engine_with(0.6, 5, 30, None);
    let first = engine.process_frame(Some(&Prediction::new("open", 0.5)));
    let second = engine.process_frame(Some(&Prediction::new("open", 0.9)));
    assert!(!first.admitted);
    assert!(second.admitted);
    assert_eq!(engine.state().vote_window().len(), 1);
}

#[test]
fn scenario_d_cooldown_delays_transition() {
    let (mut engine, executed) = engine_with(0.6, 1, 3, None);
    for _ in 0..10 {
        assert!(engine.process_frame(None).dispatch.is_none());
    }

    let frame10 = seen(&mut engine, "play");
    assert_eq!(frame10.frame_index, 10);
    assert_eq!(frame10.dispatched_label(), Some("play"));

    let frame11 = seen(&mut engine, "pause");
    assert_eq!(frame11.majority.as_deref(), Some("pause"));
    assert!(frame11.dispatch.is_none());
    assert!(seen(&mut engine, "pause").dispatch.is_none());

    let frame13 = seen(&mut engine, "pause");
    assert_eq!(frame13.frame_index, 13);
    assert_eq!(frame13.dispatched_label(), Some("pause"));
    assert_eq!(*executed.lock().unwrap(), vec![Command::Play, Command::Pause]);
}

#[test]
fn scenario_e_failed_dispatch_still_advances_state() {
    for cooldown_frames in [1, 30] {
        let (mut engine, executed) = engine_with(0.6, 1, cooldown_frames, Some(Command::Mute));
        for _ in 0..5 {
            engine.process_frame(None);
        }

        let frame5 = seen(&mut engine, "mute");
        let dispatch = frame5.dispatch.expect("dispatch attempted at frame 5");
        assert_eq!(dispatch.event.frame_index, 5);
        assert!(matches!(dispatch.result, Err(DispatchError::Actuator(_))));
        assert_eq!(engine.state().last_dispatched(), Some("mute"));
        assert_eq!(engine.state().cooldown_remaining(), cooldown_frames);

        assert!(seen(&mut engine, "mute").dispatch.is_none());
        assert_eq!(executed.lock().unwrap().len(), 1);
    }
}

#[test]
fn gated_frames_leave_window_unchanged() {
    let (mut engine, _) = engine_with(0.6, 3, 0, None);
    seen(&mut engine, "next");
    let before: Vec<String> = engine.state().vote_window().iter().map(str::to_owned).collect();

    for confidence in [0.0, 0.3, 0.59999] {
        engine.process_frame(Some(&Prediction::new("previous", confidence)));
        let after: Vec<String> = engine.state().vote_window().iter().map(str::to_owned).collect();
        assert_eq!(after, before);
    }
}

#[test]
fn window_keeps_last_admitted_labels_in_order() {
    let labels = ["a", "b", "c", "d", "e", "f", "g"];
    let (mut engine, _) = engine_with(0.6, 4, 0, None);
    for (n, label) in labels.iter().enumerate() {
        seen(&mut engine, label);
        let window: Vec<&str> = engine.state().vote_window().iter().collect();
        let start = (n + 1).saturating_sub(4);
        assert_eq!(window, labels[start..=n].to_vec());
        assert!(window.len() <= 4);
    }
}

#[test]
fn at_most_one_dispatch_per_cooldown() {
    let cooldown_frames = 7;
    let (mut engine, _) = engine_with(0.5, 1, cooldown_frames, None);
    let gestures = ["play", "pause", "next", "previous", "mute"];

    // Deterministic LCG so the majority changes on most frames.
    let mut seed: u32 = 12345;
    let mut dispatch_frames = Vec::new();
    for _ in 0..500 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
        let label = gestures[(seed >> 16) as usize % gestures.len()];
        let confidence = ((seed >> 8) & 0xff) as f32 / 255.0;
        let frame = if seed % 11 == 0 {
            None
        } else {
            Some(Prediction::new(label, confidence))
        };
        if let Some(dispatch) = engine.process_frame(frame.as_ref()).dispatch {
            dispatch_frames.push(dispatch.event.frame_index);
        }
    }

    assert!(dispatch_frames.len() > 1);
    for pair in dispatch_frames.windows(2) {
        assert!(pair[1] - pair[0] >= u64::from(cooldown_frames), "{pair:?}");
    }
}

#[test]
fn stable_majority_dispatches_once() {
    let (mut engine, executed) = engine_with(0.6, 5, 2, None);
    let dispatches = (0..100)
        .filter(|_| seen(&mut engine, "play").dispatch.is_some())
        .count();
    assert_eq!(dispatches, 1);
    assert_eq!(*executed.lock().unwrap(), vec![Command::Play]);
}

#[test]
fn noisy_stream_settles_on_true_gesture() {
    // Mostly "next" with stray low-confidence and minority votes.
    let (mut engine, executed) = engine_with(0.6, 5, 30, None);
    let stream = [
        ("next", 0.9),
        ("pause", 0.4),
        ("next", 0.8),
        ("previous", 0.7),
        ("next", 0.95),
        ("pause", 0.3),
        ("next", 0.85),
    ];
    for (label, confidence) in stream {
        engine.process_frame(Some(&Prediction::new(label, confidence)));
    }
    assert_eq!(*executed.lock().unwrap(), vec![Command::Next]);
    assert_eq!(engine.state().last_dispatched(), Some("next"));
}
