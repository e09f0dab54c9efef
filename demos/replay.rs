//! Example: replay a recorded, noisy prediction stream through the stabilizer
//!
//! Reads frame messages (one per line, same format as the UDP input) from the
//! file given as the first argument, or uses a built-in sample.

use anyhow::{Context, Result};
use calira_cortex::actuator::DryRunActuator;
use calira_cortex::ingest::parse_frame_message;
use calira_cortex::{CaliraConfig, CommandRouter, StabilizationEngine};

const SAMPLE: &str = "\
label=play conf=0.91
label=play conf=0.42
none
label=play conf=0.88
label=pause conf=0.71
label=pause conf=0.93
label=pause conf=0.90
label=pause conf=0.97
{\"label\":\"next\",\"confidence\":0.65}
-
";

fn main() -> Result<()> {
    env_logger::init();

    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("read {path}"))?,
        None => SAMPLE.to_string(),
    };

    let mut config = CaliraConfig::from_env_or_default()?;
    config.stabilizer.cooldown_frames = 3;

    let router = CommandRouter::new(config.gesture_table(), Box::new(DryRunActuator::default()));
    let mut engine = StabilizationEngine::new(config.stabilizer.clone(), router)?;

    for line in input.lines() {
        let frame = match parse_frame_message(line) {
            Ok(frame) => frame,
            Err(e) => {
                println!("skip  {line:?}: {e}");
                continue;
            }
        };
        let outcome = engine.process_frame(frame.as_ref());
        println!(
            "frame {:>3}  admitted={:<5}  majority={:<10} cooldown={:<2} {}",
            outcome.frame_index,
            outcome.admitted,
            outcome.majority.as_deref().unwrap_or("-"),
            engine.state().cooldown_remaining(),
            match outcome.dispatch {
                Some(ref d) => match d.result {
                    Ok(command) => format!("=> {command}"),
                    Err(ref e) => format!("=> failed: {e}"),
                },
                None => String::new(),
            }
        );
    }

    Ok(())
}
