use super::Actuator;
use crate::error::ActuatorError;
use crate::types::Command;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::thread::JoinHandle;

/// Unread reports kept before new ones are discarded
pub const REPORT_BACKLOG: usize = 64;

/// Result of one command run by a [`BackgroundActuator`]
#[derive(Debug)]
pub struct DispatchReport {
    pub command: Command,
    pub result: Result<(), ActuatorError>,
}

/// Fire-and-forget wrapper: commands are queued to a worker thread and
/// `execute` returns as soon as the command is enqueued.
///
/// Failures of the wrapped actuator are reported on the receiver returned by
/// [`BackgroundActuator::spawn`], never through `execute`. That receiver holds
/// at most [`REPORT_BACKLOG`] unread reports; newer ones are dropped until it
/// is drained, so drain it or drop it.
pub struct BackgroundActuator {
    tx: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
    name: String,
}

impl BackgroundActuator {
    pub fn spawn<A>(mut inner: A) -> std::io::Result<(Self, Receiver<DispatchReport>)>
    where
        A: Actuator + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded::<Command>();
        let (report_tx, report_rx) = crossbeam_channel::bounded(REPORT_BACKLOG);
        let name = format!("background:{}", inner.name());

        let worker = std::thread::Builder::new()
            .name("calira-actuator".to_string())
            .spawn(move || {
                for command in rx.iter() {
                    let result = inner.execute(&command);
                    if let Err(ref e) = result {
                        log::warn!("Background {command} failed: {e}");
                    }
                    match report_tx.try_send(DispatchReport { command, result }) {
                        Ok(()) => {}
                        Err(TrySendError::Full(report)) => {
                            log::debug!("Report backlog full, dropping report for {}", report.command)
                        }
                        // Nobody listening for reports is fine.
                        Err(TrySendError::Disconnected(_)) => {}
                    }
                }
                log::debug!("Actuator worker exiting");
            })?;

        Ok((
            Self {
                tx: Some(tx),
                worker: Some(worker),
                name,
            },
            report_rx,
        ))
    }
}

impl Actuator for BackgroundActuator {
    fn execute(&mut self, command: &Command) -> Result<(), ActuatorError> {
        match self.tx {
            Some(ref tx) => tx.send(*command).map_err(|_| ActuatorError::Disconnected),
            None => Err(ActuatorError::Disconnected),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for BackgroundActuator {
    /// Closes the queue and waits for commands already queued to finish.
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Actuator worker panicked");
            }
        }
    }
}
