//! Progress events published while a scenario runs.

use std::sync::Arc;

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use parking_lot::Mutex;
use tokencheck_domain::CallOutcome;

/// Events emitted by the scenario driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScenarioEvent {
    /// A candidate executed one step.
    StepCompleted {
        /// Candidate id.
        candidate: String,
        /// Step id.
        step: String,
        /// What the candidate returned.
        outcome: CallOutcome,
        /// Whether the outcome matched the shadow model.
        matched: bool,
    },
    /// A candidate ran every step.
    CandidateFinished {
        /// Candidate id.
        candidate: String,
        /// Number of steps executed.
        steps: usize,
        /// Steps where the candidate disagreed with its shadow model.
        violations: usize,
    },
}

/// Fans driver progress out to every interested observer.
///
/// Clones share one subscriber list, so the harness can hand a clone to each driver
/// while callers keep subscribing on the original. A subscriber only sees steps
/// published after it subscribed, and dropping its receiver unsubscribes it.
#[derive(Clone, Debug)]
pub struct ScenarioEvents {
    listeners: Arc<Mutex<Vec<UnboundedSender<ScenarioEvent>>>>,
}

impl ScenarioEvents {
    /// Create a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self { listeners: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Send `event` to every live subscriber.
    pub fn publish(&self, event: ScenarioEvent) {
        self.listeners.lock().retain(|sender| sender.unbounded_send(event.clone()).is_ok());
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> UnboundedReceiver<ScenarioEvent> {
        let (sender, receiver) = unbounded();
        self.listeners.lock().push(sender);
        receiver
    }
}

impl Default for ScenarioEvents {
    fn default() -> Self {
        Self::new()
    }
}
