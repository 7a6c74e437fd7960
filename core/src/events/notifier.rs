use deckwatch_types::NotifyMode;
use tokio::sync::broadcast;

use super::signal::StateEvent;
use crate::parser::BatchOutcome;

/// Slots buffered per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Fans state events out to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<StateEvent>,
    mode: NotifyMode,
}

impl ChangeNotifier {
    pub fn new(mode: NotifyMode) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx, mode }
    }

    pub fn mode(&self) -> NotifyMode {
        self.mode
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.tx.subscribe()
    }

    /// Events a chunk with this outcome produces under the configured mode.
    pub fn events_for(&self, outcome: BatchOutcome) -> Vec<StateEvent> {
        let state_changed = match self.mode {
            NotifyMode::EveryMutation => outcome.changed,
            NotifyMode::TurnBoundaries => outcome.turn_changed,
        };

        let mut events = Vec::new();
        if state_changed {
            events.push(StateEvent::StateChanged);
        }
        if outcome.turn_changed {
            events.push(StateEvent::TurnChanged);
        }
        events
    }

    /// Publish the events for one chunk and return them.
    pub fn publish(&self, outcome: BatchOutcome) -> Vec<StateEvent> {
        let events = self.events_for(outcome);
        for event in &events {
            // No subscribers is not an error
            let _ = self.tx.send(*event);
        }
        if !events.is_empty() {
            tracing::trace!(?events, receivers = self.tx.receiver_count(), "Published");
        }
        events
    }
}
