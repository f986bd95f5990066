//! Observer that keeps every event it sees

use ai_request_broker::core::broker::{BrokerEvent, BrokerObserver};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<BrokerEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<BrokerEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&BrokerEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}

impl BrokerObserver for RecordingObserver {
    fn on_event(&self, event: &BrokerEvent) {
        self.events.lock().push(event.clone());
    }
}
