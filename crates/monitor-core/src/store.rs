//! The authoritative in-memory model of the demo system.
//!
//! [`StateStore`] owns the producer and consumer records, the broker totals,
//! and a bounded window of recent messages. Every mutation is a fold of one
//! event into the current state; none of them can fail. The store is not
//! synchronized: callers that share it across tasks must serialize writes
//! (the reporting service keeps it behind a write lock).

use std::collections::{BTreeMap, VecDeque};

use monitor_types::{BrokerStatus, Endpoint, MessageEvent, MonitorEvent, SystemState};
use tracing::debug;

/// Number of recent messages retained when no window is configured.
pub const DEFAULT_MESSAGE_WINDOW: usize = 100;

/// Outcome of folding one event into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The event mutated the state.
    Changed,
    /// The event was a no-op (unknown kind, or a disconnect for an unknown id).
    Ignored,
}

/// Aggregate system state with bounded message history.
#[derive(Debug, Clone)]
pub struct StateStore {
    producers: BTreeMap<String, Endpoint>,
    consumers: BTreeMap<String, Endpoint>,
    broker: BrokerStatus,
    messages: VecDeque<MessageEvent>,
    window: usize,
}

impl StateStore {
    /// Create an empty store retaining [`DEFAULT_MESSAGE_WINDOW`] messages.
    pub fn new() -> Self {
        Self::with_window(DEFAULT_MESSAGE_WINDOW)
    }

    /// Create an empty store retaining at most `window` messages.
    ///
    /// A window of zero is raised to one.
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            producers: BTreeMap::new(),
            consumers: BTreeMap::new(),
            broker: BrokerStatus::default(),
            messages: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Maximum number of retained messages.
    pub const fn window(&self) -> usize {
        self.window
    }

    // -----------------------------------------------------------------------
    // Folds
    // -----------------------------------------------------------------------

    /// Fold a decoded event into the state.
    pub fn apply(&mut self, event: &MonitorEvent) -> Applied {
        match event {
            MonitorEvent::ProducerConnected { id } => {
                self.record_producer_connected(id);
                Applied::Changed
            }
            MonitorEvent::ProducerDisconnected { id } => self.record_producer_disconnected(id),
            MonitorEvent::ConsumerConnected { id } => {
                self.record_consumer_connected(id);
                Applied::Changed
            }
            MonitorEvent::ConsumerDisconnected { id } => self.record_consumer_disconnected(id),
            MonitorEvent::MessageSent(msg) => {
                self.record_message_sent(msg.clone());
                Applied::Changed
            }
            MonitorEvent::Unrecognized(kind) => {
                debug!(kind = kind.as_deref().unwrap_or("<none>"), "Ignoring unrecognized event");
                Applied::Ignored
            }
        }
    }

    /// Mark a producer connected, resetting its message count.
    pub fn record_producer_connected(&mut self, id: &str) {
        self.producers.insert(id.to_owned(), Endpoint::connected());
    }

    /// Mark a known producer disconnected. Unknown ids are ignored.
    pub fn record_producer_disconnected(&mut self, id: &str) -> Applied {
        mark_disconnected(&mut self.producers, id)
    }

    /// Mark a consumer connected, resetting its message count.
    pub fn record_consumer_connected(&mut self, id: &str) {
        self.consumers.insert(id.to_owned(), Endpoint::connected());
    }

    /// Mark a known consumer disconnected. Unknown ids are ignored.
    pub fn record_consumer_disconnected(&mut self, id: &str) -> Applied {
        mark_disconnected(&mut self.consumers, id)
    }

    /// Count a message and append it to the recent window, evicting the
    /// oldest entries past the window size.
    pub fn record_message_sent(&mut self, message: MessageEvent) {
        self.broker.total_messages = self.broker.total_messages.saturating_add(1);
        self.messages.push_back(message);
        while self.messages.len() > self.window {
            self.messages.pop_front();
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Owned copy of the full state.
    pub fn snapshot(&self) -> SystemState {
        SystemState {
            producers: self.producers.clone(),
            consumers: self.consumers.clone(),
            broker: self.broker.clone(),
            messages: self.messages.iter().cloned().collect(),
        }
    }

    /// Look up a producer record.
    pub fn producer(&self, id: &str) -> Option<&Endpoint> {
        self.producers.get(id)
    }

    /// Look up a consumer record.
    pub fn consumer(&self, id: &str) -> Option<&Endpoint> {
        self.consumers.get(id)
    }

    /// Messages received over the store's lifetime.
    pub const fn total_messages(&self) -> u64 {
        self.broker.total_messages
    }

    /// Messages currently retained in the window.
    pub fn retained_messages(&self) -> usize {
        self.messages.len()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

fn mark_disconnected(endpoints: &mut BTreeMap<String, Endpoint>, id: &str) -> Applied {
    endpoints.get_mut(id).map_or(Applied::Ignored, |endpoint| {
        endpoint.connected = false;
        Applied::Changed
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn message(n: u64) -> MessageEvent {
        MessageEvent::new("p1", "broker", n)
    }

    #[test]
    fn new_store_is_empty_with_active_broker() {
        let store = StateStore::new();
        let snap = store.snapshot();
        assert!(snap.producers.is_empty());
        assert!(snap.consumers.is_empty());
        assert!(snap.messages.is_empty());
        assert!(snap.broker.active);
        assert_eq!(snap.broker.total_messages, 0);
        assert_eq!(store.window(), DEFAULT_MESSAGE_WINDOW);
    }

    #[test]
    fn connect_then_disconnect_keeps_record() {
        let mut store = StateStore::new();
        store.record_producer_connected("p1");
        assert_eq!(store.record_producer_disconnected("p1"), Applied::Changed);

        let p1 = store.producer("p1").unwrap();
        assert!(!p1.connected);
        assert_eq!(p1.message_count, 0);
    }

    #[test]
    fn reconnect_resets_message_count() {
        let mut store = StateStore::new();
        store.record_consumer_connected("c1");
        store.consumers.get_mut("c1").unwrap().message_count = 42;
        store.record_consumer_disconnected("c1");

        store.record_consumer_connected("c1");
        assert_eq!(store.consumer("c1"), Some(&Endpoint::connected()));
    }

    #[test]
    fn disconnect_for_unknown_id_is_noop() {
        let mut store = StateStore::new();
        store.record_producer_connected("p1");
        store.record_message_sent(message(1));
        let before = store.snapshot();

        assert_eq!(store.record_producer_disconnected("ghost"), Applied::Ignored);
        assert_eq!(store.record_consumer_disconnected("ghost"), Applied::Ignored);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn producer_and_consumer_namespaces_are_independent() {
        let mut store = StateStore::new();
        store.record_producer_connected("x");
        store.record_consumer_connected("x");
        store.record_consumer_disconnected("x");

        assert!(store.producer("x").unwrap().connected);
        assert!(!store.consumer("x").unwrap().connected);
    }

    #[test]
    fn window_keeps_most_recent_messages() {
        let mut store = StateStore::new();
        for n in 1..=150 {
            store.record_message_sent(message(n));
        }

        let snap = store.snapshot();
        assert_eq!(snap.broker.total_messages, 150);
        assert_eq!(snap.messages.len(), 100);
        assert_eq!(snap.messages[0].timestamp.as_u64(), Some(51));
        assert_eq!(snap.messages[99].timestamp.as_u64(), Some(150));
    }

    #[test]
    fn zero_window_is_raised_to_one() {
        let mut store = StateStore::with_window(0);
        store.record_message_sent(message(1));
        store.record_message_sent(message(2));
        assert_eq!(store.window(), 1);
        assert_eq!(store.retained_messages(), 1);
        assert_eq!(store.total_messages(), 2);
    }

    #[test]
    fn apply_dispatches_every_kind() {
        let mut store = StateStore::new();
        let events = [
            MonitorEvent::ProducerConnected { id: "p1".into() },
            MonitorEvent::ConsumerConnected { id: "c1".into() },
            MonitorEvent::MessageSent(message(7)),
            MonitorEvent::ProducerDisconnected { id: "p1".into() },
            MonitorEvent::ConsumerDisconnected { id: "c1".into() },
        ];
        for event in &events {
            assert_eq!(store.apply(event), Applied::Changed);
        }

        let snap = store.snapshot();
        assert!(!snap.producers["p1"].connected);
        assert!(!snap.consumers["c1"].connected);
        assert_eq!(snap.broker.total_messages, 1);
        assert_eq!(snap.messages, vec![message(7)]);
    }

    #[test]
    fn apply_ignores_unrecognized() {
        let mut store = StateStore::new();
        let before = store.snapshot();
        assert_eq!(
            store.apply(&MonitorEvent::Unrecognized(Some("noop".into()))),
            Applied::Ignored
        );
        assert_eq!(store.snapshot(), before);
    }

    proptest! {
        #[test]
        fn prop_window_is_recent_suffix_in_order(count in 0_u64..400, window in 1_usize..150) {
            let mut store = StateStore::with_window(window);
            for n in 0..count {
                store.record_message_sent(message(n));
            }

            let snap = store.snapshot();
            let count_usize = usize::try_from(count).unwrap();
            let retained = count_usize.min(window);
            prop_assert_eq!(snap.broker.total_messages, count);
            prop_assert_eq!(snap.messages.len(), retained);

            let first = count - u64::try_from(retained).unwrap();
            let expected: Vec<u64> = (first..count).collect();
            let actual: Vec<u64> = snap
                .messages
                .iter()
                .filter_map(|m| m.timestamp.as_u64())
                .collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_unknown_disconnect_never_changes_state(id in "[a-z]{1,8}") {
            let mut store = StateStore::new();
            store.record_producer_connected("known");
            let before = store.snapshot();
            if id != "known" {
                store.record_producer_disconnected(&id);
                store.record_consumer_disconnected(&id);
                prop_assert_eq!(store.snapshot(), before);
            }
        }
    }
}
