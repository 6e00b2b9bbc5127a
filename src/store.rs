//! The experiment state store: a minimal dispatch/subscribe container.
//!
//! The store holds exactly one piece of state — the most recently received
//! [`TrialRecord`] — and fans every accepted update out to its subscribers
//! synchronously, in subscription order. History accumulation is
//! deliberately *not* its job; that belongs to the
//! [`TrialChart`](crate::chart::TrialChart).
//!
//! The store is an explicit value, created where it is needed and passed by
//! reference to whoever dispatches into it or subscribes to it. There is no
//! process-wide singleton.
//!
//! # Example
//!
//! ```
//! use trialview::record::{FoldModel, TrialRecord};
//! use trialview::store::{Action, ExperimentStore};
//!
//! let store = ExperimentStore::new();
//! let record = TrialRecord::new(1, 0.7, 100, "auc").with_model(FoldModel::new(None, 0.7));
//! store.dispatch(Action::Update(record));
//! assert_eq!(store.latest().map(|r| r.trial_no), Some(1));
//! ```

use parking_lot::RwLock;

use crate::events::{Hub, Subscription};
use crate::record::TrialRecord;

/// Why a search run stopped before exhausting its trial budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum StopCondition {
    /// The run hit its wall-clock limit.
    TimeLimit,
    /// The run hit its no-improvement trial limit.
    TrialLimit,
    /// The run reached its target reward.
    ExpectedReward,
}

/// Payload of an early-stop notification.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopReason {
    /// Which limit triggered the stop.
    pub condition: StopCondition,
    /// The limit's value (seconds, trials, or reward, per `condition`).
    pub value: f64,
}

/// An event dispatched into the [`ExperimentStore`].
///
/// Producers may emit kinds this store does not recognize; those are ignored
/// without error so old consumers keep working as the event vocabulary
/// grows.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", content = "data", rename_all = "camelCase")
)]
#[non_exhaustive]
pub enum Action {
    /// A finished trial replacing the latest-trial state.
    Update(TrialRecord),
    /// The search stopped early. Carried on the wire for dashboards that
    /// surface it; this store leaves its state untouched.
    EarlyStopped(StopReason),
}

#[cfg(feature = "serde")]
impl Action {
    /// Decodes an action from its JSON wire form
    /// `{"kind": "...", "data": {...}}`.
    ///
    /// Returns `Ok(None)` for a well-formed payload whose `kind` this
    /// consumer does not recognize — unknown kinds are skipped, not failed,
    /// so producers can introduce new kinds freely. Unknown *fields* inside
    /// a recognized payload are ignored for the same reason.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`](crate::Error::Decode) when the payload is
    /// not valid JSON, has no string `kind`, or a recognized kind carries a
    /// malformed `data` body.
    pub fn from_json(input: &str) -> crate::Result<Option<Self>> {
        let value: serde_json::Value =
            serde_json::from_str(input).map_err(|e| crate::Error::Decode(e.to_string()))?;
        let kind = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| crate::Error::Decode("missing string `kind` field".to_string()))?;
        if !matches!(kind, "update" | "earlyStopped") {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| crate::Error::Decode(e.to_string()))
    }
}

/// Holds the most recently received trial record and notifies subscribers.
///
/// Thread-safe; share it behind an `Arc` or plain references, whichever the
/// embedding needs. Lifecycle: create → `subscribe`* → `dispatch`* → drop.
#[derive(Default)]
pub struct ExperimentStore {
    latest: RwLock<Option<TrialRecord>>,
    updates: Hub<TrialRecord>,
}

impl ExperimentStore {
    /// Creates a store with empty state and no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an action.
    ///
    /// [`Action::Update`] replaces the latest record and then invokes every
    /// subscriber with the new record, synchronously and in subscription
    /// order, before returning. Any other kind leaves state unchanged and
    /// notifies nobody.
    ///
    /// Subscribers run outside the store's locks, so a callback may
    /// `dispatch` further actions or drop subscriptions without
    /// deadlocking. If updates arrive faster than subscribers process them,
    /// later dispatches simply overwrite `latest`; nothing is queued.
    pub fn dispatch(&self, action: Action) {
        match action {
            Action::Update(record) => {
                trace_debug!("store update: trial #{}", record.trial_no);
                *self.latest.write() = Some(record.clone());
                self.updates.emit(&record);
            }
            _ => {
                trace_debug!("ignoring unrecognized action kind");
            }
        }
    }

    /// Registers an update subscriber. Dropping the returned handle
    /// unsubscribes.
    pub fn subscribe(
        &self,
        callback: impl Fn(&TrialRecord) + Send + Sync + 'static,
    ) -> Subscription {
        self.updates.subscribe(callback)
    }

    /// The most recently received trial record, if any.
    #[must_use]
    pub fn latest(&self) -> Option<TrialRecord> {
        self.latest.read().clone()
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.updates.len()
    }
}

impl core::fmt::Debug for ExperimentStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExperimentStore")
            .field("latest_trial_no", &self.latest.read().as_ref().map(|r| r.trial_no))
            .field("subscribers", &self.updates.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::record::FoldModel;

    fn record(trial_no: u64) -> TrialRecord {
        TrialRecord::new(trial_no, 0.5, 60, "auc").with_model(FoldModel::new(None, 0.5))
    }

    #[test]
    fn update_replaces_latest() {
        let store = ExperimentStore::new();
        assert!(store.latest().is_none());

        store.dispatch(Action::Update(record(1)));
        store.dispatch(Action::Update(record(2)));
        assert_eq!(store.latest().map(|r| r.trial_no), Some(2));
    }

    #[test]
    fn unrecognized_kind_is_ignored() {
        let store = ExperimentStore::new();
        store.dispatch(Action::Update(record(1)));
        store.dispatch(Action::EarlyStopped(StopReason {
            condition: StopCondition::TimeLimit,
            value: 3600.0,
        }));
        assert_eq!(store.latest().map(|r| r.trial_no), Some(1));
    }

    #[test]
    fn subscribers_notified_in_subscription_order() {
        let store = ExperimentStore::new();
        let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let first = store.subscribe({
            let seen = Arc::clone(&seen);
            move |_| seen.lock().push("first")
        });
        let second = store.subscribe({
            let seen = Arc::clone(&seen);
            move |_| seen.lock().push("second")
        });

        store.dispatch(Action::Update(record(1)));
        assert_eq!(*seen.lock(), vec!["first", "second"]);
        drop((first, second));
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let store = ExperimentStore::new();
        let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));

        let subscription = store.subscribe({
            let seen = Arc::clone(&seen);
            move |r| seen.lock().push(r.trial_no)
        });
        store.dispatch(Action::Update(record(1)));
        drop(subscription);
        store.dispatch(Action::Update(record(2)));

        assert_eq!(*seen.lock(), vec![1]);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn early_stopped_notifies_nobody() {
        let store = ExperimentStore::new();
        let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
        let _subscription = store.subscribe({
            let seen = Arc::clone(&seen);
            move |r| seen.lock().push(r.trial_no)
        });

        store.dispatch(Action::EarlyStopped(StopReason {
            condition: StopCondition::ExpectedReward,
            value: 0.95,
        }));
        assert!(seen.lock().is_empty());
    }
}
