//! The in/out marker pair of one clip.
//!
//! [`MarkerCollection`] owns both markers and is the only place their values
//! and roles are written. Every request is resolved here first (clamped into
//! the clip, roles swapped when the handles cross, pair state advanced,
//! optionally persisted) and only then do the markers announce their new
//! values. Observers therefore never see an inverted or out-of-range pair.

use std::fmt;
use std::sync::Arc;

use crossbeam::channel::Receiver;
use tracing::{debug, info, warn};

use crate::core::affinity::ExecutionContext;
use crate::core::clip::ClipSource;
use crate::core::time::{TimeValue, ZERO};
use crate::markers::edit::{EditKind, PairState};
use crate::markers::event::{MarkerEvent, ObserverId, Observers};
use crate::markers::marker::{MarkerId, MarkerRole, OwnerId, TimelineMarker};
use crate::markers::proxy::ListenerId;
use crate::settings::store::{MarkerState, MarkerStateStore, PersistenceWarning};

/// Result of one resolved request.
#[derive(Debug)]
pub struct EditOutcome {
    /// The pair after resolution, by role.
    pub range: MarkerState,
    pub state: PairState,
    /// Whether any marker value changed.
    pub changed: bool,
    /// Whether the markers exchanged roles.
    pub swapped: bool,
    /// Set when a save was attempted and failed. The edit is kept.
    pub warning: Option<PersistenceWarning>,
}

/// Values and roles before a request, used to decide what to announce.
#[derive(Clone, Copy)]
struct Snapshot {
    values: [TimeValue; 2],
    roles: [MarkerRole; 2],
    state: PairState,
}

pub struct MarkerCollection {
    id: OwnerId,
    markers: [TimelineMarker; 2],
    clip: Arc<dyn ClipSource>,
    store: Arc<dyn MarkerStateStore>,
    key: String,
    affinity: Arc<dyn ExecutionContext>,
    /// Last pair known to be in storage (or the defaults if nothing was saved).
    saved: MarkerState,
    state: PairState,
    observers: Observers,
}

impl MarkerCollection {
    /// Create a pair spanning the whole clip, without consulting storage.
    pub fn new(
        clip: Arc<dyn ClipSource>,
        store: Arc<dyn MarkerStateStore>,
        key: impl Into<String>,
        affinity: Arc<dyn ExecutionContext>,
    ) -> Self {
        affinity.check("MarkerCollection::new");
        let defaults = MarkerState::defaults_for(clip.duration());
        Self::from_state(clip, store, key.into(), affinity, defaults)
    }

    /// Create a pair from persisted state.
    ///
    /// Absent state means clip start and clip end. Stored values are clamped
    /// into the current clip and ordered. A read failure is logged and the
    /// defaults are used.
    pub fn load(
        clip: Arc<dyn ClipSource>,
        store: Arc<dyn MarkerStateStore>,
        key: impl Into<String>,
        affinity: Arc<dyn ExecutionContext>,
    ) -> Self {
        affinity.check("MarkerCollection::load");
        let key = key.into();
        let duration = clip.duration();
        let persisted = match store.load_marker_state(&key) {
            Ok(Some(state)) => {
                info!(%key, %state, "loaded marker state");
                Some(state)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(%key, error = %e, "could not read marker state, using clip bounds");
                None
            }
        };

        let Some(persisted) = persisted else {
            return Self::from_state(clip, store, key, affinity, MarkerState::defaults_for(duration));
        };

        let a = persisted.in_point.clamp(ZERO, duration);
        let b = persisted.out_point.clamp(ZERO, duration);
        let resolved = MarkerState::new(a.min(b), a.max(b));
        let mut collection = Self::from_state(clip, store, key, affinity, resolved);
        // Only a pair identical to the stored one counts as saved.
        collection.saved = persisted;
        collection.state = collection.derive_state();
        collection
    }

    fn from_state(
        clip: Arc<dyn ClipSource>,
        store: Arc<dyn MarkerStateStore>,
        key: String,
        affinity: Arc<dyn ExecutionContext>,
        state: MarkerState,
    ) -> Self {
        let id = OwnerId::allocate();
        Self {
            id,
            markers: [
                TimelineMarker::with_owner(MarkerId::A, MarkerRole::InPoint, id, state.in_point),
                TimelineMarker::with_owner(MarkerId::B, MarkerRole::OutPoint, id, state.out_point),
            ],
            clip,
            store,
            key,
            affinity,
            saved: state,
            state: PairState::Clean,
            observers: Observers::default(),
        }
    }

    pub fn id(&self) -> OwnerId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn clip(&self) -> &Arc<dyn ClipSource> {
        &self.clip
    }

    pub fn state(&self) -> PairState {
        self.affinity.check("MarkerCollection::state");
        self.state
    }

    pub fn marker(&self, id: MarkerId) -> &TimelineMarker {
        &self.markers[id.index()]
    }

    pub fn marker_for(&self, role: MarkerRole) -> &TimelineMarker {
        &self.markers[self.slot_for(role).index()]
    }

    /// Edit handle for one marker. Its requests are resolved by this collection.
    pub fn marker_mut(&mut self, id: MarkerId) -> MarkerEdit<'_> {
        MarkerEdit { collection: self, id }
    }

    pub fn in_point(&self) -> TimeValue {
        self.affinity.check("MarkerCollection::in_point");
        self.marker_for(MarkerRole::InPoint).value()
    }

    pub fn out_point(&self) -> TimeValue {
        self.affinity.check("MarkerCollection::out_point");
        self.marker_for(MarkerRole::OutPoint).value()
    }

    pub fn range(&self) -> MarkerState {
        MarkerState::new(self.in_point(), self.out_point())
    }

    pub fn span(&self) -> TimeValue {
        self.range().span()
    }

    pub fn contains(&self, time: TimeValue) -> bool {
        let range = self.range();
        range.in_point <= time && time <= range.out_point
    }

    pub fn set_in_point(&mut self, requested: TimeValue, edit: EditKind) -> EditOutcome {
        let slot = self.slot_for(MarkerRole::InPoint);
        self.marker_mut(slot).set_time(requested, edit)
    }

    pub fn set_out_point(&mut self, requested: TimeValue, edit: EditKind) -> EditOutcome {
        let slot = self.slot_for(MarkerRole::OutPoint);
        self.marker_mut(slot).set_time(requested, edit)
    }

    pub fn mark_in_at_playhead(&mut self, edit: EditKind) -> EditOutcome {
        let position = self.clip.current_position();
        self.set_in_point(position, edit)
    }

    pub fn mark_out_at_playhead(&mut self, edit: EditKind) -> EditOutcome {
        let position = self.clip.current_position();
        self.set_out_point(position, edit)
    }

    /// Owner callback for a request on `marker`.
    ///
    /// `old_value` is what the marker reported before the request. It is only
    /// logged; notifications compare against the value the marker actually
    /// holds.
    ///
    /// Clamps into `[0, clip.duration]`. If the clamped value strictly crosses
    /// the other marker, the two markers exchange roles: the requested marker
    /// keeps the clamped value, the other keeps its own value. Equal values
    /// never swap. Then the pair state advances and, for
    /// [`EditKind::CommitAndPersist`], the committed pair is saved.
    pub fn on_marker_changed(
        &mut self,
        marker: MarkerId,
        old_value: TimeValue,
        requested: TimeValue,
        edit: EditKind,
    ) -> EditOutcome {
        self.affinity.check("MarkerCollection::on_marker_changed");
        let before = self.snapshot();

        let clamped = requested.clamp(ZERO, self.clip.duration());
        let other = marker.other();
        let role = self.markers[marker.index()].role();
        let other_value = self.markers[other.index()].value();
        let crosses = match role {
            MarkerRole::InPoint => clamped > other_value,
            MarkerRole::OutPoint => clamped < other_value,
        };
        if crosses {
            self.exchange_roles();
        }
        self.markers[marker.index()].proxy_mut().store_silently(clamped);

        debug!(
            key = %self.key,
            ?marker,
            ?role,
            %old_value,
            %requested,
            %clamped,
            swapped = crosses,
            ?edit,
            "resolved marker request"
        );
        self.finish(before, edit)
    }

    /// Set both markers in one call.
    ///
    /// The current in-point marker takes `in_point`, the out-point marker takes
    /// `out_point`, both clamped. If they end up crossed, roles are exchanged
    /// as for a single drag.
    pub fn set_range(&mut self, in_point: TimeValue, out_point: TimeValue, edit: EditKind) -> EditOutcome {
        self.affinity.check("MarkerCollection::set_range");
        let before = self.snapshot();
        let duration = self.clip.duration();
        let in_slot = self.slot_for(MarkerRole::InPoint);
        let out_slot = self.slot_for(MarkerRole::OutPoint);
        let in_value = in_point.clamp(ZERO, duration);
        let out_value = out_point.clamp(ZERO, duration);

        if in_value > out_value {
            self.exchange_roles();
        }
        self.markers[in_slot.index()].proxy_mut().store_silently(in_value);
        self.markers[out_slot.index()].proxy_mut().store_silently(out_value);

        debug!(key = %self.key, %in_value, %out_value, ?edit, "resolved range request");
        self.finish(before, edit)
    }

    /// Back to clip start and clip end.
    pub fn reset(&mut self, edit: EditKind) -> EditOutcome {
        let duration = self.clip.duration();
        self.set_range(ZERO, duration, edit)
    }

    /// Re-clamp after the clip duration changed. Transient values stay
    /// transient; committed values are clamped as well.
    pub fn clip_duration_changed(&mut self) -> EditOutcome {
        self.affinity.check("MarkerCollection::clip_duration_changed");
        self.clamp_committed();
        let edit = if self.state == PairState::Dirty {
            EditKind::TransientEdit
        } else {
            EditKind::Commit
        };
        let range = self.range();
        self.set_range(range.in_point, range.out_point, edit)
    }

    /// Drop transient values and return to the committed pair.
    pub fn discard(&mut self) -> EditOutcome {
        self.affinity.check("MarkerCollection::discard");
        let before = self.snapshot();
        self.clamp_committed();
        for marker in &mut self.markers {
            marker.proxy_mut().revert();
        }
        if self.marker_for(MarkerRole::InPoint).value() > self.marker_for(MarkerRole::OutPoint).value() {
            self.exchange_roles();
        }
        self.finish(before, EditKind::TransientEdit)
    }

    /// Persist the committed pair now. Transient values are not saved.
    /// Nothing is written when storage already holds the committed pair.
    pub fn save(&mut self) -> EditOutcome {
        self.affinity.check("MarkerCollection::save");
        let before = self.snapshot();
        let warning = self.persist();
        let mut outcome = self.finish(before, EditKind::TransientEdit);
        outcome.warning = warning;
        outcome
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&MarkerEvent) + Send + 'static) -> ObserverId {
        self.affinity.check("MarkerCollection::subscribe");
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.affinity.check("MarkerCollection::unsubscribe");
        self.observers.unsubscribe(id)
    }

    /// Receive events through a channel instead of a callback.
    pub fn event_channel(&mut self) -> Receiver<MarkerEvent> {
        self.affinity.check("MarkerCollection::event_channel");
        self.observers.channel()
    }

    fn slot_for(&self, role: MarkerRole) -> MarkerId {
        if self.markers[0].role() == role {
            MarkerId::A
        } else {
            MarkerId::B
        }
    }

    fn exchange_roles(&mut self) {
        for marker in &mut self.markers {
            let role = marker.role().opposite();
            marker.assign_role(role);
        }
    }

    /// Pull committed values back into the current clip.
    fn clamp_committed(&mut self) {
        let duration = self.clip.duration();
        for marker in &mut self.markers {
            let committed = marker.committed().clamp(ZERO, duration);
            marker.proxy_mut().set_committed(committed);
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            values: [self.markers[0].value(), self.markers[1].value()],
            roles: [self.markers[0].role(), self.markers[1].role()],
            state: self.state,
        }
    }

    /// The committed pair, ordered. Roles may have swapped during a
    /// transient drag, so they say nothing about the committed order.
    fn committed_state(&self) -> MarkerState {
        let a = self.markers[0].committed();
        let b = self.markers[1].committed();
        MarkerState::new(a.min(b), a.max(b))
    }

    fn derive_state(&self) -> PairState {
        if self.markers.iter().any(TimelineMarker::is_dirty) {
            PairState::Dirty
        } else if self.committed_state() != self.saved {
            PairState::Committed
        } else {
            PairState::Clean
        }
    }

    /// Save the committed pair if storage is behind it.
    fn persist(&mut self) -> Option<PersistenceWarning> {
        let committed = self.committed_state();
        if committed == self.saved {
            return None;
        }
        match self.store.save_marker_state(&self.key, committed) {
            Ok(()) => {
                info!(key = %self.key, state = %committed, "saved marker state");
                self.saved = committed;
                None
            }
            Err(source) => {
                warn!(key = %self.key, error = %source, "marker state kept in memory only");
                Some(PersistenceWarning {
                    key: self.key.clone(),
                    source,
                })
            }
        }
    }

    /// Settle, persist, then announce. Values are already resolved in the
    /// backing stores; each marker announces at most once.
    fn finish(&mut self, before: Snapshot, edit: EditKind) -> EditOutcome {
        debug_assert!(self.markers.iter().all(|m| m.owner() == self.id));
        if edit.settles() {
            for marker in &mut self.markers {
                marker.proxy_mut().promote();
            }
        }
        let warning = if edit.persists() { self.persist() } else { None };

        let mut events = Vec::new();
        let mut changed = false;
        for (index, marker) in self.markers.iter_mut().enumerate() {
            if marker.proxy_mut().notify_if_changed(before.values[index]) {
                changed = true;
                events.push(MarkerEvent::ValueChanged {
                    marker: marker.id(),
                    role: marker.role(),
                    value: marker.value(),
                });
            }
        }

        let swapped = self.markers[0].role() != before.roles[0];
        if swapped {
            events.push(MarkerEvent::RolesSwapped {
                in_point: self.slot_for(MarkerRole::InPoint),
                out_point: self.slot_for(MarkerRole::OutPoint),
            });
        }

        self.state = self.derive_state();
        if self.state != before.state {
            events.push(MarkerEvent::StateChanged {
                from: before.state,
                to: self.state,
            });
        }
        self.observers.dispatch(&events);

        EditOutcome {
            range: MarkerState::new(
                self.marker_for(MarkerRole::InPoint).value(),
                self.marker_for(MarkerRole::OutPoint).value(),
            ),
            state: self.state,
            changed,
            swapped,
            warning,
        }
    }
}

impl fmt::Debug for MarkerCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerCollection")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("markers", &self.markers)
            .field("saved", &self.saved)
            .field("state", &self.state)
            .field("observers", &self.observers)
            .finish()
    }
}

/// Mutable access to one marker of a collection.
///
/// Requests made here are resolved by the collection before the marker
/// announces anything.
pub struct MarkerEdit<'a> {
    collection: &'a mut MarkerCollection,
    id: MarkerId,
}

impl MarkerEdit<'_> {
    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn set_time(&mut self, requested: TimeValue, edit: EditKind) -> EditOutcome {
        let old_value = self.collection.markers[self.id.index()].value();
        self.collection.on_marker_changed(self.id, old_value, requested, edit)
    }

    /// Listen to this marker's own value changes.
    pub fn subscribe(&mut self, listener: impl FnMut(TimeValue) + Send + 'static) -> ListenerId {
        self.collection.affinity.check("TimelineMarker::subscribe");
        self.collection.markers[self.id.index()].subscribe(listener)
    }

    pub fn unsubscribe(&mut self, listener: ListenerId) -> bool {
        self.collection.affinity.check("TimelineMarker::unsubscribe");
        self.collection.markers[self.id.index()].proxy_mut().unsubscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::affinity::ThreadAffinity;
    use crate::core::clip::Clip;
    use crate::settings::store::MemoryStore;
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn secs(seconds: f64) -> TimeValue {
        TimeValue::from_seconds(seconds)
    }

    fn clip(duration: f64) -> Arc<Clip> {
        Arc::new(Clip::new(1, PathBuf::from("capture.bag"), secs(duration)))
    }

    fn setup(duration: f64) -> (MarkerCollection, Arc<Clip>, Arc<MemoryStore>) {
        let clip = clip(duration);
        let store = Arc::new(MemoryStore::new());
        let collection = MarkerCollection::new(
            clip.clone(),
            store.clone(),
            "clip-1",
            Arc::new(ThreadAffinity::current()),
        );
        (collection, clip, store)
    }

    fn record(collection: &mut MarkerCollection) -> Arc<Mutex<Vec<MarkerEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        collection.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    fn assert_ordered(collection: &MarkerCollection) {
        let range = collection.range();
        assert!(ZERO <= range.in_point);
        assert!(range.in_point <= range.out_point);
        assert!(range.out_point <= collection.clip().duration());
    }

    #[test]
    fn test_defaults_span_clip() {
        let (collection, _, _) = setup(120.0);
        assert_eq!(collection.in_point(), ZERO);
        assert_eq!(collection.out_point(), secs(120.0));
        assert_eq!(collection.state(), PairState::Clean);
        assert!(collection.marker(MarkerId::A).is_in_point());
        assert_eq!(collection.marker(MarkerId::B).owner(), collection.id());
    }

    #[test]
    fn test_in_point_past_end_clamps_without_swap() {
        let (mut collection, _, _) = setup(120.0);
        let outcome = collection.set_in_point(secs(130.0), EditKind::Commit);

        assert_eq!(collection.in_point(), secs(120.0));
        assert_eq!(collection.out_point(), secs(120.0));
        assert!(!outcome.swapped);
        assert!(collection.marker(MarkerId::A).is_in_point());
    }

    #[test]
    fn test_dragging_in_past_out_swaps_roles() {
        let (mut collection, _, _) = setup(120.0);
        let _ = collection.set_range(secs(10.0), secs(50.0), EditKind::Commit);

        let outcome = collection.marker_mut(MarkerId::A).set_time(secs(70.0), EditKind::TransientEdit);

        assert!(outcome.swapped);
        let dragged = collection.marker(MarkerId::A);
        assert_eq!(dragged.role(), MarkerRole::OutPoint);
        assert_eq!(dragged.value(), secs(70.0));
        let other = collection.marker(MarkerId::B);
        assert_eq!(other.role(), MarkerRole::InPoint);
        assert_eq!(other.value(), secs(50.0));
        assert_eq!(outcome.range, MarkerState::new(secs(50.0), secs(70.0)));
    }

    #[test]
    fn test_dragging_out_before_in_swaps_roles() {
        let (mut collection, _, _) = setup(120.0);
        let _ = collection.set_range(secs(10.0), secs(50.0), EditKind::Commit);

        let outcome = collection.set_out_point(secs(-4.0), EditKind::Commit);

        assert!(outcome.swapped);
        assert_eq!(collection.marker(MarkerId::B).role(), MarkerRole::InPoint);
        assert_eq!(collection.in_point(), ZERO);
        assert_eq!(collection.out_point(), secs(10.0));
    }

    #[test]
    fn test_invariants_hold_for_any_request() {
        let (mut collection, _, _) = setup(120.0);
        let requests = [-50.0, 0.0, 15.0, 119.9, 120.0, 300.0, 60.0, 60.0, -0.001, 45.5];
        for (i, seconds) in requests.iter().enumerate() {
            let id = if i % 2 == 0 { MarkerId::A } else { MarkerId::B };
            let edit = if i % 3 == 0 { EditKind::TransientEdit } else { EditKind::Commit };
            let _ = collection.marker_mut(id).set_time(secs(*seconds), edit);
            assert_ordered(&collection);
        }
    }

    #[test]
    fn test_notifications_carry_resolved_values() {
        let (mut collection, _, _) = setup(120.0);
        let _ = collection.set_range(secs(10.0), secs(50.0), EditKind::Commit);
        let events = record(&mut collection);

        let _ = collection.marker_mut(MarkerId::A).set_time(secs(200.0), EditKind::TransientEdit);

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                MarkerEvent::ValueChanged {
                    marker: MarkerId::A,
                    role: MarkerRole::OutPoint,
                    value: secs(120.0),
                },
                MarkerEvent::RolesSwapped {
                    in_point: MarkerId::B,
                    out_point: MarkerId::A,
                },
                MarkerEvent::StateChanged {
                    from: PairState::Committed,
                    to: PairState::Dirty,
                },
            ]
        );
    }

    #[test]
    fn test_marker_listener_fires_once_after_owner() {
        let (mut collection, _, _) = setup(120.0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _ = collection
            .marker_mut(MarkerId::A)
            .subscribe(move |value| sink.lock().unwrap().push(value));

        let _ = collection.marker_mut(MarkerId::A).set_time(secs(150.0), EditKind::Commit);

        assert_eq!(*seen.lock().unwrap(), vec![secs(120.0)]);
    }

    #[test]
    fn test_repeated_restore_is_silent() {
        let (mut collection, _, _) = setup(120.0);
        let _ = collection.set_in_point(secs(20.0), EditKind::Commit);
        let events = record(&mut collection);

        let first = collection.set_in_point(secs(20.0), EditKind::from_flags(false, false, false));
        let second = collection.set_in_point(secs(20.0), EditKind::from_flags(false, false, false));

        assert!(!first.changed);
        assert!(!second.changed);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_restore_commits_without_dirtying() {
        let (mut collection, _, _) = setup(120.0);
        let _ = collection.set_in_point(secs(5.0), EditKind::TransientEdit);

        let outcome = collection.set_in_point(secs(8.0), EditKind::from_flags(false, false, false));

        assert_eq!(collection.marker(MarkerId::A).committed(), secs(8.0));
        assert_eq!(outcome.state, PairState::Committed);
    }

    #[test]
    fn test_state_machine() {
        let (mut collection, _, store) = setup(120.0);
        assert_eq!(collection.state(), PairState::Clean);

        let _ = collection.set_in_point(secs(5.0), EditKind::TransientEdit);
        assert_eq!(collection.state(), PairState::Dirty);

        let _ = collection.set_in_point(secs(6.0), EditKind::Commit);
        assert_eq!(collection.state(), PairState::Committed);
        assert!(store.is_empty());

        let outcome = collection.save();
        assert!(outcome.warning.is_none());
        assert_eq!(collection.state(), PairState::Clean);
        assert_eq!(
            store.load_marker_state("clip-1").unwrap(),
            Some(MarkerState::new(secs(6.0), secs(120.0)))
        );
    }

    #[test]
    fn test_edit_back_to_committed_value_returns_to_prior_state() {
        let (mut collection, _, _) = setup(120.0);
        let _ = collection.set_in_point(secs(5.0), EditKind::TransientEdit);
        let outcome = collection.set_in_point(ZERO, EditKind::TransientEdit);
        assert_eq!(outcome.state, PairState::Clean);
    }

    #[test]
    fn test_commit_and_persist_saves_immediately() {
        let (mut collection, _, store) = setup(120.0);
        let _ = collection.set_in_point(secs(30.0), EditKind::TransientEdit);
        let outcome = collection.set_in_point(secs(32.0), EditKind::CommitAndPersist);

        assert!(outcome.warning.is_none());
        assert_eq!(outcome.state, PairState::Clean);
        assert_eq!(
            store.load_marker_state("clip-1").unwrap(),
            Some(MarkerState::new(secs(32.0), secs(120.0)))
        );
    }

    #[test]
    fn test_failed_save_keeps_edit_and_warns() {
        let (mut collection, _, store) = setup(120.0);
        store.set_reject_saves(true);

        let outcome = collection.set_out_point(secs(90.0), EditKind::CommitAndPersist);

        let warning = outcome.warning.expect("save should have failed");
        assert_eq!(warning.key, "clip-1");
        assert_eq!(collection.out_point(), secs(90.0));
        assert_eq!(collection.state(), PairState::Committed);

        store.set_reject_saves(false);
        assert!(collection.save().warning.is_none());
        assert_eq!(collection.state(), PairState::Clean);
    }

    #[test]
    fn test_save_skips_transient_values() {
        let (mut collection, _, store) = setup(120.0);
        let _ = collection.set_in_point(secs(10.0), EditKind::Commit);
        let _ = collection.set_in_point(secs(40.0), EditKind::TransientEdit);

        let _ = collection.save();

        assert_eq!(
            store.load_marker_state("clip-1").unwrap(),
            Some(MarkerState::new(secs(10.0), secs(120.0)))
        );
        assert_eq!(collection.state(), PairState::Dirty);
    }

    #[test]
    fn test_discard_undoes_swap() {
        let (mut collection, _, _) = setup(120.0);
        let _ = collection.set_range(secs(10.0), secs(50.0), EditKind::Commit);
        let _ = collection.marker_mut(MarkerId::A).set_time(secs(70.0), EditKind::TransientEdit);
        let events = record(&mut collection);

        let outcome = collection.discard();

        assert!(outcome.swapped);
        assert_eq!(collection.range(), MarkerState::new(secs(10.0), secs(50.0)));
        assert!(collection.marker(MarkerId::A).is_in_point());
        assert_eq!(collection.state(), PairState::Committed);
        assert!(events
            .lock()
            .unwrap()
            .contains(&MarkerEvent::ValueChanged {
                marker: MarkerId::A,
                role: MarkerRole::InPoint,
                value: secs(10.0),
            }));
    }

    #[test]
    fn test_set_range_orders_crossed_requests() {
        let (mut collection, _, _) = setup(120.0);
        let outcome = collection.set_range(secs(80.0), secs(20.0), EditKind::Commit);

        assert!(outcome.swapped);
        assert_eq!(collection.range(), MarkerState::new(secs(20.0), secs(80.0)));
        assert_eq!(collection.marker(MarkerId::A).value(), secs(80.0));
        assert!(!collection.marker(MarkerId::A).is_in_point());
    }

    #[test]
    fn test_set_range_clamps_both() {
        let (mut collection, _, _) = setup(120.0);
        let outcome = collection.set_range(secs(-10.0), secs(500.0), EditKind::Commit);
        assert!(!outcome.changed);
        assert_eq!(collection.range(), MarkerState::new(ZERO, secs(120.0)));
        assert_eq!(collection.state(), PairState::Clean);
    }

    #[test]
    fn test_mark_at_playhead() {
        let (mut collection, clip, _) = setup(120.0);
        clip.set_playhead(secs(12.5));
        let _ = collection.mark_in_at_playhead(EditKind::Commit);
        clip.set_playhead(secs(48.0));
        let _ = collection.mark_out_at_playhead(EditKind::Commit);
        assert_eq!(collection.range(), MarkerState::new(secs(12.5), secs(48.0)));
        assert_eq!(collection.span(), secs(35.5));
        assert!(collection.contains(secs(20.0)));
        assert!(!collection.contains(secs(50.0)));
    }

    #[test]
    fn test_clip_shrink_reclamps() {
        let (mut collection, clip, _) = setup(120.0);
        let _ = collection.set_range(secs(70.0), secs(100.0), EditKind::Commit);
        clip.set_duration(secs(60.0));

        let outcome = collection.clip_duration_changed();

        assert_eq!(outcome.range, MarkerState::new(secs(60.0), secs(60.0)));
        assert_eq!(outcome.state, PairState::Committed);
    }

    #[test]
    fn test_clip_shrink_during_drag_keeps_committed_pair_inside() {
        let (mut collection, clip, store) = setup(120.0);
        let _ = collection.set_range(secs(70.0), secs(100.0), EditKind::Commit);
        let _ = collection.set_in_point(secs(80.0), EditKind::TransientEdit);
        assert_eq!(collection.state(), PairState::Dirty);
        clip.set_duration(secs(60.0));

        let outcome = collection.clip_duration_changed();
        assert_eq!(outcome.range, MarkerState::new(secs(60.0), secs(60.0)));

        assert!(collection.save().warning.is_none());
        assert_eq!(
            store.load_marker_state("clip-1").unwrap(),
            Some(MarkerState::new(secs(60.0), secs(60.0)))
        );

        let outcome = collection.discard();
        assert_eq!(outcome.range, MarkerState::new(secs(60.0), secs(60.0)));
        assert_ordered(&collection);
    }

    #[test]
    fn test_discard_after_shrink_clamps_committed_pair() {
        let (mut collection, clip, _) = setup(120.0);
        let _ = collection.set_range(secs(30.0), secs(100.0), EditKind::Commit);
        let _ = collection.set_out_point(secs(40.0), EditKind::TransientEdit);
        clip.set_duration(secs(50.0));

        let outcome = collection.discard();

        assert_eq!(outcome.range, MarkerState::new(secs(30.0), secs(50.0)));
        assert_ordered(&collection);
    }

    #[test]
    fn test_save_during_swapped_drag_writes_ordered_pair() {
        let (mut collection, _, store) = setup(120.0);
        let _ = collection.set_range(secs(70.0), secs(100.0), EditKind::Commit);
        let _ = collection.set_in_point(secs(110.0), EditKind::TransientEdit);

        let _ = collection.save();

        assert_eq!(
            store.load_marker_state("clip-1").unwrap(),
            Some(MarkerState::new(secs(70.0), secs(100.0)))
        );
    }

    #[test]
    fn test_stale_old_value_does_not_suppress_notification() {
        let (mut collection, _, _) = setup(120.0);
        let events = record(&mut collection);

        let outcome = collection.on_marker_changed(MarkerId::A, secs(25.0), secs(25.0), EditKind::Commit);

        assert!(outcome.changed);
        assert!(events.lock().unwrap().contains(&MarkerEvent::ValueChanged {
            marker: MarkerId::A,
            role: MarkerRole::InPoint,
            value: secs(25.0),
        }));
    }

    #[test]
    fn test_reset() {
        let (mut collection, _, _) = setup(120.0);
        let _ = collection.set_range(secs(70.0), secs(100.0), EditKind::CommitAndPersist);
        let outcome = collection.reset(EditKind::Commit);
        assert_eq!(outcome.range, MarkerState::defaults_for(secs(120.0)));
        assert_eq!(outcome.state, PairState::Committed);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (mut collection, clip, store) = setup(120.0);
        let in_point = TimeValue::from_nanos(10_123_456_789);
        let out_point = TimeValue::from_nanos(50_000_000_001);
        let _ = collection.set_range(in_point, out_point, EditKind::CommitAndPersist);

        let loaded = MarkerCollection::load(clip, store, "clip-1", Arc::new(ThreadAffinity::current()));

        assert_eq!(loaded.range(), MarkerState::new(in_point, out_point));
        assert_eq!(loaded.state(), PairState::Clean);
    }

    #[test]
    fn test_load_without_state_uses_clip_bounds() {
        let clip = clip(30.0);
        let loaded = MarkerCollection::load(
            clip,
            Arc::new(MemoryStore::new()),
            "unknown",
            Arc::new(ThreadAffinity::current()),
        );
        assert_eq!(loaded.range(), MarkerState::defaults_for(secs(30.0)));
        assert_eq!(loaded.state(), PairState::Clean);
    }

    #[test]
    fn test_load_sanitizes_stored_pair() {
        let clip = clip(60.0);
        let store = Arc::new(MemoryStore::new());
        store
            .save_marker_state("clip-1", MarkerState::new(secs(90.0), secs(20.0)))
            .unwrap();

        let loaded = MarkerCollection::load(clip, store, "clip-1", Arc::new(ThreadAffinity::current()));

        assert_eq!(loaded.range(), MarkerState::new(secs(20.0), secs(60.0)));
        assert_eq!(loaded.state(), PairState::Committed);
    }

    #[test]
    fn test_event_channel_receives_events() {
        let (mut collection, _, _) = setup(120.0);
        let rx = collection.event_channel();
        let _ = collection.set_in_point(secs(3.0), EditKind::Commit);
        let events: Vec<_> = rx.try_iter().collect();
        assert!(matches!(events[0], MarkerEvent::ValueChanged { marker: MarkerId::A, .. }));
    }

    #[test]
    fn test_off_thread_edit_fails_fast() {
        let (collection, _, _) = setup(120.0);
        let result = std::thread::spawn(move || {
            let mut collection = collection;
            let _ = collection.set_in_point(secs(1.0), EditKind::Commit);
        })
        .join();
        assert!(result.is_err());
    }

    #[test]
    fn test_off_thread_read_fails_fast() {
        let (collection, _, _) = setup(120.0);
        let result = std::thread::spawn(move || collection.in_point()).join();
        assert!(result.is_err());
    }
}
