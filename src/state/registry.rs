use std::{future::Future, sync::Arc, time::Duration};

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::{
    sync::{Mutex, MutexGuard},
    time::timeout,
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::{
        hub::EventHub,
        lifecycle::{Plan, RoomEvent, RoomStatus},
        room::{Room, RoomSlot},
    },
};

/// One registered room: its broadcast hub and the mutex guarding all of its state.
pub struct RoomEntry {
    id: Uuid,
    code: String,
    hub: EventHub,
    slot: Mutex<RoomSlot>,
}

impl RoomEntry {
    fn new(room: Room, hub_capacity: usize) -> Self {
        Self {
            id: room.id,
            code: room.code.clone(),
            hub: EventHub::new(hub_capacity),
            slot: Mutex::new(RoomSlot::new(room)),
        }
    }

    /// Room identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Join code, fixed for the room lifetime.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Room event hub.
    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    /// Acquire the room lock. Every room mutation happens under this guard.
    pub async fn lock(&self) -> MutexGuard<'_, RoomSlot> {
        self.slot.lock().await
    }

    /// Run a lifecycle transition whose side work happens outside the room lock.
    ///
    /// `prepare` validates and extracts inputs under the lock before the plan is
    /// recorded; `work` runs unlocked and bounded by `limit`; `commit` runs under
    /// the lock again before the plan is applied. Any failure aborts the plan and
    /// leaves the room as it was.
    pub async fn run_transition<P, I, F, Fut, T, C, R>(
        &self,
        event: RoomEvent,
        limit: Option<Duration>,
        prepare: P,
        work: F,
        commit: C,
    ) -> Result<(R, RoomStatus), ServiceError>
    where
        P: FnOnce(&RoomSlot) -> Result<I, ServiceError>,
        F: FnOnce(I) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
        C: FnOnce(&mut RoomSlot, T) -> Result<R, ServiceError>,
    {
        let (plan, input) = {
            let mut slot = self.slot.lock().await;
            let input = prepare(&*slot)?;
            let plan = slot.lifecycle.plan(event)?;
            (plan, input)
        };

        let work_future = work(input);
        let outcome = match limit {
            Some(limit) => match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    self.abort(&plan, "timeout").await;
                    return Err(ServiceError::Timeout);
                }
            },
            None => work_future.await,
        };

        let value = match outcome {
            Ok(value) => value,
            Err(err) => {
                self.abort(&plan, "work error").await;
                return Err(err);
            }
        };

        let mut slot = self.slot.lock().await;
        let committed = match commit(&mut *slot, value) {
            Ok(committed) => committed,
            Err(err) => {
                if let Err(abort_err) = slot.lifecycle.abort(plan.id) {
                    warn!(
                        room_id = %self.id,
                        plan_id = %plan.id,
                        error = ?abort_err,
                        "failed to abort transition after commit error"
                    );
                }
                return Err(err);
            }
        };
        let next = slot.lifecycle.apply(plan.id)?;
        Ok((committed, next))
    }

    async fn abort(&self, plan: &Plan, reason: &'static str) {
        let mut slot = self.slot.lock().await;
        if let Err(abort_err) = slot.lifecycle.abort(plan.id) {
            warn!(
                room_id = %self.id,
                event = ?plan.event,
                plan_id = %plan.id,
                error = ?abort_err,
                reason,
                "failed to abort transition"
            );
        }
    }
}

/// Process-lifetime registry of rooms, indexed by id and by join code.
pub struct RoomRegistry {
    rooms: DashMap<Uuid, Arc<RoomEntry>>,
    codes: DashMap<String, Uuid>,
    hub_capacity: usize,
}

impl RoomRegistry {
    /// Create an empty registry; each room hub gets `hub_capacity` slots.
    pub fn new(hub_capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            codes: DashMap::new(),
            hub_capacity,
        }
    }

    /// Register a room, failing with the room back when its code is already taken.
    pub fn insert(&self, room: Room) -> Result<Arc<RoomEntry>, Room> {
        match self.codes.entry(room.code.clone()) {
            Entry::Occupied(_) => Err(room),
            Entry::Vacant(vacant) => {
                vacant.insert(room.id);
                let entry = Arc::new(RoomEntry::new(room, self.hub_capacity));
                self.rooms.insert(entry.id, entry.clone());
                Ok(entry)
            }
        }
    }

    /// Look a room up by id.
    pub fn get(&self, id: Uuid) -> Option<Arc<RoomEntry>> {
        self.rooms.get(&id).map(|entry| entry.value().clone())
    }

    /// Look a room up by join code, ignoring case.
    pub fn get_by_code(&self, code: &str) -> Option<Arc<RoomEntry>> {
        let code = code.trim().to_ascii_uppercase();
        let id = *self.codes.get(&code)?.value();
        self.get(id)
    }

    /// Unregister a room.
    pub fn remove(&self, id: Uuid) -> Option<Arc<RoomEntry>> {
        let (_, entry) = self.rooms.remove(&id)?;
        self.codes.remove(entry.code());
        Some(entry)
    }

    /// Number of registered rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no room is registered.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Handles to every registered room.
    pub fn entries(&self) -> Vec<Arc<RoomEntry>> {
        self.rooms.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of rooms with a game in progress.
    pub async fn active_games(&self) -> usize {
        let mut count = 0;
        for entry in self.entries() {
            if entry.lock().await.status() == RoomStatus::InProgress {
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::state::{
        lifecycle::RoomStatus,
        room::{Member, Theme},
        variant::GameVariant,
    };

    fn room(code: &str) -> Room {
        Room {
            id: Uuid::new_v4(),
            code: code.into(),
            name: "Room".into(),
            host_id: "host".into(),
            members: vec![Member {
                id: "host".into(),
                name: "Host".into(),
            }],
            max_players: 4,
            theme: Theme::default(),
            variant: GameVariant::default(),
            locked: false,
            created_at: SystemTime::now(),
        }
    }

    #[test]
    fn insert_indexes_by_id_and_code() {
        let registry = RoomRegistry::new(8);
        let entry = registry.insert(room("ABCDEF")).ok().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(entry.id()).is_some());
        assert_eq!(registry.get_by_code("abcdef").unwrap().id(), entry.id());
        assert!(registry.get_by_code("ABCDEF").is_some());
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let registry = RoomRegistry::new(8);
        registry.insert(room("ABCDEF")).ok().unwrap();
        let rejected = registry.insert(room("ABCDEF"));
        assert!(rejected.is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_clears_code_index() {
        let registry = RoomRegistry::new(8);
        let entry = registry.insert(room("ZZZ222")).ok().unwrap();
        assert!(registry.remove(entry.id()).is_some());
        assert!(registry.is_empty());
        assert!(registry.get_by_code("ZZZ222").is_none());
        assert!(registry.remove(entry.id()).is_none());
    }

    #[tokio::test]
    async fn failed_work_aborts_the_plan() {
        let registry = RoomRegistry::new(8);
        let entry = registry.insert(room("QQQ333")).ok().unwrap();

        let result: Result<((), RoomStatus), ServiceError> = entry
            .run_transition(
                RoomEvent::StartGame,
                None,
                |_| Ok(()),
                |_| async { Err(ServiceError::NotFound("no content".into())) },
                |_, ()| Ok(()),
            )
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        let slot = entry.lock().await;
        assert_eq!(slot.status(), RoomStatus::Waiting);
        assert!(!slot.lifecycle.is_pending());
    }

    #[tokio::test]
    async fn timed_out_work_aborts_the_plan() {
        let registry = RoomRegistry::new(8);
        let entry = registry.insert(room("TTT444")).ok().unwrap();

        let result: Result<((), RoomStatus), ServiceError> = entry
            .run_transition(
                RoomEvent::StartGame,
                Some(Duration::from_millis(10)),
                |_| Ok(()),
                |_| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                },
                |_, ()| Ok(()),
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Timeout)));
        assert_eq!(entry.lock().await.status(), RoomStatus::Waiting);
        assert_eq!(registry.active_games().await, 0);
    }

    #[tokio::test]
    async fn successful_transition_commits_and_applies() {
        let registry = RoomRegistry::new(8);
        let entry = registry.insert(room("WWW555")).ok().unwrap();

        let (locked, status) = entry
            .run_transition(
                RoomEvent::StartGame,
                None,
                |slot| Ok(slot.room.members.len()),
                |count| async move { Ok(count) },
                |slot, count| {
                    slot.room.locked = count > 0;
                    Ok(slot.room.locked)
                },
            )
            .await
            .unwrap();
        assert!(locked);
        assert_eq!(status, RoomStatus::InProgress);
        assert_eq!(registry.active_games().await, 1);
    }
}
