//! The presence ledger: record taps, derive direction, answer status.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use workpass_auth::{ActorIdentity, Role};
use workpass_core::{CompanyId, EmployeeId};
use workpass_tags::TagUid;

use crate::event::{AttendanceEvent, Direction, TapKind};
use crate::store::{AttendanceStore, EmployeeDirectory, StoreError, TagStore};

/// A tap to be recorded. Everything here is client-supplied; the ledger
/// assigns the timestamp and direction itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapRequest {
    pub user_id: EmployeeId,
    pub company_id: CompanyId,
    pub tag_uid: TagUid,
    pub counter: u32,
    pub signature: Option<String>,
    pub kind: Option<TapKind>,
}

/// Outcome of a recorded tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TapRecorded {
    pub direction: Direction,
    pub recorded_at: DateTime<Utc>,
}

/// Presence query status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// At least one ledger event exists.
    Success,
    /// No ledger history for this user yet.
    Idle,
}

/// Answer to a current-status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub status: PresenceStatus,
    pub direction: Option<Direction>,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Which binding check a forbidden tap failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// An employee may only record against their own record.
    NotOwnRecord,
    /// The target is registered with a different company than the request names.
    CompanyBindingMismatch,
    /// The acting identity belongs to a different company than the request names.
    ActorCompanyMismatch,
    /// The tag is bound to a different company than the request names.
    TagCompanyMismatch,
}

impl core::fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ForbiddenReason::NotOwnRecord => "employees may only record their own taps",
            ForbiddenReason::CompanyBindingMismatch => {
                "user is not registered with the named company"
            }
            ForbiddenReason::ActorCompanyMismatch => "actor belongs to a different company",
            ForbiddenReason::TagCompanyMismatch => "tag is bound to a different company",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("forbidden: {0}")]
    Forbidden(ForbiddenReason),

    /// The target user has no registered company binding at all.
    #[error("user has no registered company")]
    NotRegistered,

    #[error("tag not found")]
    TagNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The presence state machine over external tag/directory/event stores.
///
/// Same-user taps serialize through a per-user lock around the
/// read-latest-then-append step, so two simultaneous taps can never both
/// observe the same "most recent" event and record the same direction twice.
/// Taps for distinct users never contend.
pub struct AttendanceLedger {
    tags: Arc<dyn TagStore>,
    directory: Arc<dyn EmployeeDirectory>,
    events: Arc<dyn AttendanceStore>,
    user_locks: Mutex<HashMap<EmployeeId, Arc<Mutex<()>>>>,
}

impl AttendanceLedger {
    pub fn new(
        tags: Arc<dyn TagStore>,
        directory: Arc<dyn EmployeeDirectory>,
        events: Arc<dyn AttendanceStore>,
    ) -> Self {
        Self {
            tags,
            directory,
            events,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Record a tap for `request.user_id` and return the derived direction.
    pub fn record_tap(
        &self,
        actor: &ActorIdentity,
        request: &TapRequest,
    ) -> Result<TapRecorded, LedgerError> {
        self.check_ownership(actor, request.user_id)?;
        self.check_company_bindings(actor, request.user_id, request.company_id)?;

        let tag = self
            .tags
            .find_by_uid(&request.tag_uid)
            .ok_or(LedgerError::TagNotFound)?;
        if tag.company_id != request.company_id {
            return Err(LedgerError::Forbidden(ForbiddenReason::TagCompanyMismatch));
        }

        // Read-latest + append under the user's lock; see the type docs.
        let lock = self.user_lock(request.user_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let direction = match self.events.most_recent(request.user_id) {
            Some(last) => last.direction.toggled(),
            None => Direction::In,
        };

        let recorded_at = Utc::now();
        let event = AttendanceEvent {
            event_id: Uuid::now_v7(),
            user_id: request.user_id,
            company_id: request.company_id,
            tag_id: tag.id,
            direction,
            recorded_at,
            counter: request.counter,
            signature: request.signature.clone(),
            kind: request.kind.unwrap_or_default(),
        };
        self.events.append(event)?;

        tracing::debug!(
            user_id = %request.user_id,
            company_id = %request.company_id,
            %direction,
            "tap recorded"
        );

        Ok(TapRecorded {
            direction,
            recorded_at,
        })
    }

    /// Current presence of `user_id`, under the same ownership and company
    /// checks as recording (no tag involved).
    pub fn current_status(
        &self,
        actor: &ActorIdentity,
        user_id: EmployeeId,
        company_id: CompanyId,
    ) -> Result<StatusView, LedgerError> {
        self.check_ownership(actor, user_id)?;
        self.check_company_bindings(actor, user_id, company_id)?;

        Ok(match self.events.most_recent(user_id) {
            None => StatusView {
                status: PresenceStatus::Idle,
                direction: None,
                recorded_at: None,
            },
            Some(last) => StatusView {
                status: PresenceStatus::Success,
                direction: Some(last.direction),
                recorded_at: Some(last.recorded_at),
            },
        })
    }

    fn check_ownership(
        &self,
        actor: &ActorIdentity,
        user_id: EmployeeId,
    ) -> Result<(), LedgerError> {
        if actor.role == Role::Employee && user_id != actor.id {
            return Err(LedgerError::Forbidden(ForbiddenReason::NotOwnRecord));
        }
        Ok(())
    }

    /// The three binding checks are distinct on purpose: registration,
    /// target-company match, actor-company match each deny on their own.
    fn check_company_bindings(
        &self,
        actor: &ActorIdentity,
        user_id: EmployeeId,
        company_id: CompanyId,
    ) -> Result<(), LedgerError> {
        let registered = self
            .directory
            .registered_company(user_id)
            .ok_or(LedgerError::NotRegistered)?;

        if registered != company_id {
            return Err(LedgerError::Forbidden(
                ForbiddenReason::CompanyBindingMismatch,
            ));
        }

        if actor.company_id != company_id {
            return Err(LedgerError::Forbidden(ForbiddenReason::ActorCompanyMismatch));
        }

        Ok(())
    }

    fn user_lock(&self, user_id: EmployeeId) -> Arc<Mutex<()>> {
        let mut locks = self
            .user_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(user_id).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use proptest::prelude::*;
    use std::sync::RwLock;
    use workpass_core::TagId;
    use workpass_tags::TagCredential;

    const TAG_UID: &str = "042C6632A91190";
    const TAG_KEY: &str = "169b35e5fd663d4042224323bc8ebc71";

    #[derive(Default)]
    struct FakeStores {
        tags: RwLock<Vec<TagCredential>>,
        registrations: RwLock<HashMap<EmployeeId, CompanyId>>,
        events: RwLock<Vec<AttendanceEvent>>,
    }

    impl TagStore for FakeStores {
        fn find_by_uid(&self, uid: &TagUid) -> Option<TagCredential> {
            self.tags
                .read()
                .ok()?
                .iter()
                .find(|t| &t.uid == uid)
                .cloned()
        }
    }

    impl EmployeeDirectory for FakeStores {
        fn registered_company(&self, user_id: EmployeeId) -> Option<CompanyId> {
            self.registrations.read().ok()?.get(&user_id).copied()
        }
    }

    impl AttendanceStore for FakeStores {
        fn most_recent(&self, user_id: EmployeeId) -> Option<AttendanceEvent> {
            self.events
                .read()
                .ok()?
                .iter()
                .filter(|e| e.user_id == user_id)
                .max_by_key(|e| (e.recorded_at, e.event_id))
                .cloned()
        }

        fn append(&self, event: AttendanceEvent) -> Result<(), StoreError> {
            self.events
                .write()
                .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?
                .push(event);
            Ok(())
        }
    }

    fn setup() -> (Arc<FakeStores>, AttendanceLedger) {
        let stores = Arc::new(FakeStores::default());

        stores.tags.write().unwrap().push(
            TagCredential::from_hex_key(
                TagUid::parse(TAG_UID).unwrap(),
                TAG_KEY,
                CompanyId::new(1),
                "front door",
            )
            .unwrap(),
        );
        stores.tags.write().unwrap().push(TagCredential {
            id: TagId::new(),
            uid: TagUid::parse("04AABBCCDDEE00").unwrap(),
            aes_key: [0u8; 16],
            company_id: CompanyId::new(2),
            display_name: "other office".to_string(),
        });

        let mut regs = stores.registrations.write().unwrap();
        regs.insert(EmployeeId::new(3), CompanyId::new(1));
        regs.insert(EmployeeId::new(4), CompanyId::new(1));
        regs.insert(EmployeeId::new(9), CompanyId::new(2));
        drop(regs);

        let ledger = AttendanceLedger::new(stores.clone(), stores.clone(), stores.clone());
        (stores, ledger)
    }

    fn employee(id: i64) -> ActorIdentity {
        ActorIdentity::new(EmployeeId::new(id), Role::Employee, CompanyId::new(1))
    }

    fn manager(id: i64) -> ActorIdentity {
        ActorIdentity::new(EmployeeId::new(id), Role::Manager, CompanyId::new(1))
    }

    fn tap_for(user: i64) -> TapRequest {
        TapRequest {
            user_id: EmployeeId::new(user),
            company_id: CompanyId::new(1),
            tag_uid: TagUid::parse(TAG_UID).unwrap(),
            counter: 54,
            signature: Some("6B8B1F06C2B3B7C1".to_string()),
            kind: None,
        }
    }

    #[test]
    fn first_tap_is_in() {
        let (_, ledger) = setup();
        let recorded = ledger.record_tap(&employee(3), &tap_for(3)).unwrap();
        assert_eq!(recorded.direction, Direction::In);
    }

    #[test]
    fn consecutive_taps_alternate() {
        let (_, ledger) = setup();
        let first = ledger.record_tap(&employee(3), &tap_for(3)).unwrap();
        let second = ledger.record_tap(&employee(3), &tap_for(3)).unwrap();
        let third = ledger.record_tap(&employee(3), &tap_for(3)).unwrap();

        assert_eq!(first.direction, Direction::In);
        assert_eq!(second.direction, Direction::Out);
        assert_eq!(third.direction, Direction::In);
    }

    #[test]
    fn users_toggle_independently() {
        let (_, ledger) = setup();
        ledger.record_tap(&employee(3), &tap_for(3)).unwrap();
        let other = ledger.record_tap(&employee(4), &tap_for(4)).unwrap();
        assert_eq!(other.direction, Direction::In);
    }

    #[test]
    fn employee_cannot_record_for_someone_else() {
        let (_, ledger) = setup();
        let err = ledger.record_tap(&employee(4), &tap_for(3)).unwrap_err();
        assert_eq!(err, LedgerError::Forbidden(ForbiddenReason::NotOwnRecord));
    }

    #[test]
    fn manager_can_record_for_another_user() {
        let (_, ledger) = setup();
        let recorded = ledger.record_tap(&manager(2), &tap_for(3)).unwrap();
        assert_eq!(recorded.direction, Direction::In);
    }

    #[test]
    fn unregistered_user_is_rejected() {
        let (_, ledger) = setup();
        let err = ledger.record_tap(&manager(2), &tap_for(404)).unwrap_err();
        assert_eq!(err, LedgerError::NotRegistered);
    }

    #[test]
    fn wrong_company_binding_is_forbidden() {
        let (_, ledger) = setup();
        // User 9 is registered with company 2, request names company 1.
        let err = ledger.record_tap(&manager(2), &tap_for(9)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Forbidden(ForbiddenReason::CompanyBindingMismatch)
        );
    }

    #[test]
    fn actor_from_other_company_is_forbidden() {
        let (_, ledger) = setup();
        let outsider =
            ActorIdentity::new(EmployeeId::new(8), Role::Manager, CompanyId::new(2));
        let err = ledger.record_tap(&outsider, &tap_for(3)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Forbidden(ForbiddenReason::ActorCompanyMismatch)
        );
    }

    #[test]
    fn unknown_tag_is_not_found() {
        let (_, ledger) = setup();
        let mut request = tap_for(3);
        request.tag_uid = TagUid::parse("04FFFFFFFFFFFF").unwrap();
        let err = ledger.record_tap(&employee(3), &request).unwrap_err();
        assert_eq!(err, LedgerError::TagNotFound);
    }

    #[test]
    fn tag_from_other_company_is_forbidden() {
        let (_, ledger) = setup();
        let mut request = tap_for(3);
        request.tag_uid = TagUid::parse("04AABBCCDDEE00").unwrap();
        let err = ledger.record_tap(&employee(3), &request).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Forbidden(ForbiddenReason::TagCompanyMismatch)
        );
    }

    #[test]
    fn status_is_idle_without_history() {
        let (_, ledger) = setup();
        let view = ledger
            .current_status(&employee(3), EmployeeId::new(3), CompanyId::new(1))
            .unwrap();
        assert_eq!(view.status, PresenceStatus::Idle);
        assert_eq!(view.direction, None);
        assert_eq!(view.recorded_at, None);
    }

    #[test]
    fn status_reflects_last_event() {
        let (_, ledger) = setup();
        ledger.record_tap(&employee(3), &tap_for(3)).unwrap();
        let view = ledger
            .current_status(&employee(3), EmployeeId::new(3), CompanyId::new(1))
            .unwrap();
        assert_eq!(view.status, PresenceStatus::Success);
        assert_eq!(view.direction, Some(Direction::In));
        assert!(view.recorded_at.is_some());
    }

    #[test]
    fn status_applies_ownership_check() {
        let (_, ledger) = setup();
        let err = ledger
            .current_status(&employee(4), EmployeeId::new(3), CompanyId::new(1))
            .unwrap_err();
        assert_eq!(err, LedgerError::Forbidden(ForbiddenReason::NotOwnRecord));
    }

    #[test]
    fn concurrent_same_user_taps_still_alternate() {
        let (stores, ledger) = setup();
        let ledger = Arc::new(ledger);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    ledger.record_tap(&employee(3), &tap_for(3)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let events = stores.events.read().unwrap();
        let mut directions: Vec<_> = events
            .iter()
            .filter(|e| e.user_id == EmployeeId::new(3))
            .map(|e| (e.recorded_at, e.event_id, e.direction))
            .collect();
        directions.sort_by_key(|(recorded_at, event_id, _)| (*recorded_at, *event_id));

        assert_eq!(directions.len(), 8);
        for (i, (_, _, direction)) in directions.iter().enumerate() {
            let expected = if i % 2 == 0 {
                Direction::In
            } else {
                Direction::Out
            };
            assert_eq!(*direction, expected, "event {i} out of order");
        }
    }

    proptest! {
        #[test]
        fn tap_parity_determines_direction(taps in 1usize..40) {
            let (_, ledger) = setup();
            let mut last = None;
            for _ in 0..taps {
                last = Some(ledger.record_tap(&employee(3), &tap_for(3)).unwrap());
            }

            let expected = if taps % 2 == 1 { Direction::In } else { Direction::Out };
            prop_assert_eq!(last.unwrap().direction, expected);
        }
    }
}
