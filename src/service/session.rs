use std::sync::Arc;

use chrono::{NaiveDateTime, SubsecRound};
use tracing::{info, warn};

use super::clock::Clock;
use super::evidence::{EvidenceStore, EvidenceUpload};
use crate::error::AttendanceError;
use crate::model::attendance::{AttendanceRecord, Coordinates, NewAttendance};
use crate::store::AttendanceStore;

/// Check-in / check-out state machine.
///
/// A user holds at most one open record per day. Check-out closes the most
/// recent open record and never creates one.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    evidence: Arc<dyn EvidenceStore>,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        evidence: Arc<dyn EvidenceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            evidence,
            clock,
        }
    }

    pub async fn check_in(
        &self,
        user_id: u64,
        coordinates: Coordinates,
        evidence: EvidenceUpload,
    ) -> Result<AttendanceRecord, AttendanceError> {
        if evidence.bytes.is_empty() {
            return Err(AttendanceError::validation("Selfie image is required"));
        }

        let now = self.now();
        let work_date = now.date();

        // Cheap early exit; the store's unique key is the real guard.
        if self.store.find_open_for_day(user_id, work_date).await?.is_some() {
            return Err(AttendanceError::AlreadyCheckedIn);
        }

        let evidence_path = self.evidence.save(evidence).await?;

        let inserted = self
            .store
            .insert_open(NewAttendance {
                user_id,
                work_date,
                check_in: now,
                coordinates,
                evidence_path: evidence_path.clone(),
            })
            .await;

        match inserted {
            Ok(record) => {
                info!(user_id, record_id = record.id, "Checked in");
                Ok(record)
            }
            Err(e) => {
                if let Err(discard_err) = self.evidence.discard(&evidence_path).await {
                    warn!(error = %discard_err, path = %evidence_path, "Failed to discard orphaned evidence");
                }
                Err(e.into())
            }
        }
    }

    pub async fn check_out(&self, user_id: u64) -> Result<AttendanceRecord, AttendanceError> {
        let record = self
            .store
            .close_latest_open(user_id, self.now())
            .await?
            .ok_or(AttendanceError::NoOpenSession)?;

        info!(user_id, record_id = record.id, "Checked out");
        Ok(record)
    }

    // Stored columns hold whole seconds; the returned record and the
    // derived work date must agree with what a later read sees.
    fn now(&self) -> NaiveDateTime {
        self.clock.now().trunc_subsecs(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::clock::FixedClock;
    use crate::service::evidence::fakes::{FailingEvidenceStore, InMemoryEvidenceStore};
    use crate::store::memory::{BrokenAttendanceStore, InMemoryAttendanceStore};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    struct Harness {
        store: Arc<InMemoryAttendanceStore>,
        evidence: Arc<InMemoryEvidenceStore>,
        clock: Arc<FixedClock>,
        service: AttendanceService,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryAttendanceStore::with_users(&[
            (42, "Alice"),
            (7, "Budi"),
        ]));
        let evidence = Arc::new(InMemoryEvidenceStore::default());
        let clock = Arc::new(FixedClock::at("2026-01-05T08:00:00"));
        let service = AttendanceService::new(store.clone(), evidence.clone(), clock.clone());
        Harness {
            store,
            evidence,
            clock,
            service,
        }
    }

    fn jakarta() -> Coordinates {
        Coordinates::new(-6.2, 106.8).unwrap()
    }

    fn selfie() -> EvidenceUpload {
        EvidenceUpload::new(JPEG.to_vec(), Some("image/jpeg"), 1024).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[actix_web::test]
    async fn check_in_creates_open_record_with_exact_coordinates() {
        let h = harness();

        let record = h.service.check_in(42, jakarta(), selfie()).await.unwrap();

        assert_eq!(record.user_id, 42);
        assert_eq!(record.check_in, at("2026-01-05T08:00:00"));
        assert_eq!(record.work_date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert!(record.check_out.is_none());
        assert_eq!(record.latitude, -6.2);
        assert_eq!(record.longitude, 106.8);
        assert_eq!(h.evidence.get(&record.evidence_path).as_deref(), Some(JPEG));
        assert_eq!(h.store.records(), vec![record]);
    }

    #[actix_web::test]
    async fn check_out_closes_same_record_and_keeps_evidence() {
        let h = harness();
        let opened = h.service.check_in(42, jakarta(), selfie()).await.unwrap();

        h.clock.advance(Duration::hours(9));
        let closed = h.service.check_out(42).await.unwrap();

        assert_eq!(closed.id, opened.id);
        assert_eq!(closed.check_out, Some(at("2026-01-05T17:00:00")));
        assert_eq!(closed.latitude, opened.latitude);
        assert_eq!(closed.longitude, opened.longitude);
        assert_eq!(closed.evidence_path, opened.evidence_path);
    }

    #[actix_web::test]
    async fn second_check_in_same_day_is_rejected_and_store_unchanged() {
        let h = harness();
        h.service.check_in(42, jakarta(), selfie()).await.unwrap();
        let before = h.store.records();

        h.clock.advance(Duration::minutes(30));
        let err = h.service.check_in(42, jakarta(), selfie()).await.unwrap_err();

        assert_eq!(err, AttendanceError::AlreadyCheckedIn);
        assert_eq!(h.store.records(), before);
        assert_eq!(h.evidence.stored_paths().len(), 1);
    }

    #[actix_web::test]
    async fn check_out_twice_fails_the_second_time() {
        let h = harness();
        h.service.check_in(42, jakarta(), selfie()).await.unwrap();

        assert!(h.service.check_out(42).await.is_ok());
        assert_eq!(
            h.service.check_out(42).await.unwrap_err(),
            AttendanceError::NoOpenSession
        );
    }

    #[actix_web::test]
    async fn check_out_without_check_in_creates_nothing() {
        let h = harness();

        assert_eq!(
            h.service.check_out(42).await.unwrap_err(),
            AttendanceError::NoOpenSession
        );
        assert!(h.store.records().is_empty());
    }

    #[actix_web::test]
    async fn check_in_again_after_check_out_opens_new_session() {
        let h = harness();
        h.service.check_in(42, jakarta(), selfie()).await.unwrap();
        h.clock.advance(Duration::hours(4));
        h.service.check_out(42).await.unwrap();

        h.clock.advance(Duration::hours(1));
        let second = h.service.check_in(42, jakarta(), selfie()).await.unwrap();

        assert!(second.is_open());
        assert_eq!(h.store.records().iter().filter(|r| r.is_open()).count(), 1);
    }

    #[actix_web::test]
    async fn concurrent_check_ins_create_exactly_one_record() {
        let h = harness();

        let (a, b) = futures::join!(
            h.service.check_in(42, jakarta(), selfie()),
            h.service.check_in(42, jakarta(), selfie()),
        );

        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .any(|r| r.as_ref().err() == Some(&AttendanceError::AlreadyCheckedIn))
        );
        assert_eq!(h.store.records().len(), 1);
        // The losing attempt must not leave an orphaned blob behind.
        assert_eq!(h.evidence.stored_paths().len(), 1);
    }

    #[actix_web::test]
    async fn different_users_do_not_interfere() {
        let h = harness();

        let (a, b) = futures::join!(
            h.service.check_in(42, jakarta(), selfie()),
            h.service.check_in(7, jakarta(), selfie()),
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(h.store.records().len(), 2);
    }

    #[actix_web::test]
    async fn evidence_failure_creates_no_record() {
        let store = Arc::new(InMemoryAttendanceStore::with_users(&[(42, "Alice")]));
        let clock = Arc::new(FixedClock::at("2026-01-05T08:00:00"));
        let service = AttendanceService::new(store.clone(), Arc::new(FailingEvidenceStore), clock);

        let err = service.check_in(42, jakarta(), selfie()).await.unwrap_err();

        assert!(matches!(err, AttendanceError::Storage(_)));
        assert!(store.records().is_empty());
    }

    #[actix_web::test]
    async fn store_failure_surfaces_as_storage_error() {
        let evidence = Arc::new(InMemoryEvidenceStore::default());
        let clock = Arc::new(FixedClock::at("2026-01-05T08:00:00"));
        let service = AttendanceService::new(Arc::new(BrokenAttendanceStore), evidence, clock);

        assert!(matches!(
            service.check_out(42).await.unwrap_err(),
            AttendanceError::Storage(_)
        ));
    }

    #[actix_web::test]
    async fn check_out_picks_most_recent_open_record_when_invariant_is_broken() {
        let h = harness();
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        for (id, check_in) in [(1, "2026-01-05T07:00:00"), (2, "2026-01-05T07:30:00")] {
            h.store.seed(AttendanceRecord {
                id,
                user_id: 42,
                work_date: day,
                check_in: at(check_in),
                check_out: None,
                latitude: 0.0,
                longitude: 0.0,
                evidence_path: format!("uploads/{id}.jpg"),
            });
        }

        let closed = h.service.check_out(42).await.unwrap();

        assert_eq!(closed.id, 2);
        let still_open: Vec<u64> = h
            .store
            .records()
            .into_iter()
            .filter(|r| r.is_open())
            .map(|r| r.id)
            .collect();
        assert_eq!(still_open, vec![1]);
    }

    #[actix_web::test]
    async fn check_out_never_precedes_check_in() {
        let h = harness();
        h.service.check_in(42, jakarta(), selfie()).await.unwrap();

        // Wall clock stepped backwards (NTP correction).
        h.clock.set(at("2026-01-05T07:55:00"));
        let closed = h.service.check_out(42).await.unwrap();

        assert!(closed.check_out.unwrap() >= closed.check_in);
    }

    #[actix_web::test]
    async fn stale_open_session_from_yesterday_does_not_block_check_in() {
        let h = harness();
        h.service.check_in(42, jakarta(), selfie()).await.unwrap();

        h.clock.advance(Duration::days(1));
        let today = h.service.check_in(42, jakarta(), selfie()).await.unwrap();

        assert_eq!(today.work_date, NaiveDate::from_ymd_opt(2026, 1, 6).unwrap());
        // Check-out closes the most recent one first.
        assert_eq!(h.service.check_out(42).await.unwrap().id, today.id);
    }

    #[actix_web::test]
    async fn timestamps_are_stored_in_whole_seconds() {
        let h = harness();
        let late = at("2026-01-05T23:59:59") + Duration::milliseconds(600);
        h.clock.set(late);

        let opened = h.service.check_in(42, jakarta(), selfie()).await.unwrap();

        assert_eq!(opened.check_in, at("2026-01-05T23:59:59"));
        assert_eq!(opened.work_date, opened.check_in.date());

        h.clock.advance(Duration::milliseconds(250));
        let closed = h.service.check_out(42).await.unwrap();
        assert_eq!(closed.check_out, Some(at("2026-01-05T23:59:59")));
        assert_eq!(h.store.records(), vec![closed]);
    }
}
