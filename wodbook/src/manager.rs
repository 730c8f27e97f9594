//! Booking manager: the single owner of booking state.
//!
//! Enforces the "at most one active booking" invariant locally, before
//! any remote call, and is the only component the presentation layer
//! talks to. Holds the slot cache of the most recent listing; `book`
//! resolves slot ids against that cache only.

use log::{info, warn};

use crate::client::BookingApi;
use crate::error::ClientError;
use crate::models::{ActiveBooking, ClassSlot, Outcome, Session};
use crate::store::BookingLedger;

/// Account credentials used to obtain and refresh sessions.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account e-mail.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Orchestrates listing, booking, and cancelling for the single user.
pub struct BookingManager<A: BookingApi> {
    api: A,
    credentials: Credentials,
    ledger: BookingLedger,
    session: Session,
    /// Slots from the most recent listing. Replaced wholesale on each
    /// `list_classes` call.
    slots: Vec<ClassSlot>,
    active: Option<ActiveBooking>,
}

impl<A: BookingApi> BookingManager<A> {
    /// Obtain a session (cached or fresh) and restore the active booking
    /// from the ledger.
    pub async fn connect(
        api: A,
        credentials: Credentials,
        ledger: BookingLedger,
    ) -> Result<Self, ClientError> {
        let session = api
            .obtain_session(&credentials.email, &credentials.password)
            .await?;
        let active = ledger.load();
        if let Some(booking) = &active {
            info!(
                "restored active booking: {} on {}",
                booking.slot, booking.slot.day
            );
        }
        Ok(Self {
            api,
            credentials,
            ledger,
            session,
            slots: Vec::new(),
            active,
        })
    }

    /// Fetch the classes bookable on a day (`YYYYMMDD`) and refresh the
    /// slot cache. Pure query; no state transition.
    ///
    /// A listing that comes back as a login page means the cached session
    /// expired remotely: log in again and retry the listing once. That is
    /// the only automatic retry anywhere in the manager.
    pub async fn list_classes(&mut self, day: &str) -> Result<&[ClassSlot], ClientError> {
        match self.api.list_slots(&self.session, day).await {
            Ok(slots) => self.slots = slots,
            Err(ClientError::StaleSession) => {
                info!("cached session went stale, logging in again");
                self.session = self
                    .api
                    .refresh_session(&self.credentials.email, &self.credentials.password)
                    .await?;
                self.slots = self.api.list_slots(&self.session, day).await?;
            }
            Err(err) => return Err(err),
        }
        Ok(&self.slots)
    }

    /// Book a slot from the current cache by id.
    ///
    /// Refused locally, with no remote call, while a booking is already
    /// active or when the id is not in the cache. The ledger is written
    /// only after a confirmed `Booked` outcome, so a failed book is never
    /// partially applied.
    pub async fn book(&mut self, slot_id: u64) -> Outcome {
        if let Some(active) = &self.active {
            return Outcome::rejected(format!(
                "a booking is already active ({}); cancel it first",
                active.slot
            ));
        }
        let Some(slot) = self.slots.iter().find(|slot| slot.id == slot_id).cloned() else {
            return Outcome::rejected(format!("no class with id {slot_id} in the last listing"));
        };

        let outcome = self.api.book(&self.session, slot.id, &slot.day).await;
        if let Outcome::Booked { confirmation_id } = outcome {
            let booking = ActiveBooking::new(slot, confirmation_id);
            if let Err(err) = self.ledger.save(&booking) {
                warn!("booking confirmed but not persisted: {err}");
            }
            info!("booked {} on {}", booking.slot, booking.slot.day);
            self.active = Some(booking);
        }
        outcome
    }

    /// Cancel the active booking.
    ///
    /// Refused locally when nothing is active. On any outcome other than
    /// `Cancelled` the ledger is untouched so the caller can retry.
    pub async fn cancel(&mut self) -> Outcome {
        let Some(active) = &self.active else {
            return Outcome::rejected("no active booking to cancel");
        };

        let outcome = self.api.cancel(&self.session, active.confirmation_id).await;
        if outcome == Outcome::Cancelled {
            if let Err(err) = self.ledger.clear() {
                warn!("cancellation confirmed but ledger not cleared: {err}");
            }
            info!("cancelled {}", active.slot);
            self.active = None;
        }
        outcome
    }

    /// The outstanding booking, if any.
    pub const fn current_booking(&self) -> Option<&ActiveBooking> {
        self.active.as_ref()
    }

    /// Class names present in the current cache, deduplicated, in
    /// listing order. The presentation layer groups by name first.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for slot in &self.slots {
            if !names.contains(&slot.class_name.as_str()) {
                names.push(&slot.class_name);
            }
        }
        names
    }

    /// All cached slots for one class name, in listing order.
    pub fn slots_for_class(&self, name: &str) -> Vec<&ClassSlot> {
        self.slots
            .iter()
            .filter(|slot| slot.class_name == name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    /// Scripted stand-in for the remote service.
    #[derive(Default)]
    struct FakeApi {
        listings: Mutex<VecDeque<Result<Vec<ClassSlot>, ClientError>>>,
        book_outcomes: Mutex<VecDeque<Outcome>>,
        cancel_outcomes: Mutex<VecDeque<Outcome>>,
        logins: AtomicUsize,
        book_calls: AtomicUsize,
        cancel_calls: AtomicUsize,
    }

    impl BookingApi for FakeApi {
        async fn obtain_session(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<Session, ClientError> {
            Ok(Session::new(email, "sid=cached"))
        }

        async fn refresh_session(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<Session, ClientError> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            Ok(Session::new(email, "sid=fresh"))
        }

        async fn list_slots(
            &self,
            _session: &Session,
            _day: &str,
        ) -> Result<Vec<ClassSlot>, ClientError> {
            self.listings
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn book(&self, _session: &Session, _slot_id: u64, _day: &str) -> Outcome {
            self.book_calls.fetch_add(1, Ordering::SeqCst);
            self.book_outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected book call")
        }

        async fn cancel(&self, _session: &Session, _confirmation_id: u64) -> Outcome {
            self.cancel_calls.fetch_add(1, Ordering::SeqCst);
            self.cancel_outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected cancel call")
        }
    }

    fn slot(id: u64, time: &str, class_name: &str) -> ClassSlot {
        ClassSlot {
            id,
            time: time.to_string(),
            time_id: format!("{id}_60"),
            class_id: 1,
            class_name: class_name.to_string(),
            coach_name: "Ana".to_string(),
            ocupation: 3,
            limit: 12,
            book_state: None,
            reservation_id: None,
            day: "20240101".to_string(),
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            email: "a@example.com".to_string(),
            password: "pw".to_string(),
        }
    }

    async fn manager_with(
        api: FakeApi,
        dir: &TempDir,
    ) -> BookingManager<FakeApi> {
        let ledger = BookingLedger::open_at(dir.path().join("booking.json"));
        BookingManager::connect(api, credentials(), ledger)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_book_commits_and_refuses_second_book() {
        let api = FakeApi::default();
        api.listings
            .lock()
            .unwrap()
            .push_back(Ok(vec![slot(100, "10:00", "WOD")]));
        api.book_outcomes.lock().unwrap().push_back(Outcome::Booked {
            confirmation_id: 42,
        });

        let dir = tempdir().unwrap();
        let mut manager = manager_with(api, &dir).await;
        manager.list_classes("20240101").await.unwrap();

        let outcome = manager.book(100).await;
        assert_eq!(
            outcome,
            Outcome::Booked {
                confirmation_id: 42
            }
        );
        assert_eq!(manager.current_booking().unwrap().slot.id, 100);

        // Second book is refused locally: no further remote call.
        let refused = manager.book(100).await;
        assert!(matches!(refused, Outcome::Rejected { .. }));
        assert_eq!(manager.api.book_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_book_leaves_state_untouched() {
        let api = FakeApi::default();
        api.listings
            .lock()
            .unwrap()
            .push_back(Ok(vec![slot(100, "10:00", "WOD")]));
        api.book_outcomes.lock().unwrap().push_back(Outcome::Rejected {
            code: Some(0),
            message: "full".to_string(),
        });
        api.book_outcomes
            .lock()
            .unwrap()
            .push_back(Outcome::TransportFailure {
                detail: "timeout".to_string(),
            });

        let dir = tempdir().unwrap();
        let mut manager = manager_with(api, &dir).await;
        manager.list_classes("20240101").await.unwrap();

        assert!(matches!(
            manager.book(100).await,
            Outcome::Rejected { .. }
        ));
        assert!(manager.current_booking().is_none());

        assert!(matches!(
            manager.book(100).await,
            Outcome::TransportFailure { .. }
        ));
        assert!(manager.current_booking().is_none());

        // Nothing was persisted either.
        let ledger = BookingLedger::open_at(dir.path().join("booking.json"));
        assert!(ledger.load().is_none());
    }

    #[tokio::test]
    async fn test_book_unknown_slot_is_local_rejection() {
        let api = FakeApi::default();
        api.listings
            .lock()
            .unwrap()
            .push_back(Ok(vec![slot(100, "10:00", "WOD")]));

        let dir = tempdir().unwrap();
        let mut manager = manager_with(api, &dir).await;
        manager.list_classes("20240101").await.unwrap();

        assert!(matches!(manager.book(999).await, Outcome::Rejected { .. }));
        assert_eq!(manager.api.book_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_without_booking_is_local_rejection() {
        let dir = tempdir().unwrap();
        let mut manager = manager_with(FakeApi::default(), &dir).await;

        assert!(matches!(manager.cancel().await, Outcome::Rejected { .. }));
        assert_eq!(manager.api.cancel_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_cancel_keeps_booking_for_retry() {
        let api = FakeApi::default();
        api.listings
            .lock()
            .unwrap()
            .push_back(Ok(vec![slot(100, "10:00", "WOD")]));
        api.book_outcomes.lock().unwrap().push_back(Outcome::Booked {
            confirmation_id: 42,
        });
        api.cancel_outcomes
            .lock()
            .unwrap()
            .push_back(Outcome::TransportFailure {
                detail: "timeout".to_string(),
            });
        api.cancel_outcomes
            .lock()
            .unwrap()
            .push_back(Outcome::Cancelled);

        let dir = tempdir().unwrap();
        let mut manager = manager_with(api, &dir).await;
        manager.list_classes("20240101").await.unwrap();
        manager.book(100).await;

        assert!(matches!(
            manager.cancel().await,
            Outcome::TransportFailure { .. }
        ));
        assert!(manager.current_booking().is_some());

        // The retry the caller decides on succeeds.
        assert_eq!(manager.cancel().await, Outcome::Cancelled);
        assert!(manager.current_booking().is_none());
    }

    #[tokio::test]
    async fn test_booking_survives_restart() {
        let dir = tempdir().unwrap();
        {
            let api = FakeApi::default();
            api.listings
                .lock()
                .unwrap()
                .push_back(Ok(vec![slot(100, "10:00", "WOD")]));
            api.book_outcomes.lock().unwrap().push_back(Outcome::Booked {
                confirmation_id: 42,
            });
            let mut manager = manager_with(api, &dir).await;
            manager.list_classes("20240101").await.unwrap();
            manager.book(100).await;
        }

        // A fresh manager over the same ledger restores the booking.
        let manager = manager_with(FakeApi::default(), &dir).await;
        let booking = manager.current_booking().unwrap();
        assert_eq!(booking.slot.id, 100);
        assert_eq!(booking.confirmation_id, 42);
    }

    #[tokio::test]
    async fn test_stale_session_retries_listing_once() {
        let api = FakeApi::default();
        {
            let mut listings = api.listings.lock().unwrap();
            listings.push_back(Err(ClientError::StaleSession));
            listings.push_back(Ok(vec![slot(100, "10:00", "WOD")]));
        }

        let dir = tempdir().unwrap();
        let mut manager = manager_with(api, &dir).await;

        let slots = manager.list_classes("20240101").await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(manager.api.logins.load(Ordering::SeqCst), 1);
        assert_eq!(manager.session.cookie_header, "sid=fresh");
    }

    #[tokio::test]
    async fn test_group_book_cancel_scenario() {
        let api = FakeApi::default();
        api.listings.lock().unwrap().push_back(Ok(vec![
            slot(100, "10:00", "WOD"),
            slot(101, "18:00", "WOD"),
            slot(102, "19:00", "Open Box"),
        ]));
        api.book_outcomes.lock().unwrap().push_back(Outcome::Booked {
            confirmation_id: 7,
        });
        api.cancel_outcomes
            .lock()
            .unwrap()
            .push_back(Outcome::Cancelled);

        let dir = tempdir().unwrap();
        let mut manager = manager_with(api, &dir).await;
        manager.list_classes("20240101").await.unwrap();

        assert_eq!(manager.class_names(), vec!["WOD", "Open Box"]);
        let wod_times: Vec<&str> = manager
            .slots_for_class("WOD")
            .iter()
            .map(|slot| slot.time.as_str())
            .collect();
        assert_eq!(wod_times, vec!["10:00", "18:00"]);

        let second_id = manager.slots_for_class("WOD")[1].id;
        assert_eq!(
            manager.book(second_id).await,
            Outcome::Booked { confirmation_id: 7 }
        );
        assert_eq!(manager.cancel().await, Outcome::Cancelled);

        assert!(manager.current_booking().is_none());
        let ledger = BookingLedger::open_at(dir.path().join("booking.json"));
        assert!(ledger.load().is_none());
    }
}
