//! Status-check orchestration.
//!
//! One cycle is: look up departures, format them, send the message. The
//! steps run strictly in that order and a failed lookup never reaches the
//! notifier.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;

use crate::darwin::{DarwinError, DepartureBoard};
use crate::domain::{ClockTime, StationCode};
use crate::status::format_board;
use crate::telegram::TelegramError;

/// Source of departure boards.
#[async_trait]
pub trait DepartureLookup: Send + Sync {
    /// Departures from `origin` calling at `destination` around `time`.
    ///
    /// `Ok(None)` means the API answered without a board.
    async fn lookup(
        &self,
        time: ClockTime,
        origin: &StationCode,
        destination: &StationCode,
    ) -> Result<Option<DepartureBoard>, DarwinError>;
}

/// Destination for status messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), TelegramError>;
}

/// Errors from a status-check cycle.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("departure lookup failed: {0}")]
    Lookup(#[from] DarwinError),

    #[error("notification failed: {0}")]
    Notification(#[from] TelegramError),
}

/// Checks a station pair and reports the result to the notifier.
#[derive(Clone)]
pub struct TrainService {
    lookup: Arc<dyn DepartureLookup>,
    notifier: Arc<dyn Notifier>,
}

impl TrainService {
    pub fn new(lookup: Arc<dyn DepartureLookup>, notifier: Arc<dyn Notifier>) -> Self {
        Self { lookup, notifier }
    }

    /// Run one cycle using the current local time.
    pub async fn check_and_notify(
        &self,
        origin: &StationCode,
        destination: &StationCode,
    ) -> Result<Option<DepartureBoard>, CheckError> {
        let now = ClockTime::from_time(Local::now().time());
        self.check_and_notify_at(now, origin, destination).await
    }

    /// Run one cycle for the board at `time`.
    ///
    /// Sends exactly one message when the API returns a board, including an
    /// empty one, and none when it returns no board or fails.
    pub async fn check_and_notify_at(
        &self,
        time: ClockTime,
        origin: &StationCode,
        destination: &StationCode,
    ) -> Result<Option<DepartureBoard>, CheckError> {
        let Some(board) = self.lookup.lookup(time, origin, destination).await? else {
            tracing::warn!(%origin, %destination, "departures API returned no board");
            return Ok(None);
        };

        let message = format_board(&board, origin, destination);
        self.notifier.send(&message).await?;

        tracing::info!(
            %origin,
            %destination,
            services = board.services().len(),
            "train status sent"
        );
        Ok(Some(board))
    }

    /// Send a free-form message, such as the startup announcement.
    pub async fn announce(&self, message: &str) -> Result<(), TelegramError> {
        self.notifier.send(message).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn service(lookup: Arc<FakeLookup>, notifier: Arc<RecordingNotifier>) -> TrainService {
        TrainService::new(lookup, notifier)
    }

    fn at(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    #[tokio::test]
    async fn sends_formatted_board() {
        let lookup = Arc::new(FakeLookup::new(Reply::Board(euston_board())));
        let notifier = Arc::new(RecordingNotifier::default());
        let trains = service(lookup.clone(), notifier.clone());

        let result = trains
            .check_and_notify_at(at("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap();

        assert_eq!(result, Some(euston_board()));
        assert_eq!(
            lookup.calls.lock().unwrap().as_slice(),
            &[("08:05".to_string(), "EUS".to_string(), "BHM".to_string())]
        );

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        let message = &sent[0];
        assert!(message.starts_with(
            "*Train Status Update for London Euston to Birmingham New Street*\n"
        ));
        assert!(message.contains("🟢"));
        assert!(message.contains("Platform 1"));
        assert!(message.contains("*08:30*"));
        assert!(!message.contains("delayed by"));
    }

    #[tokio::test]
    async fn empty_board_sends_no_services_message() {
        let board = DepartureBoard {
            location_name: Some("London Euston".into()),
            train_services: Some(vec![]),
            ..Default::default()
        };
        let lookup = Arc::new(FakeLookup::new(Reply::Board(board.clone())));
        let notifier = Arc::new(RecordingNotifier::default());
        let trains = service(lookup, notifier.clone());

        let result = trains
            .check_and_notify_at(at("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap();

        assert_eq!(result, Some(board));
        assert_eq!(notifier.sent(), vec!["No train services found for EUS to BHM."]);
    }

    #[tokio::test]
    async fn absent_board_sends_nothing() {
        let lookup = Arc::new(FakeLookup::new(Reply::NoBoard));
        let notifier = Arc::new(RecordingNotifier::default());
        let trains = service(lookup, notifier.clone());

        let result = trains
            .check_and_notify_at(at("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn lookup_failure_sends_nothing() {
        let lookup = Arc::new(FakeLookup::new(Reply::Fail(503)));
        let notifier = Arc::new(RecordingNotifier::default());
        let trains = service(lookup, notifier.clone());

        let err = trains
            .check_and_notify_at(at("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckError::Lookup(ref e) if e.status() == Some(503)));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn notification_failure_propagates() {
        let lookup = Arc::new(FakeLookup::new(Reply::Board(euston_board())));
        let notifier = Arc::new(RecordingNotifier::failing());
        let trains = service(lookup, notifier.clone());

        let err = trains
            .check_and_notify_at(at("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckError::Notification(_)));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn check_uses_wall_clock_time() {
        let lookup = Arc::new(FakeLookup::new(Reply::NoBoard));
        let notifier = Arc::new(RecordingNotifier::default());
        let trains = service(lookup.clone(), notifier);

        trains
            .check_and_notify(&code("EUS"), &code("BHM"))
            .await
            .unwrap();

        let calls = lookup.calls.lock().unwrap();
        assert!(ClockTime::parse_hhmm(&calls[0].0).is_ok());
    }
}
