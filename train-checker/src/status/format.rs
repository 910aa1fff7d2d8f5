//! Message layout.

use crate::darwin::{DepartureBoard, Location, ServiceEntry};
use crate::domain::StationCode;

use super::badge::{StatusBadge, delay_minutes};

/// Placeholder for a missing origin or destination name.
const UNKNOWN: &str = "Unknown";

/// Message sent when the lookup succeeded but no services are running.
pub fn no_services_message(origin: &StationCode, destination: &StationCode) -> String {
    format!("No train services found for {origin} to {destination}.")
}

/// Format a whole departure board as a Telegram message.
///
/// The header uses the station names resolved by the API, falling back to
/// the requested codes. An empty board produces [`no_services_message`].
pub fn format_board(
    board: &DepartureBoard,
    origin: &StationCode,
    destination: &StationCode,
) -> String {
    let services = board.services();
    if services.is_empty() {
        return no_services_message(origin, destination);
    }

    let origin_name = non_empty(board.location_name.as_deref()).unwrap_or(origin.as_str());
    let destination_name =
        non_empty(board.filter_location_name.as_deref()).unwrap_or(destination.as_str());

    let mut message = format!("*Train Status Update for {origin_name} to {destination_name}*\n");
    for service in services {
        message.push_str(&format_service_line(service));
        message.push('\n');
    }
    message
}

/// Format one service as a bullet line, without a trailing newline.
///
/// ```
/// use train_checker::darwin::ServiceEntry;
/// use train_checker::status::format_service_line;
///
/// let service = ServiceEntry {
///     std: "08:30".into(),
///     etd: "08:45".into(),
///     ..Default::default()
/// };
/// assert_eq!(
///     format_service_line(&service),
///     "- *08:30* from *Unknown* to *Unknown*: 🟠 *08:45* (delayed by 15 min)"
/// );
/// ```
pub fn format_service_line(service: &ServiceEntry) -> String {
    let origin = first_location_name(service.origin.as_deref());
    let destination = first_location_name(service.destination.as_deref());

    let platform = match non_empty(service.platform.as_deref()) {
        Some(p) => format!(" (Platform {p})"),
        None => String::new(),
    };

    let coaches = match service.length {
        Some(n) => format!(" ({n} Coaches)"),
        None => String::new(),
    };

    let badge = StatusBadge::classify(&service.etd);
    let mut status = badge.to_string();
    if matches!(badge, StatusBadge::Other(_))
        && let Some(delay) = delay_minutes(&service.std, &service.etd)
    {
        status.push_str(&format!(" (delayed by {delay} min)"));
    }

    format!(
        "- *{std}* from *{origin}*{platform} to *{destination}{coaches}*: {status}",
        std = service.std,
    )
}

fn first_location_name(locations: Option<&[Location]>) -> &str {
    locations
        .and_then(|l| l.first())
        .and_then(|l| non_empty(l.location_name.as_deref()))
        .unwrap_or(UNKNOWN)
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}
