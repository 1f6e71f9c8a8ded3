// seating_core: Rust/WASM engine behind the seat-selection page.
// Layout and selection state live here; the page script only renders and forwards clicks.

mod checkout;
mod error;
mod layout;
mod selection;
mod types;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use checkout::{parse_seat_list, FareQuote, FareRequest, PaymentRequest};
pub use error::SeatingError;
pub use layout::{normal_seat_count, row_label, RowSlot, SeatBlock, SeatMap, SeatRow};
pub use selection::{clamp_max_selectable, SelectionSummary, SelectionTracker, ToggleOutcome};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// What a seat click did, as reported to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickOutcome {
    Selected,
    Deselected,
    Ignored,
    /// Ticket cap reached; the seat was left alone.
    Rejected,
}

impl From<ToggleOutcome> for ClickOutcome {
    fn from(outcome: ToggleOutcome) -> Self {
        match outcome {
            ToggleOutcome::Selected => ClickOutcome::Selected,
            ToggleOutcome::Deselected => ClickOutcome::Deselected,
            ToggleOutcome::Ignored => ClickOutcome::Ignored,
        }
    }
}

/// Reply to a seat click. `notice` carries the blocking message when rejected.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleReport {
    pub outcome: ClickOutcome,
    pub notice: Option<String>,
    pub summary: SelectionSummary,
}

/// Reply to a ticket-count change.
#[derive(Debug, Clone, Serialize)]
pub struct TicketCountReport {
    pub max_selectable: u32,
    /// Seats deselected because they no longer fit.
    pub released: Vec<SeatNumber>,
    pub summary: SelectionSummary,
}

/// One seat-selection page session, exposed to JavaScript.
/// Every call is synchronous; results come back as JSON strings.
#[wasm_bindgen]
#[derive(Debug)]
pub struct SeatingSession {
    booking: BookingData,
    tracker: SelectionTracker,
}

#[wasm_bindgen]
impl SeatingSession {
    /// Build the session from the page's booking data JSON.
    /// Fails on malformed data; nothing is rendered in that case.
    #[wasm_bindgen(constructor)]
    pub fn new(booking_json: &str) -> Result<SeatingSession, JsValue> {
        Ok(Self::from_json(booking_json)?)
    }

    /// Seat map as JSON: `{ normal, vip, seats }`.
    pub fn layout(&self) -> Result<String, JsValue> {
        Ok(serde_json::to_string(self.tracker.map()).map_err(SeatingError::from)?)
    }

    /// Toggle a seat. Capacity rejections are reported in the JSON, not thrown.
    pub fn toggle(&mut self, seat_number: u32) -> Result<String, JsValue> {
        Ok(self.toggle_report(SeatNumber::new(seat_number))?)
    }

    pub fn set_max_selectable(&mut self, max: i32) -> Result<String, JsValue> {
        let released = self.tracker.set_max_selectable(i64::from(max));
        Ok(self.ticket_count_report(released)?)
    }

    /// The `-`/`+` ticket buttons.
    pub fn change_ticket_count(&mut self, delta: i32) -> Result<String, JsValue> {
        let released = self.tracker.change_ticket_count(i64::from(delta));
        Ok(self.ticket_count_report(released)?)
    }

    pub fn summary(&self) -> Result<String, JsValue> {
        Ok(serde_json::to_string(&self.tracker.summary()).map_err(SeatingError::from)?)
    }

    /// Finalise the selection and return the payment page URL.
    /// Throws "Please select at least one seat!" when nothing is selected.
    pub fn commit(&self) -> Result<String, JsValue> {
        Ok(self.payment_request()?.to_url())
    }

    /// Selected seat numbers in selection order.
    pub fn selected_seat_numbers(&self) -> js_sys::Uint32Array {
        let numbers: Vec<u32> = self
            .tracker
            .selected()
            .iter()
            .map(|s| s.number.get())
            .collect();
        js_sys::Uint32Array::from(numbers.as_slice())
    }

    pub fn showtime_label(&self) -> String {
        self.booking.showtime_label()
    }

    pub fn max_selectable(&self) -> u32 {
        self.tracker.max_selectable()
    }
}

impl SeatingSession {
    pub fn from_json(booking_json: &str) -> Result<Self, SeatingError> {
        let booking = BookingData::from_json(booking_json)?;
        Self::from_booking(booking)
    }

    pub fn from_booking(booking: BookingData) -> Result<Self, SeatingError> {
        let config = booking.layout_config()?;
        let tracker = SelectionTracker::from_config(&config)?;
        Ok(SeatingSession { booking, tracker })
    }

    pub fn booking(&self) -> &BookingData {
        &self.booking
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn payment_request(&self) -> Result<PaymentRequest, SeatingError> {
        let seats = self.tracker.commit()?;
        PaymentRequest::new(self.booking.showtime_id.clone(), seats)
    }

    fn toggle_report(&mut self, seat: SeatNumber) -> Result<String, SeatingError> {
        let (outcome, notice) = match self.tracker.toggle(seat) {
            Ok(outcome) => (ClickOutcome::from(outcome), None),
            Err(err @ SeatingError::CapacityExceeded { .. }) => {
                (ClickOutcome::Rejected, Some(err.to_string()))
            }
            Err(err) => return Err(err),
        };
        let report = ToggleReport {
            outcome,
            notice,
            summary: self.tracker.summary(),
        };
        Ok(serde_json::to_string(&report)?)
    }

    fn ticket_count_report(&self, released: Vec<SeatNumber>) -> Result<String, SeatingError> {
        let report = TicketCountReport {
            max_selectable: self.tracker.max_selectable(),
            released,
            summary: self.tracker.summary(),
        };
        Ok(serde_json::to_string(&report)?)
    }
}

/// Fare preview for the payment page.
/// Input: `{ "seats": "1,2", "seating_capacity": 60, "ticket_price": 200, "vip_price": 300 }`.
#[wasm_bindgen]
pub fn quote_fare(request_json: &str) -> Result<String, JsValue> {
    let request: FareRequest = serde_json::from_str(request_json)
        .map_err(|e| SeatingError::InvalidConfig(e.to_string()))?;
    let quote = FareQuote::from_request(&request)?;
    Ok(serde_json::to_string(&quote).map_err(SeatingError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKING: &str = r#"{
        "totalSeats": 10,
        "normalTicketPrice": 200,
        "vipTicketPrice": 300,
        "movieId": "m1",
        "showtimeId": "st42",
        "showDate": "2024-05-01",
        "showTime": "18:30",
        "bookedSeats": ["3"]
    }"#;

    fn outcome(json: &str) -> serde_json::Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn session_creation_works() {
        let session = SeatingSession::new(BOOKING);
        assert!(session.is_ok());
    }

    #[test]
    fn session_from_booking_json() {
        let session = SeatingSession::from_json(BOOKING).unwrap();
        assert_eq!(session.showtime_label(), "2024-05-01 18:30");
        assert_eq!(session.max_selectable(), 4);
        assert_eq!(
            session.tracker().status(SeatNumber::new(3)),
            Some(SeatStatus::Booked)
        );
    }

    #[test]
    fn toggle_reports_rejection_in_json() {
        let mut session = SeatingSession::from_json(BOOKING).unwrap();
        assert_eq!(outcome(&session.toggle(3).unwrap())["outcome"], "ignored");
        for n in [1, 2, 4, 5] {
            assert_eq!(outcome(&session.toggle(n).unwrap())["outcome"], "selected");
        }

        let rejected = outcome(&session.toggle(6).unwrap());
        assert_eq!(rejected["outcome"], "rejected");
        assert_eq!(
            rejected["notice"],
            "You can only select up to 4 tickets. Change the ticket count to select more."
        );
        assert_eq!(rejected["summary"]["count"], 4);
    }

    #[test]
    fn ticket_count_change_releases_tail() {
        let mut session = SeatingSession::from_json(BOOKING).unwrap();
        session.set_max_selectable(3).unwrap();
        for n in [5, 2, 9] {
            session.toggle(n).unwrap();
        }

        let report = outcome(&session.change_ticket_count(-2).unwrap());
        assert_eq!(report["max_selectable"], 1);
        assert_eq!(report["released"], serde_json::json!([2, 9]));
        assert_eq!(report["summary"]["seat_numbers"], serde_json::json!([5]));
    }

    #[test]
    fn commit_builds_payment_request() {
        let mut session = SeatingSession::from_json(BOOKING).unwrap();
        session.toggle(9).unwrap();
        session.toggle(1).unwrap();

        let summary = outcome(&session.summary().unwrap());
        assert_eq!(summary["total_price"], 500.0);

        let request = session.payment_request().unwrap();
        assert_eq!(request.to_url(), "/payment/st42?seats=1%2C9");
        assert_eq!(session.commit().unwrap(), "/payment/st42?seats=1%2C9");
    }

    #[test]
    fn empty_commit_has_no_payment_request() {
        let session = SeatingSession::from_json(BOOKING).unwrap();
        assert_eq!(
            session.payment_request(),
            Err(SeatingError::EmptySelection)
        );
    }

    #[test]
    fn click_outcomes_serialize_lowercase() {
        for (outcome, name) in [
            (ClickOutcome::Selected, "\"selected\""),
            (ClickOutcome::Deselected, "\"deselected\""),
            (ClickOutcome::Ignored, "\"ignored\""),
            (ClickOutcome::Rejected, "\"rejected\""),
        ] {
            assert_eq!(serde_json::to_string(&outcome).unwrap(), name);
        }
        assert_eq!(
            ClickOutcome::from(ToggleOutcome::Deselected),
            ClickOutcome::Deselected
        );
    }

    #[test]
    fn huge_total_seats_is_config_error() {
        assert!(matches!(
            SeatingSession::from_json(r#"{"totalSeats":4294967295}"#),
            Err(SeatingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn null_showtime_id_is_accepted() {
        let session = SeatingSession::from_json(r#"{"movieId":null,"showtimeId":null}"#).unwrap();
        assert_eq!(session.booking().showtime_id, "");
    }

    #[test]
    fn invalid_booking_data_is_config_error() {
        assert!(matches!(
            SeatingSession::from_json(r#"{"totalSeats":-5}"#),
            Err(SeatingError::InvalidConfig(_))
        ));
        assert!(matches!(
            SeatingSession::from_json("not json"),
            Err(SeatingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn layout_json_lists_blocks() {
        let session = SeatingSession::from_json(BOOKING).unwrap();
        let layout = outcome(&session.layout().unwrap());
        assert_eq!(layout["normal"]["seat_count"], 8);
        assert_eq!(layout["vip"]["first_number"], 9);
        assert_eq!(layout["normal"]["rows"][0]["slots"][2]["kind"], "aisle");
        assert_eq!(layout["seats"][2]["status"], "booked");
    }

    #[test]
    fn fare_quote_from_json() {
        let quote = outcome(&quote_fare(r#"{"seats":"1,49","seating_capacity":60}"#).unwrap());
        assert_eq!(quote["ticket_amount"], 500.0);
        assert_eq!(quote["convenience_fee"], 25.0);
        assert_eq!(quote["total_amount"], 525.0);
    }
}
