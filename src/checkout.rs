// Payment hand-off: the navigation target for the payment page and its fare preview.
// Seat classes are recovered from the seat number alone, using the same 80/20 split as the layout.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SeatingError;
use crate::layout::normal_seat_count;
use crate::types::*;

/// Convenience fee charged on top of the ticket amount, in percent.
pub const CONVENIENCE_FEE_PERCENT: u64 = 5;

/// Navigation request for the payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub showtime_id: String,
    /// Ascending, no duplicates.
    pub seats: Vec<SeatNumber>,
}

impl PaymentRequest {
    pub fn new(
        showtime_id: impl Into<String>,
        mut seats: Vec<SeatNumber>,
    ) -> Result<Self, SeatingError> {
        if seats.is_empty() {
            return Err(SeatingError::EmptySelection);
        }
        seats.sort_unstable();
        seats.dedup();
        Ok(PaymentRequest {
            showtime_id: showtime_id.into(),
            seats,
        })
    }

    /// Comma-joined seat numbers, e.g. "2,5,9".
    pub fn seats_param(&self) -> String {
        self.seats
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `/payment/{showtime}?seats=...`, encoded like `URLSearchParams` does.
    pub fn to_url(&self) -> String {
        format!(
            "/payment/{}?seats={}",
            urlencoding::encode(&self.showtime_id),
            urlencoding::encode(&self.seats_param())
        )
    }
}

/// Parse the `seats` query value of the payment page. Each comma-separated
/// token is reduced to its digits, so "A12" reads as seat 12.
pub fn parse_seat_list(value: &str) -> Result<Vec<SeatNumber>, SeatingError> {
    if value.trim().is_empty() {
        return Err(SeatingError::InvalidSeatList("no seats given".to_string()));
    }

    value
        .split(',')
        .map(|token| {
            let digits = digits_of(token);
            match digits.parse::<u32>() {
                Ok(n) if n > 0 => Ok(SeatNumber::new(n)),
                _ => Err(SeatingError::InvalidSeatList(format!(
                    "'{}' is not a seat number",
                    token.trim()
                ))),
            }
        })
        .collect()
}

/// Fare preview request from the payment page. Defaults match the booking page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareRequest {
    pub seats: String,
    #[serde(default = "default_seating_capacity")]
    pub seating_capacity: u32,
    #[serde(default = "default_ticket_price")]
    pub ticket_price: Price,
    #[serde(default = "default_vip_price")]
    pub vip_price: Price,
}

fn default_seating_capacity() -> u32 {
    60
}

fn default_ticket_price() -> Price {
    Price::from_minor(20_000)
}

fn default_vip_price() -> Price {
    Price::from_minor(30_000)
}

/// Ticket amount, convenience fee and total for a list of seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareQuote {
    pub seats: Vec<SeatNumber>,
    pub normal_seats: u32,
    pub vip_seats: u32,
    pub ticket_amount: Price,
    pub convenience_fee: Price,
    pub total_amount: Price,
}

impl FareQuote {
    pub fn compute(
        seats: &[SeatNumber],
        seating_capacity: u32,
        normal_price: Price,
        vip_price: Price,
    ) -> Self {
        let normal_limit = normal_seat_count(seating_capacity);
        let normal_seats = seats.iter().filter(|n| n.get() <= normal_limit).count() as u32;
        let vip_seats = seats.len() as u32 - normal_seats;

        let ticket_amount: Price = seats
            .iter()
            .map(|n| {
                if n.get() <= normal_limit {
                    normal_price
                } else {
                    vip_price
                }
            })
            .sum();

        // Fee is charged in whole currency units, rounded down.
        let fee_units = ticket_amount
            .as_minor()
            .saturating_mul(CONVENIENCE_FEE_PERCENT)
            / 100
            / 100;
        let convenience_fee = Price::from_minor(fee_units.saturating_mul(100));

        debug!(
            seats = seats.len(),
            normal_seats,
            vip_seats,
            ticket = %ticket_amount,
            fee = %convenience_fee,
            "fare quoted"
        );

        FareQuote {
            seats: seats.to_vec(),
            normal_seats,
            vip_seats,
            ticket_amount,
            convenience_fee,
            total_amount: ticket_amount + convenience_fee,
        }
    }

    pub fn from_request(request: &FareRequest) -> Result<Self, SeatingError> {
        let seats = parse_seat_list(&request.seats)?;
        Ok(Self::compute(
            &seats,
            request.seating_capacity,
            request.ticket_price,
            request.vip_price,
        ))
    }
}
