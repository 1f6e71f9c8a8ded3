// Strong typing over raw numbers. Newtypes for seat numbers and prices.
// Booking data arrives from the page as JSON and is normalised here before layout.

use std::collections::BTreeSet;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::SeatingError;

/// Row width in seats.
pub const SEATS_PER_ROW: u32 = 10;
/// Zero-based columns that get an aisle gap in front of them (2-6-2 grouping).
pub const AISLE_COLUMNS: [u32; 2] = [2, 8];
pub const DEFAULT_MAX_SELECTABLE: u32 = 4;
pub const MIN_SELECTABLE: u32 = 1;
pub const MAX_SELECTABLE: u32 = 10;
/// Largest auditorium the generator accepts.
pub const MAX_TOTAL_SEATS: u32 = 10_000;

/// Seat number, 1-based and unique across both seat classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatNumber(u32);

impl SeatNumber {
    pub fn new(number: u32) -> Self {
        SeatNumber(number)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SeatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price in minor units (hundredths). Serialised as a decimal number of major units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u64);

impl Price {
    pub fn from_minor(minor: u64) -> Self {
        Price(minor)
    }

    /// Parse a configured ticket price. Rejects zero, negative and non-finite amounts.
    pub fn from_major(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        let minor = (amount * 100.0).round();
        if minor < 1.0 || minor >= u64::MAX as f64 {
            return None;
        }
        Some(Price(minor as u64))
    }

    pub fn as_minor(&self) -> u64 {
        self.0
    }

    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::default(), Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.0 % 100;
        if cents == 0 {
            write!(f, "{}", self.0 / 100)
        } else {
            write!(f, "{}.{:02}", self.0 / 100, cents)
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Price::from_major(amount)
            .ok_or_else(|| D::Error::custom(format!("price must be positive, got {}", amount)))
    }
}

/// Seat class. Normal seats sit near the screen, VIP seats behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatClass {
    Normal,
    Vip,
}

/// Seat status. `Booked` is fixed at generation time and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Booked,
    Available,
    Selected,
}

/// A generated seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub number: SeatNumber,
    pub class: SeatClass,
    pub price: Price,
    /// Row index within the seat's class block.
    pub row: u32,
    /// Position within the row, aisles not counted.
    pub column: u32,
    pub status: SeatStatus,
}

/// One entry of the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSeat {
    pub number: SeatNumber,
    pub class: SeatClass,
    pub price: Price,
}

impl From<&Seat> for SelectedSeat {
    fn from(seat: &Seat) -> Self {
        SelectedSeat {
            number: seat.number,
            class: seat.class,
            price: seat.price,
        }
    }
}

/// Everything the seat map generator needs. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatLayoutConfig {
    pub total_seats: u32,
    pub normal_price: Price,
    pub vip_price: Price,
    pub booked_seat_numbers: BTreeSet<SeatNumber>,
    pub seats_per_row: u32,
    pub aisle_columns: BTreeSet<u32>,
    pub max_selectable: u32,
}

impl SeatLayoutConfig {
    pub fn new(
        total_seats: u32,
        normal_price: Price,
        vip_price: Price,
        booked_seat_numbers: impl IntoIterator<Item = SeatNumber>,
    ) -> Self {
        SeatLayoutConfig {
            total_seats,
            normal_price,
            vip_price,
            booked_seat_numbers: booked_seat_numbers.into_iter().collect(),
            seats_per_row: SEATS_PER_ROW,
            aisle_columns: AISLE_COLUMNS.into_iter().collect(),
            max_selectable: DEFAULT_MAX_SELECTABLE,
        }
    }

    pub fn with_max_selectable(mut self, max_selectable: u32) -> Self {
        self.max_selectable = max_selectable.clamp(MIN_SELECTABLE, MAX_SELECTABLE);
        self
    }

    pub fn price_for(&self, class: SeatClass) -> Price {
        match class {
            SeatClass::Normal => self.normal_price,
            SeatClass::Vip => self.vip_price,
        }
    }

    pub fn validate(&self) -> Result<(), SeatingError> {
        if self.total_seats > MAX_TOTAL_SEATS {
            return Err(SeatingError::InvalidConfig(format!(
                "totalSeats must be at most {}, got {}",
                MAX_TOTAL_SEATS, self.total_seats
            )));
        }
        if self.seats_per_row == 0 {
            return Err(SeatingError::InvalidConfig(
                "seats_per_row must be greater than zero".to_string(),
            ));
        }
        if self.normal_price.as_minor() == 0 || self.vip_price.as_minor() == 0 {
            return Err(SeatingError::InvalidConfig(
                "ticket prices must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Seat number as sent by the booking page: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSeatNumber {
    Number(f64),
    Text(String),
}

impl RawSeatNumber {
    /// Normalise to a seat number. Strings are reduced to their digits ("A12" -> 12).
    pub fn normalize(&self) -> Option<SeatNumber> {
        match self {
            RawSeatNumber::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && *n >= 1.0 && *n <= u32::MAX as f64 {
                    Some(SeatNumber(*n as u32))
                } else {
                    None
                }
            }
            RawSeatNumber::Text(text) => digits_of(text)
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .map(SeatNumber),
        }
    }
}

pub(crate) fn digits_of(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Booking data embedded in the seat-selection page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    #[serde(default = "default_total_seats")]
    pub total_seats: u32,
    #[serde(default = "default_normal_ticket_price")]
    pub normal_ticket_price: f64,
    #[serde(default = "default_vip_ticket_price")]
    pub vip_ticket_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub movie_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub showtime_id: String,
    #[serde(default)]
    pub show_date: Option<String>,
    #[serde(default)]
    pub show_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub booked_seats: Vec<RawSeatNumber>,
}

/// The page writes `null` for values the backend did not supply.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_total_seats() -> u32 {
    60
}

fn default_normal_ticket_price() -> f64 {
    200.0
}

fn default_vip_ticket_price() -> f64 {
    300.0
}

impl BookingData {
    pub fn from_json(json: &str) -> Result<Self, SeatingError> {
        serde_json::from_str(json).map_err(|e| SeatingError::InvalidConfig(e.to_string()))
    }

    /// Validate prices and normalise booked seats into a layout config.
    pub fn layout_config(&self) -> Result<SeatLayoutConfig, SeatingError> {
        let normal_price = Price::from_major(self.normal_ticket_price).ok_or_else(|| {
            SeatingError::InvalidConfig(format!(
                "normalTicketPrice must be positive, got {}",
                self.normal_ticket_price
            ))
        })?;
        let vip_price = Price::from_major(self.vip_ticket_price).ok_or_else(|| {
            SeatingError::InvalidConfig(format!(
                "vipTicketPrice must be positive, got {}",
                self.vip_ticket_price
            ))
        })?;

        let mut booked = BTreeSet::new();
        for raw in &self.booked_seats {
            match raw.normalize() {
                Some(number) => {
                    booked.insert(number);
                }
                None => warn!(seat = ?raw, "dropping unreadable booked seat"),
            }
        }

        let config = SeatLayoutConfig::new(self.total_seats, normal_price, vip_price, booked);
        config.validate()?;
        Ok(config)
    }

    /// "{date} {time}" when the showtime is known, otherwise "Selected".
    pub fn showtime_label(&self) -> String {
        match (self.show_date.as_deref(), self.show_time.as_deref()) {
            (Some(date), Some(time)) if !date.is_empty() && !time.is_empty() => {
                format!("{} {}", date, time)
            }
            _ => "Selected".to_string(),
        }
    }
}
