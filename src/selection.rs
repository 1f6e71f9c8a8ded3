// Selection tracking over a generated seat map.
// Invariant: selected.len() <= max_selectable, numbers unique, no booked seat ever selected.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SeatingError;
use crate::layout::SeatMap;
use crate::types::*;

/// Clamp a requested ticket count to the allowed range.
pub fn clamp_max_selectable(requested: i64) -> u32 {
    requested.clamp(i64::from(MIN_SELECTABLE), i64::from(MAX_SELECTABLE)) as u32
}

/// Result of a toggle that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Seat is booked or does not exist.
    Ignored,
}

/// Snapshot of the selection for the summary panel and the proceed button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub count: usize,
    pub total_price: Price,
    /// Ascending, independent of selection order.
    pub seat_numbers: Vec<SeatNumber>,
    pub max_selectable: u32,
    pub display: String,
    pub can_proceed: bool,
}

/// Owns the seat map and the ordered selection for one page session.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    map: SeatMap,
    selected: Vec<SelectedSeat>,
    max_selectable: u32,
}

impl SelectionTracker {
    pub fn new(map: SeatMap, max_selectable: u32) -> Self {
        SelectionTracker {
            map,
            selected: Vec::new(),
            max_selectable: max_selectable.clamp(MIN_SELECTABLE, MAX_SELECTABLE),
        }
    }

    pub fn from_config(config: &SeatLayoutConfig) -> Result<Self, SeatingError> {
        let map = SeatMap::generate(config)?;
        Ok(Self::new(map, config.max_selectable))
    }

    pub fn map(&self) -> &SeatMap {
        &self.map
    }

    pub fn max_selectable(&self) -> u32 {
        self.max_selectable
    }

    /// Selected seats in selection order.
    pub fn selected(&self) -> &[SelectedSeat] {
        &self.selected
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn status(&self, number: SeatNumber) -> Option<SeatStatus> {
        self.map.seat(number).map(|seat| seat.status)
    }

    /// Select an available seat or release a selected one.
    /// Booked and unknown seats are ignored. Selecting past the cap is rejected
    /// with `CapacityExceeded` and leaves everything unchanged.
    pub fn toggle(&mut self, number: SeatNumber) -> Result<ToggleOutcome, SeatingError> {
        let at_capacity = self.selected.len() >= self.max_selectable as usize;
        let max = self.max_selectable;

        let Some(seat) = self.map.seat_mut(number) else {
            debug!(seat = %number, "toggle on unknown seat ignored");
            return Ok(ToggleOutcome::Ignored);
        };

        match seat.status {
            SeatStatus::Booked => {
                debug!(seat = %number, "toggle on booked seat ignored");
                Ok(ToggleOutcome::Ignored)
            }
            SeatStatus::Selected => {
                seat.status = SeatStatus::Available;
                self.selected.retain(|s| s.number != number);
                debug!(seat = %number, count = self.selected.len(), "seat deselected");
                Ok(ToggleOutcome::Deselected)
            }
            SeatStatus::Available => {
                if at_capacity {
                    info!(seat = %number, max, "selection rejected at capacity");
                    return Err(SeatingError::CapacityExceeded { max });
                }
                seat.status = SeatStatus::Selected;
                self.selected.push(SelectedSeat::from(&*seat));
                debug!(seat = %number, count = self.selected.len(), "seat selected");
                Ok(ToggleOutcome::Selected)
            }
        }
    }

    /// Set the ticket cap, clamped to 1..=10. If the selection no longer fits,
    /// the most recently selected seats are released. Returns the released seats.
    pub fn set_max_selectable(&mut self, requested: i64) -> Vec<SeatNumber> {
        self.max_selectable = clamp_max_selectable(requested);

        let keep = self.max_selectable as usize;
        if self.selected.len() <= keep {
            return Vec::new();
        }

        let released: Vec<SeatNumber> = self
            .selected
            .split_off(keep)
            .into_iter()
            .map(|s| s.number)
            .collect();
        for number in &released {
            if let Some(seat) = self.map.seat_mut(*number) {
                seat.status = SeatStatus::Available;
            }
        }
        debug!(
            max = self.max_selectable,
            released = released.len(),
            "selection truncated to new ticket count"
        );
        released
    }

    /// The ticket-count stepper: adjust the cap by `delta`.
    pub fn change_ticket_count(&mut self, delta: i64) -> Vec<SeatNumber> {
        let requested = i64::from(self.max_selectable).saturating_add(delta);
        self.set_max_selectable(requested)
    }

    pub fn summary(&self) -> SelectionSummary {
        let mut seat_numbers: Vec<SeatNumber> = self.selected.iter().map(|s| s.number).collect();
        seat_numbers.sort_unstable();

        let display = if seat_numbers.is_empty() {
            "None".to_string()
        } else {
            seat_numbers
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        SelectionSummary {
            count: self.selected.len(),
            total_price: self.selected.iter().map(|s| s.price).sum(),
            can_proceed: !seat_numbers.is_empty(),
            seat_numbers,
            max_selectable: self.max_selectable,
            display,
        }
    }

    /// Finalise the selection. Returns ascending seat numbers for payment.
    pub fn commit(&self) -> Result<Vec<SeatNumber>, SeatingError> {
        if self.selected.is_empty() {
            return Err(SeatingError::EmptySelection);
        }
        Ok(self.summary().seat_numbers)
    }
}
