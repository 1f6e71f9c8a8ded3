// Seat map generation: 80/20 normal/VIP split, fixed-width rows, 2-6-2 aisle grouping.
// Pure function of the layout config. Same config in, same map out.

use serde::Serialize;
use tracing::debug;

use crate::error::SeatingError;
use crate::types::*;

const ROW_LABELS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of normal seats for a given capacity: floor(total * 0.8).
pub fn normal_seat_count(total_seats: u32) -> u32 {
    (u64::from(total_seats) * 4 / 5) as u32
}

/// Display label for a row index within a class block.
/// `A`..`Z` for the first 26 rows, then the 1-based row number.
pub fn row_label(index: u32) -> String {
    match ROW_LABELS.get(index as usize) {
        Some(letter) => char::from(*letter).to_string(),
        None => (index + 1).to_string(),
    }
}

/// A position in a rendered row: either a seat or an aisle gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RowSlot {
    Seat { number: SeatNumber },
    Aisle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatRow {
    pub index: u32,
    pub label: String,
    pub slots: Vec<RowSlot>,
}

impl SeatRow {
    pub fn seat_numbers(&self) -> impl Iterator<Item = SeatNumber> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            RowSlot::Seat { number } => Some(*number),
            RowSlot::Aisle => None,
        })
    }
}

/// All rows of one seat class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatBlock {
    pub class: SeatClass,
    pub price: Price,
    /// First seat number in the block. Meaningless when `seat_count` is zero.
    pub first_number: u32,
    pub seat_count: u32,
    pub rows: Vec<SeatRow>,
}

impl SeatBlock {
    pub fn contains(&self, number: SeatNumber) -> bool {
        let n = number.get();
        n >= self.first_number && n < self.first_number + self.seat_count
    }
}

/// Generated seat map. Seats are stored in an arena indexed by `number - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatMap {
    pub normal: SeatBlock,
    pub vip: SeatBlock,
    seats: Vec<Seat>,
}

impl SeatMap {
    pub fn generate(config: &SeatLayoutConfig) -> Result<SeatMap, SeatingError> {
        config.validate()?;

        let total = config.total_seats;
        let normal_count = normal_seat_count(total);
        let vip_count = total - normal_count;

        let mut seats = Vec::with_capacity(total as usize);
        let normal = generate_block(config, SeatClass::Normal, 1, normal_count, &mut seats);
        let vip = generate_block(
            config,
            SeatClass::Vip,
            normal_count + 1,
            vip_count,
            &mut seats,
        );

        let ignored = config
            .booked_seat_numbers
            .iter()
            .filter(|n| n.get() > total)
            .count();
        if ignored > 0 {
            debug!(ignored, total, "booked seats outside the layout ignored");
        }
        debug!(
            total,
            normal = normal_count,
            vip = vip_count,
            booked = seats.iter().filter(|s| s.status == SeatStatus::Booked).count(),
            "seat map generated"
        );

        Ok(SeatMap { normal, vip, seats })
    }

    pub fn total_seats(&self) -> u32 {
        self.seats.len() as u32
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, number: SeatNumber) -> Option<&Seat> {
        let index = (number.get() as usize).checked_sub(1)?;
        self.seats.get(index)
    }

    pub(crate) fn seat_mut(&mut self, number: SeatNumber) -> Option<&mut Seat> {
        let index = (number.get() as usize).checked_sub(1)?;
        self.seats.get_mut(index)
    }

    pub fn block(&self, class: SeatClass) -> &SeatBlock {
        match class {
            SeatClass::Normal => &self.normal,
            SeatClass::Vip => &self.vip,
        }
    }

    pub fn booked_count(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| s.status == SeatStatus::Booked)
            .count()
    }
}

fn generate_block(
    config: &SeatLayoutConfig,
    class: SeatClass,
    first_number: u32,
    seat_count: u32,
    seats: &mut Vec<Seat>,
) -> SeatBlock {
    let price = config.price_for(class);
    let per_row = config.seats_per_row;
    let row_count = seat_count.div_ceil(per_row);

    let mut rows = Vec::with_capacity(row_count as usize);
    let mut number = first_number;

    for row in 0..row_count {
        let in_this_row = per_row.min(seat_count - row * per_row);
        let mut slots = Vec::with_capacity(in_this_row as usize + config.aisle_columns.len());

        for column in 0..in_this_row {
            if config.aisle_columns.contains(&column) {
                slots.push(RowSlot::Aisle);
            }

            let seat_number = SeatNumber::new(number);
            let status = if config.booked_seat_numbers.contains(&seat_number) {
                SeatStatus::Booked
            } else {
                SeatStatus::Available
            };
            seats.push(Seat {
                number: seat_number,
                class,
                price,
                row,
                column,
                status,
            });
            slots.push(RowSlot::Seat {
                number: seat_number,
            });
            number += 1;
        }

        rows.push(SeatRow {
            index: row,
            label: row_label(row),
            slots,
        });
    }

    SeatBlock {
        class,
        price,
        first_number,
        seat_count,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(total: u32, booked: &[u32]) -> SeatLayoutConfig {
        SeatLayoutConfig::new(
            total,
            Price::from_minor(20_000),
            Price::from_minor(30_000),
            booked.iter().copied().map(SeatNumber::new),
        )
    }

    #[test]
    fn ten_seats_split_eight_two() {
        let map = SeatMap::generate(&config(10, &[3])).unwrap();
        assert_eq!(map.normal.seat_count, 8);
        assert_eq!(map.vip.seat_count, 2);
        assert_eq!(map.vip.first_number, 9);
        assert_eq!(
            map.seat(SeatNumber::new(3)).map(|s| s.status),
            Some(SeatStatus::Booked)
        );
        assert_eq!(
            map.seat(SeatNumber::new(9)).map(|s| s.class),
            Some(SeatClass::Vip)
        );
    }

    #[test]
    fn full_row_has_two_six_two_grouping() {
        let map = SeatMap::generate(&config(60, &[])).unwrap();
        let row = &map.normal.rows[0];
        let shape: Vec<char> = row
            .slots
            .iter()
            .map(|slot| match slot {
                RowSlot::Seat { .. } => 'S',
                RowSlot::Aisle => '|',
            })
            .collect();
        assert_eq!(shape.iter().collect::<String>(), "SS|SSSSSS|SS");
        assert_eq!(row.seat_numbers().count(), 10);
    }

    #[test]
    fn short_row_only_gets_aisles_it_reaches() {
        // 12 vip seats -> second row has 2 seats, no aisle.
        let map = SeatMap::generate(&config(60, &[])).unwrap();
        assert_eq!(map.vip.seat_count, 12);
        assert_eq!(map.vip.rows.len(), 2);
        assert_eq!(map.vip.rows[1].slots.len(), 2);
        assert!(map.vip.rows[1]
            .slots
            .iter()
            .all(|s| matches!(s, RowSlot::Seat { .. })));
    }

    #[test]
    fn both_blocks_restart_row_labels() {
        let map = SeatMap::generate(&config(60, &[])).unwrap();
        assert_eq!(map.normal.rows[0].label, "A");
        assert_eq!(map.normal.rows[4].label, "E");
        assert_eq!(map.vip.rows[0].label, "A");
        assert_eq!(map.vip.rows[1].label, "B");
    }

    #[test]
    fn row_label_falls_back_to_number() {
        assert_eq!(row_label(0), "A");
        assert_eq!(row_label(25), "Z");
        assert_eq!(row_label(26), "27");
    }

    #[test]
    fn zero_seats_renders_nothing() {
        let map = SeatMap::generate(&config(0, &[1])).unwrap();
        assert!(map.normal.rows.is_empty());
        assert!(map.vip.rows.is_empty());
        assert_eq!(map.total_seats(), 0);
        assert!(map.seat(SeatNumber::new(1)).is_none());
    }

    #[test]
    fn out_of_range_booked_seats_are_ignored() {
        let map = SeatMap::generate(&config(10, &[11, 500])).unwrap();
        assert_eq!(map.booked_count(), 0);
    }

    #[test]
    fn zero_row_width_is_rejected() {
        let mut bad = config(10, &[]);
        bad.seats_per_row = 0;
        assert!(matches!(
            SeatMap::generate(&bad),
            Err(SeatingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn seat_zero_is_not_addressable() {
        let map = SeatMap::generate(&config(10, &[])).unwrap();
        assert!(map.seat(SeatNumber::new(0)).is_none());
    }

    proptest! {
        #[test]
        fn blocks_partition_the_seat_range(total in 0u32..400) {
            let map = SeatMap::generate(&config(total, &[])).unwrap();
            prop_assert_eq!(map.normal.seat_count + map.vip.seat_count, total);
            prop_assert_eq!(map.normal.seat_count, (total as f64 * 0.8).floor() as u32);

            let numbers: Vec<u32> = map
                .normal
                .rows
                .iter()
                .chain(map.vip.rows.iter())
                .flat_map(|row| row.seat_numbers())
                .map(|n| n.get())
                .collect();
            let expected: Vec<u32> = (1..=total).collect();
            prop_assert_eq!(numbers, expected);

            for seat in map.seats() {
                prop_assert_eq!(seat.class == SeatClass::Normal, seat.number.get() <= map.normal.seat_count);
                prop_assert!(map.block(seat.class).contains(seat.number));
                prop_assert!(seat.column < 10);
            }
        }

        #[test]
        fn generation_is_deterministic(
            total in 0u32..200,
            booked in prop::collection::vec(0u32..250, 0..30),
        ) {
            let cfg = config(total, &booked);
            let first = SeatMap::generate(&cfg).unwrap();
            let second = SeatMap::generate(&cfg).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }

        #[test]
        fn booked_seats_in_range_are_booked(
            total in 1u32..200,
            booked in prop::collection::vec(1u32..250, 0..30),
        ) {
            let map = SeatMap::generate(&config(total, &booked)).unwrap();
            for seat in map.seats() {
                let expected = booked.contains(&seat.number.get());
                prop_assert_eq!(seat.status == SeatStatus::Booked, expected);
            }
        }
    }
}
