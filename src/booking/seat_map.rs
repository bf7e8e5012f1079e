use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Seats per row in the 2-aisle-2 coach layout.
const SEATS_PER_ROW: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Booked,
    Selected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatClass {
    Window,
    Aisle,
    Middle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub seat_number: String,
    pub status: SeatStatus,
    #[serde(rename = "type")]
    pub class: SeatClass,
}

/// Lays out `total_seats` seats four per row, labelling each with its row
/// number and column letter (1A, 1B, ...). Any excess of the final row is
/// discarded. A seat present in both `booked` and `selected` reports booked.
pub fn generate_seat_map(
    total_seats: usize,
    booked: &HashSet<String>,
    selected: &HashSet<String>,
) -> Vec<Seat> {
    let mut seats = Vec::with_capacity(total_seats);
    let rows = total_seats.div_ceil(SEATS_PER_ROW);

    for row in 1..=rows {
        for col in 1..=SEATS_PER_ROW {
            if (row - 1) * SEATS_PER_ROW + col > total_seats {
                break;
            }

            let seat_number = format!("{row}{}", (b'A' + col as u8 - 1) as char);
            let status = if booked.contains(&seat_number) {
                SeatStatus::Booked
            } else if selected.contains(&seat_number) {
                SeatStatus::Selected
            } else {
                SeatStatus::Available
            };
            // Middle is unreachable at four seats per row; the arm is kept so
            // wider layouts would classify their inner columns.
            let class = match col {
                1 | 4 => SeatClass::Window,
                2 | 3 => SeatClass::Aisle,
                _ => SeatClass::Middle,
            };

            seats.push(Seat {
                seat_number,
                status,
                class,
            });
        }
    }

    seats
}

/// Toggles `seat_number` in the selection. Booked seats are a no-op, already
/// selected seats are removed, and new seats are added only while the
/// selection is below `max_seats`. Returns the updated selection; the caller
/// owns it.
pub fn toggle_seat(
    seat_number: &str,
    mut selected: Vec<String>,
    booked: &HashSet<String>,
    max_seats: usize,
) -> Vec<String> {
    if booked.contains(seat_number) {
        return selected;
    }

    if let Some(pos) = selected.iter().position(|s| s == seat_number) {
        selected.remove(pos);
    } else if selected.len() < max_seats {
        selected.push(seat_number.to_owned());
    }

    selected
}
