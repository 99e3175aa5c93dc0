//! Terminal seat map: one block per location, one line per bay row.

use crate::core::engine::SeatStatus;
use crate::models::location::Location;
use crate::models::seat_key::SeatKey;
use crate::utils::colors::{BOLD, GREEN, GREY, RED, RESET, YELLOW};
use crate::utils::formatting::pad_left;

/// Render the seat map; `status` answers for every seat key of `date`.
pub fn render<F>(date: &str, mut status: F) -> String
where
    F: FnMut(&SeatKey) -> SeatStatus,
{
    let mut out = String::new();
    let mut taken: Vec<String> = Vec::new();

    out.push_str(&format!("{BOLD}Seats for {date}{RESET}\n"));

    for location in Location::ALL {
        let layout = location.layout();
        out.push_str(&format!("\n{BOLD}{location}{RESET}\n"));

        for bay in 1..=layout.bays {
            for row in 1..=layout.rows {
                let label = if row == 1 {
                    format!("  bay {bay} ")
                } else {
                    "        ".to_string()
                };
                out.push_str(&label);

                for seat in layout.row_seats(row) {
                    let key = SeatKey::new(date, location.code(), &bay, &seat);
                    let cell = pad_left(&seat.to_string(), 3);
                    let st = status(&key);
                    out.push_str(&paint(&cell, &st));

                    match st {
                        SeatStatus::Occupied(r) => {
                            taken.push(format!("{} {}", key.seat_id(), r.holder()))
                        }
                        SeatStatus::Pending(r, s) => {
                            taken.push(format!("{} {} [{s}]", key.seat_id(), r.holder()))
                        }
                        _ => {}
                    }
                }
                out.push('\n');
            }
        }
    }

    out.push_str(&format!(
        "\n{GREEN}free{RESET}  {RED}taken{RESET}  {YELLOW}yours (pending){RESET}  {BOLD}[selected]{RESET}\n"
    ));

    if !taken.is_empty() {
        out.push('\n');
        for t in taken {
            out.push_str(&format!("{GREY}  • {t}{RESET}\n"));
        }
    }

    out
}

fn paint(cell: &str, status: &SeatStatus) -> String {
    match status {
        SeatStatus::Available => format!("{GREEN}{cell}{RESET}"),
        SeatStatus::Selected | SeatStatus::Submitting => format!("{BOLD}[{}]{RESET}", cell.trim()),
        SeatStatus::Occupied(_) => format!("{RED}{cell}{RESET}"),
        SeatStatus::Pending(..) => format!("{YELLOW}{cell}{RESET}"),
    }
}
