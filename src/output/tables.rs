use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};

use super::format::humanize_duration;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label).fg(TableColor::Cyan)
}

pub fn count_cell(value: usize) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// Success share of finished runs; higher is better.
pub fn color_coded_success_cell(percent: usize) -> Cell {
    let cell = Cell::new(format!("{percent}%")).set_alignment(CellAlignment::Right);
    if percent > 80 {
        cell.fg(TableColor::Green)
    } else if percent >= 50 {
        cell.fg(TableColor::Yellow)
    } else {
        cell.fg(TableColor::Red)
    }
}

/// Failure or cancellation share of finished runs; lower is better.
pub fn color_coded_failure_cell(percent: usize) -> Cell {
    let cell = Cell::new(format!("{percent}%")).set_alignment(CellAlignment::Right);
    if percent >= 50 {
        cell.fg(TableColor::Red)
    } else if percent >= 25 {
        cell.fg(TableColor::Yellow)
    } else {
        cell.fg(TableColor::Green)
    }
}

pub fn color_coded_duration_cell(duration_ms: u64) -> Cell {
    let minutes = duration_ms / 60_000;
    let cell = Cell::new(humanize_duration(duration_ms)).set_alignment(CellAlignment::Right);
    if minutes < 10 {
        cell.fg(TableColor::Green)
    } else if minutes < 15 {
        cell.fg(TableColor::Yellow)
    } else {
        cell.fg(TableColor::Red)
    }
}
