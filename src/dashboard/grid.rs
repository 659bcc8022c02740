use crate::dashboard::layout::PlacedWidget;
use std::collections::BTreeSet;
use std::ops::Range;

/// Fixed column count of the dashboard grid. Rows are unbounded.
pub const GRID_COLUMNS: u32 = 12;

/// A single grid cell. Ordered row-major so sets iterate top to bottom, left
/// to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { row, col }
    }
}

/// Whether a `w`×`h` rectangle with its origin in column `x` fits horizontally.
pub(crate) fn fits(x: u32, w: u32, h: u32) -> bool {
    w >= 1
        && h >= 1
        && x.checked_add(w)
            .map(|end| end <= GRID_COLUMNS)
            .unwrap_or(false)
}

/// Whether rows `y..y + h` are addressable. The origin row must also fit an
/// `i32`, the coordinate type of move commands.
pub(crate) fn rows_fit(y: u32, h: u32) -> bool {
    i32::try_from(y).is_ok() && y.checked_add(h).is_some()
}

/// `x ≥ 0 ∧ y ≥ 0 ∧ x + w ≤ 12` with non-zero spans. Rows are not bounded
/// beyond what the coordinate type can address.
pub fn bounds_check(x: i32, y: i32, w: u32, h: u32) -> bool {
    x >= 0 && y >= 0 && fits(x as u32, w, h) && rows_fit(y as u32, h)
}

/// Number of rows covered by the layout (one past the lowest occupied row).
pub fn rows_used(layout: &[PlacedWidget]) -> u32 {
    layout
        .iter()
        .map(|widget| widget.y.saturating_add(widget.h))
        .max()
        .unwrap_or(0)
}

fn spans_overlap(a_start: u32, a_len: u32, b_start: u32, b_len: u32) -> bool {
    let (a_start, a_len, b_start, b_len) = (
        u64::from(a_start),
        u64::from(a_len),
        u64::from(b_start),
        u64::from(b_len),
    );
    a_start < b_start + b_len && b_start < a_start + a_len
}

fn overlaps(widget: &PlacedWidget, x: u32, y: u32, w: u32, h: u32) -> bool {
    spans_overlap(widget.x, widget.w, x, w) && spans_overlap(widget.y, widget.h, y, h)
}

fn region_is_free(layout: &[PlacedWidget], x: u32, y: u32, w: u32, h: u32) -> bool {
    !layout.iter().any(|widget| overlaps(widget, x, y, w, h))
}

/// Cells inside `rows` covered by at least one widget. Columns past the grid
/// edge are not reported.
pub fn occupancy(layout: &[PlacedWidget], rows: Range<u32>) -> BTreeSet<Cell> {
    let mut occupied = BTreeSet::new();
    for widget in layout {
        let row_start = widget.y.max(rows.start);
        let row_end = widget.y.saturating_add(widget.h).min(rows.end);
        let col_end = widget.x.saturating_add(widget.w).min(GRID_COLUMNS);
        for row in row_start..row_end {
            for col in widget.x..col_end {
                occupied.insert(Cell::new(col, row));
            }
        }
    }
    occupied
}

/// First origin, scanning rows top to bottom and columns left to right, where
/// a `w`×`h` widget fits without overlapping anything. Returns `None` when the
/// span cannot fit on the grid or no addressable row is left.
///
/// Only row 0 and the rows directly below a widget can be the topmost free
/// origin, so those are the only rows tried.
pub fn first_free_origin(layout: &[PlacedWidget], w: u32, h: u32) -> Option<(u32, u32)> {
    if !fits(0, w, h) {
        return None;
    }
    let mut candidates: Vec<u32> = layout
        .iter()
        .filter_map(|widget| widget.y.checked_add(widget.h))
        .collect();
    candidates.push(0);
    candidates.sort_unstable();
    candidates.dedup();
    for y in candidates {
        if !rows_fit(y, h) {
            break;
        }
        for x in 0..=(GRID_COLUMNS - w) {
            if region_is_free(layout, x, y, w, h) {
                return Some((x, y));
            }
        }
    }
    None
}

/// Unoccupied cells inside `rows`, used as drop targets while arranging
/// widgets. Callers pass the rows they display.
pub fn free_cells(layout: &[PlacedWidget], rows: Range<u32>) -> Vec<Cell> {
    let occupied = occupancy(layout, rows.clone());
    rows.flat_map(|row| (0..GRID_COLUMNS).map(move |col| Cell::new(col, row)))
        .filter(|cell| !occupied.contains(cell))
        .collect()
}

/// Relocate `widget_id` to `(x, y)`. Overlaps with other widgets are left as
/// they are; the last move wins. Returns `None` when the widget is missing or
/// the target is out of bounds.
pub fn resolve_move(
    layout: &[PlacedWidget],
    widget_id: &str,
    x: i32,
    y: i32,
) -> Option<Vec<PlacedWidget>> {
    let widget = layout.iter().find(|w| w.id == widget_id)?;
    if !bounds_check(x, y, widget.w, widget.h) {
        return None;
    }
    Some(
        layout
            .iter()
            .map(|w| {
                if w.id == widget_id {
                    PlacedWidget {
                        x: x as u32,
                        y: y as u32,
                        ..w.clone()
                    }
                } else {
                    w.clone()
                }
            })
            .collect(),
    )
}

/// Change the span of `widget_id` keeping its origin. Same overlap policy as
/// [`resolve_move`].
pub fn resolve_resize(
    layout: &[PlacedWidget],
    widget_id: &str,
    w: u32,
    h: u32,
) -> Option<Vec<PlacedWidget>> {
    let widget = layout.iter().find(|widget| widget.id == widget_id)?;
    if !fits(widget.x, w, h) || !rows_fit(widget.y, h) {
        return None;
    }
    Some(
        layout
            .iter()
            .map(|widget| {
                if widget.id == widget_id {
                    PlacedWidget {
                        w,
                        h,
                        ..widget.clone()
                    }
                } else {
                    widget.clone()
                }
            })
            .collect(),
    )
}
