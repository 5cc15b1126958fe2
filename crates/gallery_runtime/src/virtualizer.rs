//! Row-based viewport virtualization and grid keyboard movement.

use std::ops::Range;

/// Row height used until real measurements exist.
pub const DEFAULT_ROW_HEIGHT_PX: f64 = 280.0;
/// Rows rendered beyond each viewport edge.
pub const DEFAULT_OVERSCAN_ROWS: usize = 5;

/// Column count for a container `width` in CSS pixels.
pub fn column_count_for_width(width: f64) -> usize {
    if width < 640.0 {
        2
    } else if width < 768.0 {
        3
    } else if width < 1024.0 {
        4
    } else if width < 1280.0 {
        5
    } else {
        6
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Scroll container measurements reported by the grid view.
pub struct ViewportMetrics {
    /// Vertical scroll offset.
    pub scroll_top: f64,
    /// Visible height.
    pub viewport_height: f64,
    /// Visible width; drives the column count.
    pub viewport_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Rows intersecting the viewport, before overscan.
pub struct ViewportWindow {
    /// First row touching the viewport.
    pub first_visible_row: usize,
    /// Last row touching the viewport.
    pub last_visible_row: usize,
    /// Row height used for the computation.
    pub row_height_estimate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// One render row positioned inside the virtual scroll height.
pub struct VirtualRow {
    /// Row index.
    pub index: usize,
    /// Top offset in pixels.
    pub start: f64,
    /// Row height in pixels.
    pub size: f64,
}

impl VirtualRow {
    /// Collection indices rendered in this row.
    pub fn item_range(&self, column_count: usize, total_items: usize) -> Range<usize> {
        let start = (self.index * column_count).min(total_items);
        let end = (start + column_count).min(total_items);
        start..end
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Row virtualizer for a fixed column count.
pub struct Virtualizer {
    /// Items per row.
    pub column_count: usize,
    /// Estimated row height in pixels.
    pub row_height_estimate: f64,
    /// Extra rows rendered on each side of the viewport.
    pub overscan: usize,
}

impl Default for Virtualizer {
    fn default() -> Self {
        Self::for_width(0.0)
    }
}

impl Virtualizer {
    /// Virtualizer using the column breakpoint for `width` and default row sizing.
    pub fn for_width(width: f64) -> Self {
        Self {
            column_count: column_count_for_width(width),
            row_height_estimate: DEFAULT_ROW_HEIGHT_PX,
            overscan: DEFAULT_OVERSCAN_ROWS,
        }
    }

    /// Number of rows needed for `total_items`.
    pub fn row_count(&self, total_items: usize) -> usize {
        if self.column_count == 0 {
            return 0;
        }
        total_items.div_ceil(self.column_count)
    }

    /// Full virtual scroll height.
    pub fn total_height(&self, total_items: usize) -> f64 {
        self.row_count(total_items) as f64 * self.row_height_estimate
    }

    /// Top offset of `row`.
    pub fn row_start(&self, row: usize) -> f64 {
        row as f64 * self.row_height_estimate
    }

    /// Row containing collection index `item_index`.
    pub fn row_of(&self, item_index: usize) -> usize {
        item_index / self.column_count.max(1)
    }

    /// Rows touching the viewport, or `None` when there is nothing to render.
    pub fn window(&self, metrics: ViewportMetrics, total_items: usize) -> Option<ViewportWindow> {
        let rows = self.row_count(total_items);
        if rows == 0 || self.row_height_estimate <= 0.0 {
            return None;
        }
        let last_row = rows - 1;
        let scroll_top = metrics.scroll_top.max(0.0);
        let first = ((scroll_top / self.row_height_estimate).floor() as usize).min(last_row);
        let bottom = scroll_top + metrics.viewport_height.max(0.0);
        let last = ((bottom / self.row_height_estimate).ceil() as usize)
            .saturating_sub(1)
            .clamp(first, last_row);
        Some(ViewportWindow {
            first_visible_row: first,
            last_visible_row: last,
            row_height_estimate: self.row_height_estimate,
        })
    }

    /// Minimal contiguous rows covering the viewport plus overscan on each side.
    pub fn rows(&self, metrics: ViewportMetrics, total_items: usize) -> Vec<VirtualRow> {
        let Some(window) = self.window(metrics, total_items) else {
            return Vec::new();
        };
        let last_row = self.row_count(total_items) - 1;
        let start = window.first_visible_row.saturating_sub(self.overscan);
        let end = (window.last_visible_row + self.overscan).min(last_row);
        (start..=end)
            .map(|index| VirtualRow {
                index,
                start: self.row_start(index),
                size: self.row_height_estimate,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Arrow-key movement inside the grid.
pub enum GridKey {
    /// Previous item.
    Left,
    /// Next item.
    Right,
    /// Same column, previous row.
    Up,
    /// Same column, next row.
    Down,
}

impl GridKey {
    /// Maps a `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Moves grid focus by `key`, clamped to `[0, len - 1]` without wrapping.
pub fn move_grid_focus(
    current: Option<usize>,
    key: GridKey,
    column_count: usize,
    len: usize,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let Some(current) = current else {
        return Some(0);
    };
    let current = current.min(len - 1);
    let step = column_count.max(1);
    let next = match key {
        GridKey::Right => current.saturating_add(1),
        GridKey::Left => current.saturating_sub(1),
        GridKey::Down => current.saturating_add(step),
        GridKey::Up => current.saturating_sub(step),
    };
    Some(next.min(len - 1))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn metrics(scroll_top: f64, viewport_height: f64) -> ViewportMetrics {
        ViewportMetrics {
            scroll_top,
            viewport_height,
            viewport_width: 1400.0,
        }
    }

    #[test]
    fn column_breakpoints_follow_container_width() {
        let cases = [
            (320.0, 2),
            (639.0, 2),
            (640.0, 3),
            (767.0, 3),
            (768.0, 4),
            (1023.0, 4),
            (1024.0, 5),
            (1279.0, 5),
            (1280.0, 6),
            (2560.0, 6),
        ];
        for (width, expected) in cases {
            assert_eq!(column_count_for_width(width), expected, "width {width}");
        }
    }

    #[test]
    fn rows_stay_inside_row_bounds_for_any_scroll() {
        let virtualizer = Virtualizer::for_width(1400.0);
        for total in [1_usize, 5, 6, 7, 61, 600] {
            let row_count = virtualizer.row_count(total);
            for scroll in [0.0, 140.0, 2_800.0, 1.0e7] {
                let rows = virtualizer.rows(metrics(scroll, 900.0), total);
                assert!(!rows.is_empty());
                for pair in rows.windows(2) {
                    assert_eq!(pair[1].index, pair[0].index + 1);
                }
                assert!(rows.iter().all(|row| row.index < row_count));
            }
        }
        assert!(virtualizer.rows(metrics(0.0, 900.0), 0).is_empty());
    }

    #[test]
    fn window_covers_viewport_and_overscan() {
        let virtualizer = Virtualizer::for_width(1400.0);
        let total = 600;
        let window = virtualizer
            .window(metrics(2_800.0, 900.0), total)
            .expect("window");
        assert_eq!(window.first_visible_row, 10);
        assert_eq!(window.last_visible_row, 13);

        let rows = virtualizer.rows(metrics(2_800.0, 900.0), total);
        assert_eq!(rows.first().map(|r| r.index), Some(5));
        assert_eq!(rows.last().map(|r| r.index), Some(18));
        assert_eq!(rows[0].start, 5.0 * DEFAULT_ROW_HEIGHT_PX);
        assert_eq!(virtualizer.total_height(total), 100.0 * DEFAULT_ROW_HEIGHT_PX);
    }

    #[test]
    fn row_item_ranges_follow_column_count() {
        let virtualizer = Virtualizer::for_width(700.0);
        assert_eq!(virtualizer.column_count, 3);
        let rows = virtualizer.rows(metrics(0.0, 300.0), 7);
        let ranges: Vec<_> = rows
            .iter()
            .map(|row| row.item_range(virtualizer.column_count, 7))
            .collect();
        assert_eq!(ranges, vec![0..3, 3..6, 6..7]);
        assert_eq!(virtualizer.row_of(6), 2);
    }

    #[test]
    fn grid_focus_clamps_without_wrapping() {
        assert_eq!(move_grid_focus(None, GridKey::Right, 4, 10), Some(0));
        assert_eq!(move_grid_focus(Some(0), GridKey::Left, 4, 10), Some(0));
        assert_eq!(move_grid_focus(Some(0), GridKey::Up, 4, 10), Some(0));
        assert_eq!(move_grid_focus(Some(1), GridKey::Down, 4, 10), Some(5));
        assert_eq!(move_grid_focus(Some(8), GridKey::Down, 4, 10), Some(9));
        assert_eq!(move_grid_focus(Some(9), GridKey::Right, 4, 10), Some(9));
        assert_eq!(move_grid_focus(Some(6), GridKey::Up, 4, 10), Some(2));
        assert_eq!(move_grid_focus(Some(3), GridKey::Left, 4, 0), None);
        assert_eq!(GridKey::from_key("ArrowDown"), Some(GridKey::Down));
        assert_eq!(GridKey::from_key("Enter"), None);
    }
}
