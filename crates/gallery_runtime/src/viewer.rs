//! Lightbox zoom/pan state and caption formatting.

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Zoom factor, pan offset, and active drag origin of the lightbox image.
pub struct ViewerTransform {
    /// Current zoom factor in `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
    /// Horizontal pan in pixels.
    pub pan_x: f64,
    /// Vertical pan in pixels.
    pub pan_y: f64,
    drag_origin: Option<(f64, f64)>,
}

impl Default for ViewerTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            drag_origin: None,
        }
    }
}

impl ViewerTransform {
    /// Applies one wheel step: scrolling down zooms out by 10%, up zooms in by 10%.
    pub fn wheel(&mut self, delta_y: f64) {
        let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if self.zoom <= 1.0 {
            self.pan_x = 0.0;
            self.pan_y = 0.0;
            self.drag_origin = None;
        }
    }

    /// Click behavior: 1x becomes 2x, any other zoom returns to 1x with no pan.
    pub fn toggle_zoom(&mut self) {
        if (self.zoom - 1.0).abs() < f64::EPSILON {
            self.zoom = 2.0;
        } else {
            *self = Self::default();
        }
    }

    /// Starts a pan drag at the pointer position; ignored unless zoomed in.
    pub fn begin_drag(&mut self, client_x: f64, client_y: f64) {
        if self.zoom > 1.0 {
            self.drag_origin = Some((client_x - self.pan_x, client_y - self.pan_y));
        }
    }

    /// Moves the pan with the pointer while a drag is active.
    pub fn drag_to(&mut self, client_x: f64, client_y: f64) {
        if let Some((origin_x, origin_y)) = self.drag_origin {
            if self.zoom > 1.0 {
                self.pan_x = client_x - origin_x;
                self.pan_y = client_y - origin_y;
            }
        }
    }

    /// Ends the active drag.
    pub fn end_drag(&mut self) {
        self.drag_origin = None;
    }

    /// Whether a pan drag is active.
    pub const fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// CSS transform for the image element.
    pub fn css_transform(&self) -> String {
        format!(
            "scale({}) translate({}px, {}px)",
            self.zoom, self.pan_x, self.pan_y
        )
    }

    /// Zoom percentage label, shown only when not at 1x.
    pub fn zoom_label(&self) -> Option<String> {
        ((self.zoom - 1.0).abs() >= f64::EPSILON)
            .then(|| format!("{}%", (self.zoom * 100.0).round() as i64))
    }
}

/// Human-readable size using 1024-based units and at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return String::new();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

/// Position caption such as `"3 of 120"`.
pub fn position_label(index: usize, len: usize) -> String {
    format!("{} of {}", index + 1, len)
}
