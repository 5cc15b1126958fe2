//! Per-tile image loading state with thumbnail-to-full fallback.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which source a tile is currently showing.
pub enum CardSource {
    /// Derived thumbnail URL.
    Thumbnail,
    /// Full display URL.
    Display,
    /// Both sources failed; the error placeholder is shown.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Loading/error flags for one grid tile.
pub struct CardImageState {
    /// Current source.
    pub source: CardSource,
    /// `true` until the current source finished loading or failed for good.
    pub loading: bool,
}

impl CardImageState {
    /// Initial state: start on the thumbnail when one exists.
    pub const fn new(has_thumbnail: bool) -> Self {
        Self {
            source: if has_thumbnail {
                CardSource::Thumbnail
            } else {
                CardSource::Display
            },
            loading: true,
        }
    }

    /// Image `load` event.
    pub fn on_load(&mut self) {
        self.loading = false;
    }

    /// Image `error` event: thumbnail falls back to the display URL, display URL fails for good.
    pub fn on_error(&mut self) {
        match self.source {
            CardSource::Thumbnail => {
                self.source = CardSource::Display;
                self.loading = true;
            }
            CardSource::Display | CardSource::Failed => {
                self.source = CardSource::Failed;
                self.loading = false;
            }
        }
    }

    /// New URLs were minted for the tile: start over from the thumbnail, or the display URL when
    /// there is no thumbnail.
    pub fn restart(&mut self, has_thumbnail: bool) {
        *self = Self::new(has_thumbnail);
    }

    /// URL to put in `src`, or `None` once both sources failed.
    pub fn current_url<'a>(&self, display_url: &'a str, thumb_url: Option<&'a str>) -> Option<&'a str> {
        match self.source {
            CardSource::Thumbnail => Some(thumb_url.unwrap_or(display_url)),
            CardSource::Display => Some(display_url),
            CardSource::Failed => None,
        }
    }
}

/// Returns `true` for keys that activate a focused tile.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Spacebar")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn thumbnail_error_falls_back_to_display_then_fails() {
        let mut state = CardImageState::new(true);
        assert_eq!(
            state.current_url("https://x/full.jpg", Some("https://x/thumb.jpg")),
            Some("https://x/thumb.jpg")
        );

        state.on_error();
        assert_eq!(state.source, CardSource::Display);
        assert!(state.loading);
        assert_eq!(
            state.current_url("https://x/full.jpg", Some("https://x/thumb.jpg")),
            Some("https://x/full.jpg")
        );

        state.on_error();
        assert_eq!(state.source, CardSource::Failed);
        assert!(!state.loading);
        assert_eq!(state.current_url("https://x/full.jpg", None), None);
    }

    #[test]
    fn no_thumbnail_starts_on_display_url() {
        let mut state = CardImageState::new(false);
        assert_eq!(state.source, CardSource::Display);
        state.on_load();
        assert!(!state.loading);
    }

    #[test]
    fn refreshed_urls_restart_a_failed_tile() {
        let mut state = CardImageState::new(true);
        state.on_error();
        state.on_error();
        assert_eq!(state.current_url("https://x/full.jpg?sig=old", None), None);

        state.restart(true);
        assert_eq!(state, CardImageState::new(true));
        assert_eq!(
            state.current_url("https://x/full.jpg?sig=new", Some("https://x/thumb.jpg?sig=new")),
            Some("https://x/thumb.jpg?sig=new")
        );

        state.on_error();
        state.restart(false);
        assert_eq!(state.source, CardSource::Display);
        assert!(state.loading);
    }

    #[test]
    fn enter_and_space_activate() {
        assert!(is_activation_key("Enter"));
        assert!(is_activation_key(" "));
        assert!(!is_activation_key("Tab"));
    }
}
