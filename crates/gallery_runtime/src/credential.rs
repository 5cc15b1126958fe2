//! Credential expiry state machine: `Active -> Expired -> Refreshing -> Active`.

use gallery_host::GalleryError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Usability of the storage credential behind the proxy.
pub enum CredentialState {
    /// Listing requests may be issued automatically.
    #[default]
    Active,
    /// A listing call was rejected with an auth failure.
    Expired {
        /// Cursor of the rejected fetch, re-issued after a successful refresh.
        pending_cursor: Option<String>,
        /// The auth failure reported by the listing call.
        listing_error: GalleryError,
        /// Failure of the last refresh attempt, kept apart from the listing error.
        refresh_error: Option<GalleryError>,
    },
    /// A refresh call is in flight.
    Refreshing {
        /// Cursor to re-issue once the refresh succeeds.
        pending_cursor: Option<String>,
        /// The auth failure that started the cycle.
        listing_error: GalleryError,
    },
}

impl CredentialState {
    /// Returns `true` while automatic listing fetches are allowed.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` while waiting for the user to refresh.
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }

    /// Returns `true` while a refresh call is in flight.
    pub const fn is_refreshing(&self) -> bool {
        matches!(self, Self::Refreshing { .. })
    }

    /// Cursor of the remembered fetch, when expired or refreshing.
    pub fn pending_cursor(&self) -> Option<&str> {
        match self {
            Self::Active => None,
            Self::Expired { pending_cursor, .. } | Self::Refreshing { pending_cursor, .. } => {
                pending_cursor.as_deref()
            }
        }
    }

    /// Last refresh failure, if the most recent refresh failed.
    pub fn refresh_error(&self) -> Option<&GalleryError> {
        match self {
            Self::Expired { refresh_error, .. } => refresh_error.as_ref(),
            _ => None,
        }
    }

    /// Records an auth failure for the fetch issued with `cursor`.
    ///
    /// A refresh already in flight keeps `Refreshing`; only the remembered cursor moves.
    pub fn expire(&mut self, cursor: Option<String>, listing_error: GalleryError) {
        if let Self::Refreshing { pending_cursor, .. } = self {
            *pending_cursor = cursor;
            return;
        }
        *self = Self::Expired {
            pending_cursor: cursor,
            listing_error,
            refresh_error: None,
        };
    }

    /// Moves `Expired -> Refreshing`. Returns `false` in any other state.
    pub fn begin_refresh(&mut self) -> bool {
        let Self::Expired {
            pending_cursor,
            listing_error,
            ..
        } = self
        else {
            return false;
        };
        *self = Self::Refreshing {
            pending_cursor: pending_cursor.take(),
            listing_error: listing_error.clone(),
        };
        true
    }

    /// Moves `Refreshing -> Active` and hands back the cursor to re-issue.
    ///
    /// Returns `None` when no refresh was in flight.
    pub fn refresh_succeeded(&mut self) -> Option<Option<String>> {
        let Self::Refreshing { pending_cursor, .. } = self else {
            return None;
        };
        let cursor = pending_cursor.take();
        *self = Self::Active;
        Some(cursor)
    }

    /// Moves `Refreshing -> Expired`, storing `error` as the refresh failure.
    pub fn refresh_failed(&mut self, error: GalleryError) -> bool {
        let Self::Refreshing {
            pending_cursor,
            listing_error,
        } = self
        else {
            return false;
        };
        *self = Self::Expired {
            pending_cursor: pending_cursor.take(),
            listing_error: listing_error.clone(),
            refresh_error: Some(error),
        };
        true
    }

    /// Points the remembered fetch back at the first page after a full reload.
    pub fn restart_pending_from_first_page(&mut self) {
        match self {
            Self::Active => {}
            Self::Expired { pending_cursor, .. } | Self::Refreshing { pending_cursor, .. } => {
                *pending_cursor = None;
            }
        }
    }

    /// Returns to `Active` after a user retry proved the credential usable again.
    pub fn restore(&mut self) {
        *self = Self::Active;
    }
}
