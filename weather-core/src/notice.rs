use std::fmt::{self, Debug};

use crate::model::Coordinates;

/// User-facing message raised by the location controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// No position source exists; location weather never loads.
    GeolocationUnavailable,
    /// The position could not be obtained, so the fallback coordinates are shown.
    LocationFallback(Coordinates),
}

impl Notice {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Notice::GeolocationUnavailable)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::GeolocationUnavailable => f.write_str("Geolocation not available"),
            Notice::LocationFallback(coordinates) => write!(
                f,
                "Location access is disabled. Allow this app to access your location \
                 to see real-time weather where you are; showing the default location \
                 ({coordinates}) meanwhile."
            ),
        }
    }
}

/// Sink for [`Notice`]s, implemented by the UI.
pub trait Notifier: Send + Sync + Debug {
    fn notify(&self, notice: Notice);
}
