//! The view state machine for the light panel
//!
//! Everything here is pure: the panel loop owns a [`ViewState`] and folds
//! network outcomes into it, then derives what to display from the result.
use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::debug;

use crate::status::SystemStatus;

/// The two ways talking to the light service can fail.
///
/// All transport failures, non-2xx responses and malformed payloads collapse
/// into the same kind; the panel shows one fixed message per kind.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// A status read failed.
    #[error("Unable to contact the light service")]
    Connectivity,

    /// A toggle request failed.
    #[error("Unable to change the light state")]
    Action,
}

/// The display state of the panel banner
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DisplayState {
    /// The last request failed and no successful read has cleared it.
    Error,

    /// The light is on.
    On,

    /// The light is off.
    Off,
}

impl std::fmt::Display for DisplayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayState::Error => write!(f, "Error"),
            DisplayState::On => write!(f, "Light On"),
            DisplayState::Off => write!(f, "Light Off"),
        }
    }
}

/// The state behind everything the panel renders.
///
/// Mutated only by the fold operations below; the panel loop is the sole
/// owner, so no two requests can race on it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ViewState {
    /// Last known power state.
    pub light_on: bool,

    /// Last known brightness reading in lux; 0 is not displayed.
    pub brightness: u32,

    /// Time of the last successful status read.
    pub last_updated: Option<DateTime<Local>>,

    /// Is a read or write request in flight?
    pub is_loading: bool,

    /// The last error, cleared by the next successful read.
    pub error: Option<ErrorKind>,
}

impl ViewState {
    /// The state at panel start, before the first read has settled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            light_on: false,
            brightness: 0,
            last_updated: None,
            is_loading: true,
            error: None,
        }
    }

    /// A read or write request was just issued.
    pub fn request_started(&mut self) {
        self.is_loading = true;
    }

    /// A status read succeeded.
    pub fn status_received(&mut self, status: SystemStatus, now: DateTime<Local>) {
        debug!("status received: {status:?}");
        self.light_on = status.light_on;
        self.brightness = status.brightness;
        self.last_updated = Some(now);
        self.is_loading = false;
        self.error = None;
    }

    /// A status read failed; prior readings are retained.
    pub fn status_failed(&mut self) {
        self.is_loading = false;
        self.error = Some(ErrorKind::Connectivity);
    }

    /// A toggle request failed.
    pub fn toggle_failed(&mut self) {
        self.is_loading = false;
        self.error = Some(ErrorKind::Action);
    }

    /// Which banner to show. An uncleared error wins over the power state.
    #[must_use]
    pub const fn display_state(&self) -> DisplayState {
        match (self.error, self.light_on) {
            (Some(_), _) => DisplayState::Error,
            (None, true) => DisplayState::On,
            (None, false) => DisplayState::Off,
        }
    }

    /// The label for the toggle button.
    #[must_use]
    pub const fn button_label(&self) -> &'static str {
        if self.is_loading {
            "Processing..."
        } else if self.light_on {
            "Turn light off"
        } else {
            "Turn light on"
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}
