//! Printer status as reported by the device.
//!
//! The device publishes one JSON object per line on its status pipe:
//!
//! ```text
//! {"PrinterStatus": {"State": "Home", "UISubState": "NoUISubState", "Temperature": 24.5}}
//! ```
//!
//! Only the state and substate are read here; everything else is ignored.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Primary device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrinterState {
    Initializing,
    Homing,
    Home,
    Printing,
    Paused,
    DoorOpen,
    Error,
}

impl PrinterState {
    /// Returns the label the device uses for this state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Homing => "Homing",
            Self::Home => "Home",
            Self::Printing => "Printing",
            Self::Paused => "Paused",
            Self::DoorOpen => "DoorOpen",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for PrinterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary qualifier reported alongside the primary state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrinterSubstate {
    /// No qualifier.
    #[default]
    #[serde(rename = "NoUISubState")]
    Normal,
    Downloading,
    DownloadFailed,
    Loading,
    LoadFailed,
    Loaded,
}

impl PrinterSubstate {
    /// Returns the label the device uses for this substate.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NoUISubState",
            Self::Downloading => "Downloading",
            Self::DownloadFailed => "DownloadFailed",
            Self::Loading => "Loading",
            Self::LoadFailed => "LoadFailed",
            Self::Loaded => "Loaded",
        }
    }
}

impl fmt::Display for PrinterSubstate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(state, substate)` pair read from the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterStatus {
    #[serde(rename = "State")]
    pub state: PrinterState,
    #[serde(rename = "UISubState", default)]
    pub substate: PrinterSubstate,
}

impl PrinterStatus {
    #[must_use]
    pub const fn new(state: PrinterState, substate: PrinterSubstate) -> Self {
        Self { state, substate }
    }

    /// Parses one line from the device status pipe.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Parse`] if the line is not a status object or
    /// names a state/substate this client does not know.
    pub fn from_json_line(line: &str) -> Result<Self, StatusError> {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(rename = "PrinterStatus")]
            status: PrinterStatus,
        }

        serde_json::from_str::<Envelope>(line.trim())
            .map(|envelope| envelope.status)
            .map_err(|source| StatusError::Parse {
                line: line.trim().to_string(),
                source,
            })
    }
}

impl fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.state, self.substate)
    }
}

/// Errors reading printer status.
#[derive(Debug, Error)]
pub enum StatusError {
    /// A status line could not be decoded.
    #[error("invalid printer status line '{line}': {source}")]
    Parse {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// The status pipe could not be read.
    #[error("IO error reading printer status: {0}")]
    Io(#[from] std::io::Error),
}
