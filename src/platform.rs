//! Serial device discovery for the kiosk's microcontroller.
//!
//! Encodes assumptions about how USB-serial bridges show up under /dev as
//! named constants. Provides detection with explicit state representation.
//!
//! Structure:
//! - Constants: known device name prefixes (documented invariants)
//! - Types: possible detection states (sum type)
//! - Pure functions: name matching
//! - Effect functions: directory listing

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// ============================================================================
// CONSTANTS (Documented Invariants)
// ============================================================================

/// Directory holding device nodes.
pub const DEV_DIR: &str = "/dev";

/// Device name prefixes used by common USB-serial bridges.
///
/// Linux exposes CH340/CP210x/FTDI adapters as ttyUSB* and native USB
/// boards (ATmega32U4, SAMD) as ttyACM*. macOS uses the cu.* call-out
/// devices. Ordered from most to least specific.
pub const SERIAL_DEVICE_PREFIXES: [&str; 5] = [
    "ttyACM",
    "ttyUSB",
    "cu.usbmodem",
    "cu.usbserial",
    "cu.usb",
];

// ============================================================================
// TYPES (State Representation)
// ============================================================================

/// What serial discovery found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialDiscovery {
    /// At least one candidate; `port` is the one to use.
    Found {
        port: PathBuf,
        /// All candidates, sorted.
        candidates: Vec<PathBuf>,
    },

    /// No device under the searched directory looks like a serial bridge.
    NotFound {
        /// Directory we searched.
        searched: PathBuf,
    },
}

// ============================================================================
// PURE FUNCTIONS (Name Matching)
// ============================================================================

/// Does this device file name look like a USB-serial bridge?
pub fn is_serial_candidate(name: &str) -> bool {
    SERIAL_DEVICE_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

// ============================================================================
// EFFECT FUNCTIONS (Detection)
// ============================================================================

/// List candidate serial devices in `dev_dir`, sorted by path.
pub fn list_serial_candidates(dev_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();

    for entry in fs::read_dir(dev_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_str().is_some_and(is_serial_candidate) {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    Ok(candidates)
}

/// Detect the microcontroller port in the system device directory.
pub fn detect_serial_port() -> io::Result<SerialDiscovery> {
    detect_serial_port_in(Path::new(DEV_DIR))
}

/// Detect the microcontroller port in a given directory.
///
/// Separated for testability — can inject a fake device directory.
pub fn detect_serial_port_in(dev_dir: &Path) -> io::Result<SerialDiscovery> {
    let candidates = list_serial_candidates(dev_dir)?;

    match candidates.first() {
        Some(port) => Ok(SerialDiscovery::Found {
            port: port.clone(),
            candidates,
        }),
        None => Ok(SerialDiscovery::NotFound {
            searched: dev_dir.to_path_buf(),
        }),
    }
}

// ============================================================================
// DISPLAY (User-Friendly Messages)
// ============================================================================

impl std::fmt::Display for SerialDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerialDiscovery::Found { port, candidates } => {
                write!(
                    f,
                    "serial device {} ({} candidate{})",
                    port.display(),
                    candidates.len(),
                    if candidates.len() == 1 { "" } else { "s" }
                )
            }
            SerialDiscovery::NotFound { searched } => {
                write!(f, "no serial device found in {}", searched.display())
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
