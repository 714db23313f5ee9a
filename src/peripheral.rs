//! Physical outputs: microcontroller command line and receipt printer.
//!
//! Both channels are best-effort. A failed open or write is logged and
//! the session carries on exactly as if it had worked; the printer falls
//! back to writing the fortune on a console sink.
//!
//! Structure:
//! - Trait seams: `Peripherals` (what the driving loop calls) and
//!   `CommandLink` (one byte out, one optional line back)
//! - Effect functions: serial line setup via termios, printer writes
//! - `PhysicalIo`: the real implementation wiring both together

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::platform::{detect_serial_port, SerialDiscovery};
use crate::types::{Command, PrinterConfig, SerialConfig, SerialPortChoice};

/// Longest acknowledgment line we keep from the microcontroller.
const MAX_ACK_LEN: usize = 256;

// ============================================================================
// TRAIT SEAMS
// ============================================================================

/// Outputs the driving loop forwards to. Infallible by contract.
pub trait Peripherals {
    /// Cue the microcontroller.
    fn send_command(&mut self, command: Command);
    /// Put the fortune on paper.
    fn print(&mut self, text: &str);
}

/// A byte-oriented channel to the microcontroller.
pub trait CommandLink {
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
    /// Read one newline-terminated response, or None on timeout.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("could not open serial device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported baud rate {0}")]
    UnsupportedBaud(u32),

    #[error("could not configure serial line: {0}")]
    Configure(#[from] io::Error),

    #[error("serial devices are not supported on this platform")]
    Unsupported,
}

#[derive(Debug, Error)]
#[error("could not write to printer {path}: {source}")]
pub struct PrintError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

// ============================================================================
// SERIAL LINE
// ============================================================================

/// Raw 8N1 serial line to the microcontroller.
#[derive(Debug)]
pub struct SerialLink {
    file: File,
    path: PathBuf,
}

impl SerialLink {
    /// Open and configure a serial device.
    ///
    /// Reads time out after `read_timeout` (rounded to tenths of a second,
    /// at most 25.5s).
    #[cfg(unix)]
    pub fn open(path: &Path, baud: u32, read_timeout: Duration) -> Result<Self, SerialError> {
        use std::os::unix::fs::OpenOptionsExt;
        use std::os::unix::io::AsRawFd;

        let speed = baud_constant(baud).ok_or(SerialError::UnsupportedBaud(baud))?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| SerialError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        // Non-blocking only for the open itself: a port without carrier
        // would otherwise hang there before CLOCAL is set.
        configure_line(file.as_raw_fd(), speed, read_timeout)?;
        clear_nonblocking(file.as_raw_fd())?;

        Ok(SerialLink {
            file,
            path: path.to_path_buf(),
        })
    }

    #[cfg(not(unix))]
    pub fn open(_path: &Path, _baud: u32, _read_timeout: Duration) -> Result<Self, SerialError> {
        Err(SerialError::Unsupported)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommandLink for SerialLink {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.file.write_all(&[byte])?;
        self.file.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        read_ack_line(&mut self.file)
    }
}

/// Read bytes until a newline, a timeout (zero-length read), or the length cap.
///
/// Returns the trimmed line, or None if nothing but whitespace arrived.
fn read_ack_line(reader: &mut impl Read) -> io::Result<Option<String>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    while line.len() < MAX_ACK_LEN {
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => line.push(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    let text = String::from_utf8_lossy(&line).trim().to_string();
    Ok((!text.is_empty()).then_some(text))
}

/// Map a numeric baud rate to its termios constant.
#[cfg(unix)]
fn baud_constant(baud: u32) -> Option<libc::speed_t> {
    match baud {
        1200 => Some(libc::B1200),
        2400 => Some(libc::B2400),
        4800 => Some(libc::B4800),
        9600 => Some(libc::B9600),
        19200 => Some(libc::B19200),
        38400 => Some(libc::B38400),
        57600 => Some(libc::B57600),
        115200 => Some(libc::B115200),
        _ => None,
    }
}

/// Raw mode, 8N1, no modem control, VMIN=0 / VTIME=timeout.
#[cfg(unix)]
fn configure_line(
    fd: std::os::unix::io::RawFd,
    speed: libc::speed_t,
    read_timeout: Duration,
) -> io::Result<()> {
    let mut tty: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut tty) } != 0 {
        return Err(io::Error::last_os_error());
    }

    unsafe { libc::cfmakeraw(&mut tty) };
    tty.c_cflag |= libc::CLOCAL | libc::CREAD;
    tty.c_cflag &= !libc::CSTOPB;
    tty.c_cc[libc::VMIN] = 0;
    tty.c_cc[libc::VTIME] = (read_timeout.as_millis() / 100).clamp(1, 255) as libc::cc_t;

    let status = unsafe {
        libc::cfsetispeed(&mut tty, speed) | libc::cfsetospeed(&mut tty, speed)
    };
    if status != 0 {
        return Err(io::Error::last_os_error());
    }

    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tty) } != 0 {
        return Err(io::Error::last_os_error());
    }

    // Drop anything the board printed while resetting.
    unsafe { libc::tcflush(fd, libc::TCIOFLUSH) };
    Ok(())
}

/// Switch a descriptor back to blocking I/O so VTIME governs reads.
#[cfg(unix)]
fn clear_nonblocking(fd: std::os::unix::io::RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Resolve the configured port and open it. Failures are logged, not raised.
pub fn connect_serial(config: &SerialConfig) -> Option<SerialLink> {
    let path = match &config.port {
        SerialPortChoice::Disabled => {
            tracing::info!("serial output disabled");
            return None;
        }
        SerialPortChoice::Path(path) => path.clone(),
        SerialPortChoice::Auto => match detect_serial_port() {
            Ok(SerialDiscovery::Found { port, .. }) => {
                tracing::info!(port = %port.display(), "auto-detected serial device");
                port
            }
            Ok(missing @ SerialDiscovery::NotFound { .. }) => {
                tracing::warn!("{missing}; commands will only be logged");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "serial discovery failed; commands will only be logged");
                return None;
            }
        },
    };

    match SerialLink::open(&path, config.baud, config.ack_timeout) {
        Ok(link) => {
            tracing::info!(port = %path.display(), baud = config.baud, "serial link open");
            thread::sleep(config.settle);
            Some(link)
        }
        Err(e) => {
            tracing::warn!(error = %e, "serial link unavailable; commands will only be logged");
            None
        }
    }
}

// ============================================================================
// PRINTER
// ============================================================================

/// Bytes sent to the printer: ASCII only, plus optional paper feed.
///
/// Characters outside ASCII become '?'.
pub fn printer_bytes(text: &str, feed_lines: usize) -> Vec<u8> {
    text.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .chain(std::iter::repeat_n(b'\n', feed_lines))
        .collect()
}

/// Write a fortune to an existing printer device. Never creates the path.
pub fn write_to_printer(device: &Path, text: &str, feed_lines: usize) -> Result<(), PrintError> {
    let wrap = |source| PrintError {
        path: device.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new().write(true).open(device).map_err(wrap)?;
    file.write_all(&printer_bytes(text, feed_lines)).map_err(wrap)?;
    file.flush().map_err(wrap)
}

// ============================================================================
// PHYSICAL IO
// ============================================================================

/// The kiosk's real peripherals.
pub struct PhysicalIo {
    link: Option<Box<dyn CommandLink>>,
    printer: PrinterConfig,
    /// Where fortunes go when the printer cannot take them.
    console: Box<dyn Write>,
}

impl PhysicalIo {
    pub fn new(link: Option<Box<dyn CommandLink>>, printer: PrinterConfig) -> Self {
        PhysicalIo {
            link,
            printer,
            console: Box::new(io::stderr()),
        }
    }

    /// Open the serial line per `serial` and pair it with the printer.
    pub fn connect(serial: &SerialConfig, printer: PrinterConfig) -> Self {
        let link = connect_serial(serial).map(|link| Box::new(link) as Box<dyn CommandLink>);
        PhysicalIo::new(link, printer)
    }

    /// Replace the fallback console sink.
    pub fn with_console(mut self, console: Box<dyn Write>) -> Self {
        self.console = console;
        self
    }

    pub fn has_serial(&self) -> bool {
        self.link.is_some()
    }
}

impl Peripherals for PhysicalIo {
    fn send_command(&mut self, command: Command) {
        let Some(byte) = command.wire_byte() else {
            tracing::trace!(%command, "no-op command not transmitted");
            return;
        };

        let Some(link) = self.link.as_mut() else {
            tracing::info!(%command, "command (no serial link)");
            return;
        };

        if let Err(e) = link.write_byte(byte) {
            tracing::warn!(%command, error = %e, "serial write failed");
            return;
        }
        tracing::info!(%command, "command sent");

        match link.read_line() {
            Ok(Some(response)) => tracing::info!(%response, "microcontroller replied"),
            Ok(None) => tracing::debug!("no acknowledgment"),
            Err(e) => tracing::warn!(error = %e, "serial read failed"),
        }
    }

    fn print(&mut self, text: &str) {
        match write_to_printer(&self.printer.device, text, self.printer.feed_lines) {
            Ok(()) => tracing::info!(bytes = text.len(), "fortune printed"),
            Err(e) => {
                tracing::warn!(error = %e, "printer unavailable; fortune diverted to console");
                let _ = writeln!(self.console, "Would print:\n{text}\n====");
                let _ = self.console.flush();
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
