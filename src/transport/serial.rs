//! # Serial TTY Transport
//!
//! This module talks to the printer over a plain UART, typically the
//! Raspberry Pi's `/dev/serial0` or a USB-serial adapter.
//!
//! ## Wiring
//!
//! The printer only needs TX, RX and ground. There is no hardware flow
//! control, so the driver paces its own writes.
//!
//! ```text
//! host TX ──────► printer RX
//! host RX ◄────── printer TX   (status reads only)
//! GND     ─────── GND
//! ```
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so binary data passes through untouched:
//!
//! - **Baud rate**: fixed from configuration (19200 for most units)
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR, ICRNL
//! - **No software flow control**: IXON, IXOFF, IXANY cleared
//! - **No output processing**: OPOST cleared (no CR/LF translation)
//! - **8N1**: CS8, no parity
//! - **Non-canonical reads**: VMIN = 0, VTIME = read timeout in deciseconds
//!
//! XON/XOFF must stay off: 0x11 and 0x13 appear in bitmap data.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::Transport;
use crate::error::{Result, ThermalError};

/// Default serial device path
pub const DEFAULT_DEVICE: &str = "/dev/serial0";

/// Default baud rate
pub const DEFAULT_BAUD: u32 = 19200;

/// How long a status read waits before giving up
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// # Serial Printer Transport
///
/// ## Example
///
/// ```no_run
/// use thermald::transport::{SerialTransport, Transport};
///
/// let mut port = SerialTransport::open("/dev/serial0", 19200)?;
/// port.write_bytes(&[27, 64])?;
/// # Ok::<(), thermald::ThermalError>(())
/// ```
#[derive(Debug)]
pub struct SerialTransport {
    file: File,
    path: PathBuf,
}

impl SerialTransport {
    /// Open and configure a serial device.
    ///
    /// ## Errors
    ///
    /// - The device doesn't exist or permission is denied (dialout group)
    /// - The baud rate has no termios constant
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P, baud_rate: u32) -> Result<Self> {
        Self::open_with_timeout(device, baud_rate, DEFAULT_READ_TIMEOUT)
    }

    /// Open with an explicit timeout for status reads.
    pub fn open_with_timeout<P: AsRef<Path>>(
        device: P,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> Result<Self> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)
            .map_err(|e| {
                ThermalError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;

        configure_tty_raw(file.as_raw_fd(), baud_rate, read_timeout)?;
        tracing::debug!(device = %path.display(), baud_rate, "serial port configured");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Open the default device at the default baud rate.
    pub fn open_default() -> Result<Self> {
        Self::open(DEFAULT_DEVICE, DEFAULT_BAUD)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for SerialTransport {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .write_all(data)
            .and_then(|_| self.file.flush())
            .map_err(|e| ThermalError::Transport(format!("Write failed: {}", e)))
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        match self.file.read(&mut buf) {
            Ok(1) => Ok(buf[0]),
            Ok(_) => Err(ThermalError::Transport(
                "Timed out waiting for status byte".to_string(),
            )),
            Err(e) => Err(ThermalError::Transport(format!("Read failed: {}", e))),
        }
    }
}

/// Map a numeric baud rate to its termios speed constant.
pub fn baud_constant(baud_rate: u32) -> Option<libc::speed_t> {
    let speed = match baud_rate {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        _ => return None,
    };
    Some(speed)
}

/// VTIME value for a read timeout: deciseconds, clamped to 1..=255.
fn vtime(read_timeout: Duration) -> libc::cc_t {
    (read_timeout.as_millis() / 100).clamp(1, 255) as libc::cc_t
}

fn configure_tty_raw(fd: i32, baud_rate: u32, read_timeout: Duration) -> Result<()> {
    use std::mem::MaybeUninit;

    let speed = baud_constant(baud_rate).ok_or_else(|| {
        ThermalError::Config(format!("unsupported baud rate {}", baud_rate))
    })?;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(ThermalError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB);
    termios.c_cflag |= libc::CS8 | libc::CLOCAL | libc::CREAD;
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        termios.c_cflag &= !libc::CRTSCTS;
    }

    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = vtime(read_timeout);

    let result = unsafe {
        let a = libc::cfsetispeed(&mut termios, speed);
        let b = libc::cfsetospeed(&mut termios, speed);
        a | b
    };
    if result != 0 {
        return Err(ThermalError::Transport(format!(
            "cfsetspeed failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(ThermalError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}
