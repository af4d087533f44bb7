//! Shared CRLF line reader used by the response codec and by the relay's
//! out-of-band text skipping (spec §4.1, §4.3).
//!
//! `std::net::TcpStream` only exposes a read timeout for the whole read
//! call, not per-byte, so each 1-byte read is given the same deadline —
//! matching the original's `select()`-then-`recv(1)` loop (spec §4.1
//! "Line reader uses 1-byte reads with a per-line timeout").

use std::io::Read;
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{Result, RtspError};

/// Header lines longer than this are truncated; the truncated tail is
/// returned as if it were end-of-line (spec §4.1 "Robustness over
/// strictness").
pub const MAX_LINE_LEN: usize = 4096;

/// Read one CRLF-terminated line from `stream`, with `timeout` applied to
/// every underlying byte read.
///
/// Returns the line without its trailing CRLF/LF. Lines longer than
/// [`MAX_LINE_LEN`] are truncated and returned rather than erroring.
pub fn read_line(stream: &mut TcpStream, timeout: Duration) -> Result<String> {
    stream.set_read_timeout(Some(timeout))?;

    let mut buf = Vec::with_capacity(128);
    let mut byte = [0u8; 1];

    loop {
        match stream.read(&mut byte) {
            Ok(0) => return Err(RtspError::ConnectionClosed),
            Ok(_) => {
                buf.push(byte[0]);
                if buf.ends_with(b"\r\n") {
                    buf.truncate(buf.len() - 2);
                    break;
                }
                if buf.last() == Some(&b'\n') {
                    buf.truncate(buf.len() - 1);
                    break;
                }
                if buf.len() >= MAX_LINE_LEN {
                    break;
                }
            }
            Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {
                return Err(RtspError::IoTimeout);
            }
            Err(e) => return Err(RtspError::Io(e)),
        }
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
