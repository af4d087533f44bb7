//! Interleaved RTP relay (spec §4.3): once PLAY has succeeded, forwards
//! channel-0 `$`-framed payload from the upstream socket to the
//! downstream HTTP client until either side is no longer usable.
//!
//! Framing (RFC 2326 §10.12): byte 0 = `$` (0x24), byte 1 = channel,
//! bytes 2-3 = big-endian 16-bit payload length, followed by that many
//! payload bytes.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::codec::line_reader::read_line;
use crate::error::{Result, RtspError};
use crate::session::RTP_CHANNEL;

const DOLLAR: u8 = 0x24;

/// Idle-read timeout while waiting for the next byte on the upstream
/// socket (spec §4.3 step 2).
const IDLE_TIMEOUT: Duration = Duration::from_secs(5);
/// Write timeout applied to every forwarded payload (spec §4.3 step 6).
const DOWNSTREAM_WRITE_TIMEOUT: Duration = Duration::from_secs(2);
/// Consecutive short-read budget before the relay gives up (spec §4.3
/// step 7).
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Run the relay loop: read `$`-framed RTP from `upstream`, forward
/// channel-0 payloads to `downstream`, drop everything else.
///
/// `buffer` is reused across frames and must be at least
/// [`crate::config::MIN_BUFFER_SIZE`] bytes; frame lengths are clamped
/// to `buffer.len() - 4` before any read happens (spec §3 invariant: "no
/// frame is forwarded partially").
pub fn run(upstream: &mut TcpStream, downstream: &mut TcpStream, buffer: &mut [u8]) -> Result<()> {
    let max_payload = buffer.len().saturating_sub(4);
    let mut consecutive_errors = 0u32;
    downstream.set_write_timeout(Some(DOWNSTREAM_WRITE_TIMEOUT))?;

    loop {
        if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
            return Err(RtspError::RelayIoError);
        }

        match wait_and_peek(upstream) {
            WaitOutcome::Timeout => continue,
            WaitOutcome::NotDollar => {
                // Stray RTSP text interleaved with the binary stream —
                // line-skip it and keep going (spec §4.3 step 3).
                if read_line(upstream, IDLE_TIMEOUT).is_err() {
                    consecutive_errors += 1;
                }
                continue;
            }
            // Observed closure terminates the worker immediately rather
            // than spending the error budget (spec §5 "upstream closure
            // ... likewise terminates the worker").
            WaitOutcome::Closed => return Err(RtspError::RelayIoError),
            WaitOutcome::Error => {
                consecutive_errors += 1;
                continue;
            }
            WaitOutcome::Dollar => {}
        }

        let mut header = [0u8; 4];
        match read_exact_timeout(upstream, &mut header, IDLE_TIMEOUT) {
            Ok(()) => {}
            Err(RtspError::ConnectionClosed) => return Err(RtspError::RelayIoError),
            Err(_) => {
                consecutive_errors += 1;
                continue;
            }
        }

        let channel = header[1];
        let length = (u16::from_be_bytes([header[2], header[3]]) as usize).min(max_payload);

        match read_exact_timeout(upstream, &mut buffer[..length], IDLE_TIMEOUT) {
            Ok(()) => {}
            Err(RtspError::ConnectionClosed) => return Err(RtspError::RelayIoError),
            Err(_) => {
                consecutive_errors += 1;
                continue;
            }
        }

        if channel == RTP_CHANNEL && length > 0 {
            if downstream.write_all(&buffer[..length]).is_err() {
                return Err(RtspError::RelayIoError);
            }
        }

        consecutive_errors = 0;
    }
}

enum WaitOutcome {
    Dollar,
    NotDollar,
    Timeout,
    Closed,
    Error,
}

fn wait_and_peek(upstream: &mut TcpStream) -> WaitOutcome {
    if upstream.set_read_timeout(Some(IDLE_TIMEOUT)).is_err() {
        return WaitOutcome::Error;
    }

    let mut peek = [0u8; 1];
    match upstream.peek(&mut peek) {
        Ok(0) => WaitOutcome::Closed,
        Ok(_) => {
            if peek[0] == DOLLAR {
                WaitOutcome::Dollar
            } else {
                WaitOutcome::NotDollar
            }
        }
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
            WaitOutcome::Timeout
        }
        Err(e) if e.kind() == ErrorKind::Interrupted => WaitOutcome::Timeout,
        Err(_) => WaitOutcome::Error,
    }
}

fn read_exact_timeout(stream: &mut TcpStream, buf: &mut [u8], timeout: Duration) -> Result<()> {
    stream.set_read_timeout(Some(timeout))?;
    stream.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => RtspError::IoTimeout,
        ErrorKind::UnexpectedEof => RtspError::ConnectionClosed,
        _ => RtspError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = thread::spawn(move || TcpStream::connect(addr).unwrap());
        let (server, _) = listener.accept().unwrap();
        (server, client.join().unwrap())
    }

    fn upstream_with(frames: Vec<u8>) -> TcpStream {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let mut client = TcpStream::connect(addr).unwrap();
            client.write_all(&frames).unwrap();
        });
        let (server, _) = listener.accept().unwrap();
        server
    }

    fn drain(mut stream: TcpStream) -> Vec<u8> {
        let mut out = Vec::new();
        stream.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        let mut chunk = [0u8; 256];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => out.extend_from_slice(&chunk[..n]),
                Err(_) => break,
            }
        }
        out
    }

    #[test]
    fn forwards_channel_zero_payload_only() {
        let mut frames = vec![0x24, 0x01, 0x00, 0x04];
        frames.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        frames.extend_from_slice(&[0x24, 0x00, 0x00, 0x02, 0x01, 0x02]);

        let mut upstream = upstream_with(frames);
        let (mut downstream, client_side) = connected_pair();
        let reader = thread::spawn(move || drain(client_side));
        let mut buf = vec![0u8; 1024];

        let _ = run(&mut upstream, &mut downstream, &mut buf);
        drop(downstream);
        assert_eq!(reader.join().unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn zero_length_frame_writes_nothing_and_does_not_error() {
        let frames = vec![0x24, 0x00, 0x00, 0x00];
        let mut upstream = upstream_with(frames);
        let (mut downstream, client_side) = connected_pair();
        let reader = thread::spawn(move || drain(client_side));
        let mut buf = vec![0u8; 1024];
        let _ = run(&mut upstream, &mut downstream, &mut buf);
        drop(downstream);
        assert!(reader.join().unwrap().is_empty());
    }

    #[test]
    fn oversized_length_is_clamped_to_buffer() {
        // Declares a length far larger than the buffer; only
        // `buffer_size - 4` bytes should ever be read as payload.
        let mut frames = vec![0x24, 0x00, 0xff, 0xff];
        frames.extend(std::iter::repeat(0xAB).take(12));
        let mut upstream = upstream_with(frames);
        let (mut downstream, client_side) = connected_pair();
        let reader = thread::spawn(move || drain(client_side));
        let mut buf = vec![0u8; 16]; // max_payload = 12
        let _ = run(&mut upstream, &mut downstream, &mut buf);
        drop(downstream);
        assert_eq!(reader.join().unwrap().len(), 12);
    }
}
