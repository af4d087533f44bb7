//! RTSP session driver (spec §4.2): sequences OPTIONS, DESCRIBE,
//! (optional redirect reconnect), SETUP, PLAY against a single upstream
//! connection and hands the positioned socket to the relay.
//!
//! ```text
//!   INIT → OPTIONS_SENT → OPTIONS_OK → DESCRIBE_SENT → DESCRIBE_RESP
//!                                                        │
//!                           ┌────────────────────────────┤
//!                           │ status==302 & Location set │ status==200
//!                           ▼                            ▼
//!                     RECONNECT → OPTIONS2 →            SDP_PARSE
//!                     OPTIONS2_OK → DESCRIBE2 →            │
//!                     DESCRIBE2_OK ─────────────────────► SETUP_SENT
//!                                                          │ 200 + Session
//!                                                          ▼
//!                                                       PLAY_SENT
//!                                                          │ 200
//!                                                          ▼
//!                                                       STREAMING
//! ```
//!
//! Modeled as the bounded `for hop in 0..=1` loop recommended by the
//! spec's design notes rather than duplicating the OPTIONS+DESCRIBE
//! prefix for the redirect branch.

pub mod sdp;

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::codec::{RtspResponse, read_body_exact, write_request};
use crate::error::{Result, RtspError};
use crate::target::Target;

/// Timeout applied to every outbound request write (spec §4.1).
const REQUEST_WRITE_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for OPTIONS and SETUP responses (spec §4.1).
const SHORT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for DESCRIBE and PLAY responses (spec §4.1).
const LONG_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);
/// Connect timeout for both the initial upstream connection and the
/// single redirect reconnect (spec §4.2, §6).
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed interleaved channel assignment the driver asserts unilaterally
/// (spec §3, §4.2: "The driver does not negotiate channel numbers").
pub const RTP_CHANNEL: u8 = 0;
pub const RTCP_CHANNEL: u8 = 1;

/// The outcome of a successful [`drive`] call: an upstream socket
/// positioned immediately before the first `$`-framed byte, ready to
/// hand to the relay.
pub struct StreamingSession {
    pub stream: TcpStream,
    pub control_url: String,
}

/// Drive `target` through OPTIONS → DESCRIBE → (redirect) → SETUP → PLAY.
///
/// On success, returns a [`StreamingSession`] whose socket is positioned
/// right after the PLAY response. Never writes to a downstream sink —
/// that's the caller's job once this returns (spec §4.2 public contract).
pub fn drive(target: &Target) -> Result<StreamingSession> {
    let mut stream = connect(target)?;
    let mut current_url = target.original.clone();
    let mut cseq = 0u32;

    let describe_resp = loop_options_describe(&mut stream, &mut current_url, &mut cseq)?;

    let sdp_bytes = read_body_exact(&mut stream, describe_resp.content_length, LONG_RESPONSE_TIMEOUT)?;
    let sdp = String::from_utf8_lossy(&sdp_bytes);
    let control_url = sdp::resolve_control_url(&sdp, &current_url);

    let session_id = setup(&mut stream, &control_url, &mut cseq)?;
    play(&mut stream, &control_url, &session_id, &mut cseq)?;

    Ok(StreamingSession {
        stream,
        control_url,
    })
}

/// Resolve and connect to `target.host:target.port`, distinguishing DNS
/// failure from a reachable-but-refusing host (spec §7 error taxonomy).
fn connect(target: &Target) -> Result<TcpStream> {
    let addr_str = target.socket_addr_string();
    let mut addrs = addr_str
        .to_socket_addrs()
        .map_err(|_| RtspError::DnsFailure(target.host.clone()))?
        .peekable();

    if addrs.peek().is_none() {
        return Err(RtspError::DnsFailure(target.host.clone()));
    }

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(RtspError::UpstreamUnreachable(
        last_err.map(|e| e.to_string()).unwrap_or_default(),
    ))
}

/// Runs the OPTIONS+DESCRIBE prefix, replaying it once if DESCRIBE
/// returns a 302 with a `Location:`. Mutates `stream`/`current_url`/
/// `cseq` in place on a redirect; returns the DESCRIBE response once it
/// succeeds with 200.
fn loop_options_describe(
    stream: &mut TcpStream,
    current_url: &mut String,
    cseq: &mut u32,
) -> Result<RtspResponse> {
    for hop in 0..=1 {
        options(stream, current_url, cseq)?;

        *cseq += 1;
        write_request(
            stream,
            "DESCRIBE",
            current_url,
            *cseq,
            Some("Accept: application/sdp\r\n"),
            None,
            REQUEST_WRITE_TIMEOUT,
        )?;
        let resp = RtspResponse::read(stream, LONG_RESPONSE_TIMEOUT)?;

        if resp.status_code == 200 {
            return Ok(resp);
        }

        if resp.status_code == 302 {
            if hop == 1 {
                return Err(RtspError::RtspProtocolError(
                    "second 302 redirect rejected".to_string(),
                ));
            }
            let location = resp
                .location
                .filter(|l| !l.is_empty())
                .ok_or_else(|| RtspError::RtspProtocolError("302 with empty Location".to_string()))?;

            let new_target = Target::parse(&location)?;
            *stream = connect(&new_target)?;
            *current_url = location;
            *cseq = 0;
            continue;
        }

        return Err(RtspError::RtspProtocolError(format!(
            "DESCRIBE returned {}",
            resp.status_code
        )));
    }

    unreachable!("loop always returns or errors within two hops")
}

fn options(stream: &mut TcpStream, url: &str, cseq: &mut u32) -> Result<()> {
    *cseq += 1;
    write_request(stream, "OPTIONS", url, *cseq, None, None, REQUEST_WRITE_TIMEOUT)?;
    let resp = RtspResponse::read(stream, SHORT_RESPONSE_TIMEOUT)?;
    if resp.content_length > 0 {
        read_body_exact(stream, resp.content_length, SHORT_RESPONSE_TIMEOUT)?;
    }
    if resp.status_code != 200 {
        return Err(RtspError::RtspProtocolError(format!(
            "OPTIONS returned {}",
            resp.status_code
        )));
    }
    Ok(())
}

/// Send SETUP against `control_url` (not the request URL — spec §4.2)
/// and return the session id the server assigned. Asserts
/// `interleaved=0-1` unilaterally; the driver never negotiates channel
/// numbers.
fn setup(stream: &mut TcpStream, control_url: &str, cseq: &mut u32) -> Result<String> {
    *cseq += 1;
    write_request(
        stream,
        "SETUP",
        control_url,
        *cseq,
        Some("Transport: RTP/AVP/TCP;unicast;interleaved=0-1\r\n"),
        None,
        REQUEST_WRITE_TIMEOUT,
    )?;

    let resp = RtspResponse::read(stream, SHORT_RESPONSE_TIMEOUT)?;
    if resp.content_length > 0 {
        read_body_exact(stream, resp.content_length, SHORT_RESPONSE_TIMEOUT)?;
    }
    if resp.status_code != 200 {
        return Err(RtspError::RtspProtocolError(format!(
            "SETUP returned {}",
            resp.status_code
        )));
    }
    resp.session
        .ok_or_else(|| RtspError::RtspProtocolError("SETUP 200 without Session".to_string()))
}

fn play(stream: &mut TcpStream, control_url: &str, session_id: &str, cseq: &mut u32) -> Result<()> {
    *cseq += 1;
    write_request(
        stream,
        "PLAY",
        control_url,
        *cseq,
        Some("Range: npt=0.000-\r\n"),
        Some(session_id),
        REQUEST_WRITE_TIMEOUT,
    )?;

    let resp = RtspResponse::read(stream, LONG_RESPONSE_TIMEOUT)?;
    if resp.content_length > 0 {
        read_body_exact(stream, resp.content_length, LONG_RESPONSE_TIMEOUT)?;
    }
    if resp.status_code != 200 {
        return Err(RtspError::RtspProtocolError(format!(
            "PLAY returned {}",
            resp.status_code
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Scripts a minimal upstream RTSP server: replies 200 to OPTIONS,
    /// DESCRIBE (with the given SDP body), SETUP (with a Session
    /// header), and PLAY, then writes one interleaved frame. Mirrors
    /// scenario 1 from spec §8.
    fn spawn_upstream(sdp: &'static str) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = stream;

            let read_request = |reader: &mut BufReader<TcpStream>| -> String {
                let mut request = String::new();
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if line == "\r\n" {
                        break;
                    }
                    request.push_str(&line);
                }
                request
            };

            let options_req = read_request(&mut reader);
            assert!(options_req.starts_with("OPTIONS"));
            writer.write_all(b"RTSP/1.0 200 OK\r\nCSeq: 1\r\n\r\n").unwrap();

            let describe_req = read_request(&mut reader);
            assert!(describe_req.starts_with("DESCRIBE"));
            writer
                .write_all(
                    format!(
                        "RTSP/1.0 200 OK\r\nCSeq: 2\r\nContent-Length: {}\r\n\r\n{}",
                        sdp.len(),
                        sdp
                    )
                    .as_bytes(),
                )
                .unwrap();

            let setup_req = read_request(&mut reader);
            assert!(setup_req.starts_with("SETUP"));
            writer
                .write_all(b"RTSP/1.0 200 OK\r\nCSeq: 3\r\nSession: ABC123\r\n\r\n")
                .unwrap();

            let play_req = read_request(&mut reader);
            assert!(play_req.starts_with("PLAY"));
            writer
                .write_all(b"RTSP/1.0 200 OK\r\nCSeq: 4\r\nSession: ABC123\r\n\r\n")
                .unwrap();

            writer.write_all(&[0x24, 0x00, 0x00, 0x05]).unwrap();
            writer.write_all(b"Hello").unwrap();
        });
        addr
    }

    #[test]
    fn drives_full_dialog_and_positions_before_first_frame() {
        let addr = spawn_upstream("v=0\r\n");
        let target = Target::parse(&format!("rtsp://{}:{}/live", addr.ip(), addr.port())).unwrap();

        let mut session = drive(&target).unwrap();
        assert_eq!(session.control_url, target.original);

        let mut header = [0u8; 4];
        std::io::Read::read_exact(&mut session.stream, &mut header).unwrap();
        assert_eq!(header, [0x24, 0x00, 0x00, 0x05]);

        let mut payload = [0u8; 5];
        std::io::Read::read_exact(&mut session.stream, &mut payload).unwrap();
        assert_eq!(&payload, b"Hello");
    }

    #[test]
    fn control_url_from_sdp_is_used_for_setup() {
        let addr = spawn_upstream("v=0\r\na=control:trackID=1\r\n");
        let target = Target::parse(&format!("rtsp://{}:{}/a", addr.ip(), addr.port())).unwrap();
        let session = drive(&target).unwrap();
        assert_eq!(session.control_url, format!("{}/trackID=1", target.original));
    }

    /// Spec §8 scenario 3: a request URL with no explicit port must not
    /// have one injected by the driver. `Target::parse` always fills in
    /// the default port on `host`/`port`, so this builds a `Target`
    /// directly to pin `original` to the port-less form while still
    /// dialing the real test-listener port — exactly the split the
    /// driver must respect (drive off `original`, connect via
    /// `host`/`port`).
    #[test]
    fn control_url_omits_port_when_request_url_did() {
        let addr = spawn_upstream("v=0\r\na=control:trackID=1\r\n");
        let target = Target {
            host: addr.ip().to_string(),
            port: addr.port(),
            path: "/a".to_string(),
            original: "rtsp://host/a".to_string(),
        };
        let session = drive(&target).unwrap();
        assert_eq!(session.control_url, "rtsp://host/a/trackID=1");
    }
}
