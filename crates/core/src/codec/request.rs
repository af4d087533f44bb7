//! RTSP/1.0 request writer (spec §4.1).

use std::io::Write;
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{Result, RtspError};

/// Hard cap on a serialized request, matching the original's
/// `MAX_HEADER_LEN` request buffer.
pub const MAX_REQUEST_LEN: usize = 4096;

const USER_AGENT: &str = concat!("rtsp-bridge/", env!("CARGO_PKG_VERSION"));

/// Write an RTSP/1.0 request and flush it within `timeout`.
///
/// `extra_headers` is inserted verbatim (already CRLF-terminated per
/// header) before the optional `Session:` header and the blank-line
/// terminator.
pub fn write_request(
    stream: &mut TcpStream,
    method: &str,
    url: &str,
    cseq: u32,
    extra_headers: Option<&str>,
    session: Option<&str>,
    timeout: Duration,
) -> Result<()> {
    let mut req = format!(
        "{method} {url} RTSP/1.0\r\nCSeq: {cseq}\r\nUser-Agent: {USER_AGENT}\r\n"
    );

    if let Some(extra) = extra_headers {
        req.push_str(extra);
    }
    if let Some(session) = session {
        req.push_str("Session: ");
        req.push_str(session);
        req.push_str("\r\n");
    }
    req.push_str("\r\n");

    if req.len() > MAX_REQUEST_LEN {
        return Err(RtspError::RequestTooLong);
    }

    stream.set_write_timeout(Some(timeout))?;
    stream.write_all(req.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn writes_request_with_cseq_and_session() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            server.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
            let mut chunk = [0u8; 512];
            loop {
                match server.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.extend_from_slice(&chunk[..n]);
                        if buf.ends_with(b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            buf
        });

        let mut client = TcpStream::connect(addr).unwrap();
        write_request(
            &mut client,
            "PLAY",
            "rtsp://host/a",
            3,
            Some("Range: npt=0.000-\r\n"),
            Some("ABC123"),
            Duration::from_secs(1),
        )
        .unwrap();

        let received = String::from_utf8(handle.join().unwrap()).unwrap();
        assert!(received.starts_with("PLAY rtsp://host/a RTSP/1.0\r\n"));
        assert!(received.contains("CSeq: 3\r\n"));
        assert!(received.contains("Range: npt=0.000-\r\n"));
        assert!(received.contains("Session: ABC123\r\n"));
        assert!(received.ends_with("\r\n\r\n"));
    }

    #[test]
    fn rejects_oversized_request() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let _keep_alive = thread::spawn(move || listener.accept());
        let mut client = TcpStream::connect(addr).unwrap();
        let huge = "X".repeat(MAX_REQUEST_LEN);
        let err = write_request(
            &mut client,
            "OPTIONS",
            "rtsp://host/a",
            1,
            Some(&huge),
            None,
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, RtspError::RequestTooLong));
    }
}
