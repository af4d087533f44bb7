//! RTSP/1.0 response reader (spec §4.1).

use std::io::Read;
use std::net::TcpStream;
use std::time::Duration;

use crate::codec::line_reader::read_line;
use crate::error::{Result, RtspError};

/// A parsed RTSP response: status line plus the handful of headers the
/// session driver cares about. Every other header is read and discarded
/// (spec §4.1 "All other headers are consumed and discarded").
#[derive(Debug, Clone, Default)]
pub struct RtspResponse {
    pub status_code: u16,
    pub session: Option<String>,
    pub content_length: usize,
    pub location: Option<String>,
}

impl RtspResponse {
    /// Read a status line and headers from `stream`, stopping at the
    /// blank line. Does not read the body — call [`read_body`] once the
    /// caller has decided it wants one.
    pub fn read(stream: &mut TcpStream, timeout: Duration) -> Result<Self> {
        let status_line = read_line(stream, timeout)?;
        let status_code = parse_status_line(&status_line)?;

        let mut resp = RtspResponse {
            status_code,
            ..Default::default()
        };

        loop {
            let line = read_line(stream, timeout)?;
            if line.is_empty() {
                break;
            }
            resp.apply_header_line(&line);
        }

        Ok(resp)
    }

    fn apply_header_line(&mut self, line: &str) {
        if let Some(value) = strip_header(line, "Session:") {
            // Last `Session:` wins (spec §4.2 tie-break); strip any
            // trailing `;timeout=...` parameter.
            let value = value.split(';').next().unwrap_or(value).trim();
            self.session = Some(value.to_string());
        } else if let Some(value) = strip_header(line, "Content-Length:") {
            self.content_length = value.trim().parse().unwrap_or(0);
        } else if let Some(value) = strip_header(line, "Location:") {
            self.location = Some(value.trim().to_string());
        }
    }
}

fn strip_header<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    if line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

fn parse_status_line(line: &str) -> Result<u16> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    let code = parts.next().unwrap_or("");

    if !version.starts_with("RTSP/") {
        return Err(RtspError::MalformedStatusLine(line.to_string()));
    }

    code.parse()
        .map_err(|_| RtspError::MalformedStatusLine(line.to_string()))
}

/// Read exactly `len` bytes of response body (spec §4.1 "read a body of
/// exactly `Content-Length` bytes"). Used both to capture the SDP and to
/// drain bodies the driver doesn't need.
pub fn read_body_exact(stream: &mut TcpStream, len: usize, timeout: Duration) -> Result<Vec<u8>> {
    stream.set_read_timeout(Some(timeout))?;
    let mut body = vec![0u8; len];
    stream.read_exact(&mut body)?;
    Ok(body)
}
