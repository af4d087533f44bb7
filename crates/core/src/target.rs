//! `rtsp://host[:port][/path]` parsing (spec §3, §6) and the HTTP-path
//! decoding step that extracts such a URL from a downstream request line.

use crate::error::{Result, RtspError};

/// Default RTSP control port (RFC 2326 §3.2).
pub const DEFAULT_RTSP_PORT: u16 = 554;

/// A parsed RTSP target URL. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub original: String,
}

impl Target {
    /// Parse `rtsp://host[:port][/path]`.
    ///
    /// Host may be a name or dotted IPv4. Missing port defaults to 554;
    /// missing path defaults to `/`.
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("rtsp://")
            .ok_or_else(|| RtspError::TargetMalformed(url.to_string()))?;

        let (host_port, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, "/"),
        };

        if host_port.is_empty() {
            return Err(RtspError::TargetMalformed(url.to_string()));
        }

        let (host, port) = match host_port.rsplit_once(':') {
            Some((h, p)) => {
                let port: u16 = p
                    .parse()
                    .map_err(|_| RtspError::TargetMalformed(url.to_string()))?;
                (h, port)
            }
            None => (host_port, DEFAULT_RTSP_PORT),
        };

        if host.is_empty() {
            return Err(RtspError::TargetMalformed(url.to_string()));
        }

        Ok(Target {
            host: host.to_string(),
            port,
            path: path.to_string(),
            original: url.to_string(),
        })
    }

    /// The `host:port` pair suitable for `TcpStream::connect`.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reassemble into an `rtsp://host:port/path` string. Used for
    /// round-trip tests (spec §8) and to build the initial request URL
    /// when the bridge talks to the target rather than a resolved
    /// control URL.
    pub fn to_url(&self) -> String {
        format!("rtsp://{}:{}{}", self.host, self.port, self.path)
    }
}

/// Decode `%HH` escapes and `+` as space, per spec §6.
pub fn url_decode(src: &str) -> String {
    let bytes = src.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                    if let Ok(byte) = u8::from_str_radix(hex, 16) {
                        out.push(byte);
                        i += 3;
                        continue;
                    }
                }
                out.push(bytes[i]);
                i += 1;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Extract the target RTSP URL from a decoded HTTP request path, per
/// spec §6: strip the leading `/`, the result must begin with `rtsp://`.
pub fn target_url_from_path(decoded_path: &str) -> Option<&str> {
    let without_slash = decoded_path.strip_prefix('/').unwrap_or(decoded_path);
    without_slash.starts_with("rtsp://").then_some(without_slash)
}
