//! Error types for the RTSP bridge core.

/// Errors that can occur while driving an RTSP session or relaying
/// interleaved RTP frames.
///
/// Variants map to specific failure modes across the stack:
///
/// - **Target parsing**: [`TargetMalformed`](Self::TargetMalformed).
/// - **Codec**: [`MalformedStatusLine`](Self::MalformedStatusLine),
///   [`HeaderTooLong`](Self::HeaderTooLong),
///   [`RequestTooLong`](Self::RequestTooLong).
/// - **Transport**: [`Io`](Self::Io), [`IoTimeout`](Self::IoTimeout),
///   [`ConnectionClosed`](Self::ConnectionClosed),
///   [`DnsFailure`](Self::DnsFailure),
///   [`UpstreamUnreachable`](Self::UpstreamUnreachable).
/// - **Session**: [`RtspProtocolError`](Self::RtspProtocolError).
/// - **Relay**: [`RelayIoError`](Self::RelayIoError).
///
/// The HTTP-status mapping in spec §7's error taxonomy table lives in
/// the CLI crate, not here — the core never emits HTTP.
#[derive(Debug, thiserror::Error)]
pub enum RtspError {
    /// Underlying I/O or socket error not covered by a more specific
    /// variant below.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read or write did not complete within its configured timeout.
    #[error("I/O timeout")]
    IoTimeout,

    /// The peer closed the connection mid-read.
    #[error("connection closed")]
    ConnectionClosed,

    /// The RTSP status line did not match `RTSP/1.0 <code> <reason>`.
    #[error("malformed status line: {0}")]
    MalformedStatusLine(String),

    /// A header line exceeded the 4 KiB line buffer and was truncated.
    #[error("header line too long")]
    HeaderTooLong,

    /// Formatting a request would have exceeded the 4 KiB request cap.
    #[error("request too long")]
    RequestTooLong,

    /// The target string was not a well-formed `rtsp://host[:port]/path` URL.
    #[error("malformed RTSP target: {0}")]
    TargetMalformed(String),

    /// The target or redirect host did not resolve.
    #[error("DNS resolution failed for {0}")]
    DnsFailure(String),

    /// The upstream host resolved but the TCP connect failed.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// A non-200 RTSP response (other than the single accepted 302 at
    /// DESCRIBE), a missing `Session:` header after SETUP, an empty
    /// `Location:` on a 302, or a second redirect hop.
    #[error("RTSP protocol error: {0}")]
    RtspProtocolError(String),

    /// The interleaved relay hit its consecutive-error budget (10 short
    /// reads in a row) and gave up.
    #[error("relay exceeded its error budget")]
    RelayIoError,
}

impl RtspError {
    /// Whether this failure happened before `PLAY` succeeded, i.e. whether
    /// it can still be surfaced to the downstream client as an HTTP status
    /// line (spec §7 propagation policy: post-PLAY errors cannot be
    /// surfaced because headers are already sent).
    pub fn is_pre_play(&self) -> bool {
        !matches!(self, Self::RelayIoError)
    }
}

/// Convenience alias for `Result<T, RtspError>`.
pub type Result<T> = std::result::Result<T, RtspError>;
