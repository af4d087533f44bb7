//! RTSP/1.0 message codec (spec §4.1): a line-oriented reader/writer for
//! request and response headers, plus a length-bounded body reader.
//!
//! ## Message format (RFC 2326 §4)
//!
//! ```text
//! DESCRIBE rtsp://server/stream RTSP/1.0\r\n
//! CSeq: 2\r\n
//! Accept: application/sdp\r\n
//! \r\n
//! ```
//!
//! Each timeout is explicit and passed in by the caller — the codec has
//! no notion of a "default" timeout; the session driver picks the value
//! appropriate to the method being sent (spec §4.1).

pub mod line_reader;
pub mod request;
pub mod response;

pub use request::write_request;
pub use response::{RtspResponse, read_body_exact};
