//! # rtsp-bridge-core — HTTP-to-RTSP bridge protocol engine
//!
//! Drives an RTSP/1.0 control session against an upstream server over
//! TCP-interleaved transport and relays the resulting RTP stream as a
//! plain byte stream, suitable for labeling as `video/mp2t` and handing
//! to an HTTP client. This crate owns the RTSP state machine and the
//! frame relay; it does not listen on HTTP itself (that's
//! `rtsp-bridge-cli`'s job — see its `server` module).
//!
//! ## Protocol references
//!
//! | RFC | Topic | How this crate uses it |
//! |-----|-------|----------------------|
//! | [RFC 2326](https://tools.ietf.org/html/rfc2326) | RTSP 1.0 | OPTIONS/DESCRIBE/SETUP/PLAY, interleaved framing (§10.12) |
//! | [RFC 4566](https://tools.ietf.org/html/rfc4566) | SDP | `a=control:` attribute resolution |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Adapter (CLI, accept loop + HTTP I/O)    │
//! ├──────────────────────────────────────────┤
//! │  session — RTSP state machine, SDP        │
//! │  relay   — interleaved frame demux        │
//! ├──────────────────────────────────────────┤
//! │  codec   — RTSP request/response I/O      │
//! │  target  — URL parsing and decoding       │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use rtsp_bridge_core::{Target, session};
//!
//! let target = Target::parse("rtsp://camera.local/live").unwrap();
//! let mut streaming = session::drive(&target).unwrap();
//! // `streaming.stream` is positioned right before the first `$`-frame;
//! // hand it to `relay::run` along with the downstream socket.
//! ```
//!
//! ## Crate layout
//!
//! - [`config`] — [`Config`], the bridge's immutable runtime settings.
//! - [`target`] — [`Target`] URL parsing and HTTP-path decoding.
//! - [`codec`] — RTSP request/response wire format.
//! - [`session`] — [`session::drive`] state machine and SDP control-URL resolution.
//! - [`relay`] — [`relay::run`] interleaved RTP demultiplexer.
//! - [`error`] — [`RtspError`] enum and [`Result`] alias.

pub mod codec;
pub mod config;
pub mod error;
pub mod relay;
pub mod session;
pub mod target;

pub use config::Config;
pub use error::{Result, RtspError};
pub use session::{StreamingSession, drive};
pub use target::Target;
