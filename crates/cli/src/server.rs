//! Blocking HTTP accept loop: one thread per downstream client, talking
//! the HTTP/0.9-ish request-line subset this bridge understands and
//! handing the RTSP session driver + relay their socket.
//!
//! Grounded on the teacher's root `src/server.rs` `RtspServer::start`
//! thread-per-connection loop — genuinely blocking `listener.incoming()`
//! rather than the non-blocking poll loop in the teacher's
//! `crates/core/src/transport/tcp.rs`, since the bridge's workers never
//! need to race a shutdown flag mid-accept.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use rtsp_bridge_core::error::RtspError;
use rtsp_bridge_core::target::{target_url_from_path, url_decode};
use rtsp_bridge_core::{Config, Target, relay, session};

/// Downstream receive timeout while reading the request line (spec §6
/// "downstream receive timeout 10 s during header read").
const DOWNSTREAM_HEADER_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the accept loop. Blocks forever; returns only if the listener
/// itself fails to bind.
pub fn run(config: Config) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port))?;
    tracing::info!(port = config.port, "http2rtsp listening");

    let active = Arc::new(AtomicUsize::new(0));

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "accept error");
                continue;
            }
        };

        let config = config.clone();
        let active = active.clone();

        if active.fetch_add(1, Ordering::SeqCst) >= config.max_clients {
            active.fetch_sub(1, Ordering::SeqCst);
            reject_with_503(stream);
            continue;
        }

        thread::spawn(move || {
            let _guard = ActiveGuard(&active);
            handle_client(stream, &config);
        });
    }

    Ok(())
}

/// Decrements the admission counter on any exit path, including panics
/// unwound out of `handle_client`.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn reject_with_503(mut stream: TcpStream) {
    let _ = stream.write_all(
        b"HTTP/1.0 503 Service Unavailable\r\nConnection: close\r\n\r\n",
    );
}

/// Parse the request line, drive the RTSP session, and relay the
/// resulting RTP stream. Every error path before the 200 OK preamble is
/// surfaced as an HTTP status (spec §7); after the preamble is written
/// the connection is simply closed on failure.
fn handle_client(mut downstream: TcpStream, config: &Config) {
    let peer = downstream.peer_addr().ok();
    downstream.set_nodelay(true).ok();

    let target = match read_target(&mut downstream) {
        Ok(t) => t,
        Err(status) => {
            write_status_only(&mut downstream, status);
            return;
        }
    };

    tracing::info!(?peer, target = %target.to_url(), "bridging request");

    let streaming = match session::drive(&target) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(?peer, error = %e, "session setup failed");
            write_status_only(&mut downstream, status_for(&e));
            return;
        }
    };

    if downstream
        .write_all(b"HTTP/1.0 200 OK\r\nContent-Type: video/mp2t\r\nConnection: close\r\n\r\n")
        .is_err()
    {
        return;
    }

    let mut upstream = streaming.stream;
    let mut buffer = vec![0u8; config.buffer_size];

    match relay::run(&mut upstream, &mut downstream, &mut buffer) {
        Ok(()) => tracing::debug!(?peer, "relay finished"),
        Err(e) => tracing::debug!(?peer, error = %e, "relay terminated"),
    }
}

/// Read the HTTP request line, decode its path, and parse the embedded
/// RTSP URL. Returns the HTTP status to send on any failure (spec §6/§7).
fn read_target(downstream: &mut TcpStream) -> Result<Target, u16> {
    downstream
        .set_read_timeout(Some(DOWNSTREAM_HEADER_TIMEOUT))
        .map_err(|_| 500)?;
    let mut reader = BufReader::new(downstream.try_clone().map_err(|_| 500)?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).map_err(|_| 400)?;

    let path = request_line
        .split_whitespace()
        .nth(1)
        .ok_or(400)?;

    let decoded = url_decode(path);
    let rtsp_url = target_url_from_path(&decoded).ok_or(400)?;

    Target::parse(rtsp_url).map_err(|_| 400)
}

fn write_status_only(stream: &mut TcpStream, status: u16) {
    let reason = match status {
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Error",
    };
    let _ = stream.write_all(
        format!("HTTP/1.0 {status} {reason}\r\nConnection: close\r\n\r\n").as_bytes(),
    );
}

/// Map a pre-PLAY [`RtspError`] to its HTTP status per spec §7's
/// taxonomy table.
fn status_for(err: &RtspError) -> u16 {
    match err {
        RtspError::TargetMalformed(_) => 400,
        RtspError::DnsFailure(_) => 404,
        RtspError::UpstreamUnreachable(_) => 500,
        _ => 500,
    }
}
