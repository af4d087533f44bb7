//! `http2rtsp` — serves an RTSP TCP-interleaved stream as plain HTTP.
//!
//! `GET /rtsp://host[:port]/path` opens an RTSP control session against
//! the named upstream and streams the channel-0 RTP payload back as
//! `video/mp2t`. See `rtsp_bridge_core` for the protocol engine; this
//! binary only owns argument parsing, logging setup, and the accept
//! loop (`server` module).

mod server;

use clap::Parser;
use rtsp_bridge_core::Config;

#[derive(Parser)]
#[command(
    name = "http2rtsp",
    about = "Bridge an RTSP/TCP-interleaved stream to plain HTTP"
)]
struct Args {
    /// HTTP listen port.
    #[arg(long, short = 'p', default_value_t = Config::DEFAULT_PORT)]
    port: u16,

    /// Maximum concurrent clients; excess connections get HTTP 503.
    #[arg(long, short = 'c', default_value_t = Config::DEFAULT_MAX_CLIENTS)]
    max_clients: usize,

    /// Interleaved relay buffer size, in KiB.
    #[arg(long, short = 'B', default_value_t = Config::DEFAULT_BUFFER_KIB)]
    buffer_size: usize,

    /// Verbose logging (debug level instead of warn).
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Stay attached to the controlling terminal. Accepted for
    /// compatibility with the original tool's flags; this rewrite never
    /// daemonizes, so the flag is otherwise a no-op.
    #[arg(long, short = 'T')]
    foreground: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = Config::new(
        args.port,
        args.max_clients,
        args.buffer_size,
        args.verbose,
        args.foreground,
    );

    if let Err(e) = server::run(config) {
        tracing::error!(error = %e, "failed to start http2rtsp");
        std::process::exit(1);
    }
}
