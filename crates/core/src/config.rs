//! Bridge-wide configuration scalars (spec §6, §9 Design Notes).
//!
//! The original C source kept these as process-wide globals
//! (`g_port`, `g_max_clients`, `g_buf_size`, `g_verbose`, `g_daemon`).
//! Here they're a single immutable value created once in `main` and
//! cloned into each worker thread — no shared mutable state between
//! workers (spec §5).

/// Minimum relay buffer: 4 bytes of frame header plus at least one byte
/// of payload.
pub const MIN_BUFFER_SIZE: usize = 5;

/// Immutable per-process configuration, handed to every worker at start.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port.
    pub port: u16,
    /// Maximum concurrent workers before new connections get HTTP 503.
    pub max_clients: usize,
    /// Interleaved relay buffer size, in bytes (config is given in KiB).
    pub buffer_size: usize,
    /// Verbose logging flag.
    pub verbose: bool,
    /// Stay attached to the controlling terminal instead of daemonizing.
    pub foreground: bool,
}

impl Config {
    pub const DEFAULT_PORT: u16 = 8090;
    pub const DEFAULT_MAX_CLIENTS: usize = 10;
    pub const DEFAULT_BUFFER_KIB: usize = 32;

    /// Build a config from the CLI's scalar inputs.
    ///
    /// `buffer_size_kib` is clamped up to [`MIN_BUFFER_SIZE`] so the relay
    /// can never be configured into an unusable state.
    pub fn new(
        port: u16,
        max_clients: usize,
        buffer_size_kib: usize,
        verbose: bool,
        foreground: bool,
    ) -> Self {
        let buffer_size = (buffer_size_kib * 1024).max(MIN_BUFFER_SIZE);
        Self {
            port,
            max_clients,
            buffer_size,
            verbose,
            foreground,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_PORT,
            Self::DEFAULT_MAX_CLIENTS,
            Self::DEFAULT_BUFFER_KIB,
            false,
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 8090);
        assert_eq!(cfg.max_clients, 10);
        assert_eq!(cfg.buffer_size, 32 * 1024);
    }

    #[test]
    fn tiny_buffer_is_clamped() {
        let cfg = Config::new(8090, 10, 0, false, false);
        assert_eq!(cfg.buffer_size, MIN_BUFFER_SIZE);
    }
}
