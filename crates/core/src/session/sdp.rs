//! Control-URL extraction from an SDP body (spec §4.2).
//!
//! The bridge doesn't parse SDP beyond this single attribute — no codec
//! negotiation, no track enumeration (spec §1 Non-goals).

/// Scan `sdp` for the first `a=control:` attribute and resolve it
/// against `request_url` per spec §4.2:
///
/// - `rtsp://...` token: used verbatim.
/// - Otherwise: relative. Joined directly if `request_url` ends in `/`
///   or the token begins with `/`; joined with a single `/` separator
///   otherwise.
/// - No `a=control:` found: the control URL equals `request_url`.
///
/// Only the first `a=control:` line is consulted (spec §4.2 tie-break:
/// "the spec does not attempt aggregate media control").
pub fn resolve_control_url(sdp: &str, request_url: &str) -> String {
    let Some(after) = sdp.find("a=control:").map(|idx| &sdp[idx + "a=control:".len()..]) else {
        return request_url.to_string();
    };

    let line_end = after.find('\n').unwrap_or(after.len());
    let token = after[..line_end].trim_end_matches(['\r', ' ']);

    if token.starts_with("rtsp://") {
        token.to_string()
    } else if request_url.ends_with('/') || token.starts_with('/') {
        format!("{request_url}{token}")
    } else {
        format!("{request_url}/{token}")
    }
}
