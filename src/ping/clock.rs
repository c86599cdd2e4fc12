//! Send-timestamp codec for echo payloads.
//!
//! Each echo request carries the wall-clock instant it was built at, encoded
//! as big-endian nanoseconds since the Unix epoch. The reply echoes the payload
//! back unchanged, so the RTT is recovered without keeping a table of
//! outstanding requests.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Length of an encoded timestamp in bytes.
pub const TIMESTAMP_LEN: usize = 8;

/// Encode `time` as 8 big-endian bytes of nanoseconds since the epoch.
///
/// Instants outside the `i64` nanosecond range (about 292 years either side
/// of 1970) saturate.
pub fn encode(time: SystemTime) -> [u8; TIMESTAMP_LEN] {
    let nanos: i128 = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_nanos() as i128,
        Err(before) => -(before.duration().as_nanos() as i128),
    };
    let nanos = nanos.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
    nanos.to_be_bytes()
}

/// Decode 8 big-endian bytes produced by [`encode`].
pub fn decode(bytes: [u8; TIMESTAMP_LEN]) -> SystemTime {
    let nanos = i64::from_be_bytes(bytes);
    if nanos >= 0 {
        UNIX_EPOCH + Duration::from_nanos(nanos as u64)
    } else {
        UNIX_EPOCH - Duration::from_nanos(nanos.unsigned_abs())
    }
}

/// Decode the timestamp at the start of an echo payload.
///
/// Returns `None` when the payload is shorter than [`TIMESTAMP_LEN`].
pub fn decode_prefix(payload: &[u8]) -> Option<SystemTime> {
    let prefix: [u8; TIMESTAMP_LEN] = payload.get(..TIMESTAMP_LEN)?.try_into().ok()?;
    Some(decode(prefix))
}

/// Elapsed time since `sent`, clamped to zero if the clock stepped backwards.
pub fn since(sent: SystemTime) -> Duration {
    SystemTime::now().duration_since(sent).unwrap_or_default()
}
