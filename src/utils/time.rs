use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time in milliseconds since UNIX epoch
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

/// High-water mark for `next_timestamp`. Never decreases.
static LAST_TIMESTAMP: AtomicU64 = AtomicU64::new(0);

/// Returns a strictly increasing timestamp in nanoseconds since UNIX epoch.
///
/// Every call, from any thread, observes a value strictly greater than any
/// previously returned one. When the wall clock stalls or steps backwards the
/// counter advances by one nanosecond per call instead, so event ordering and
/// price-time tie-breaking stay total.
pub fn next_timestamp() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_nanos() as u64;

    let mut last = LAST_TIMESTAMP.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_TIMESTAMP.compare_exchange_weak(
            last,
            candidate,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate,
            Err(observed) => last = observed,
        }
    }
}
