pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Random suffix for temporary ids. Falls back to a process-local counter if the
/// platform RNG is unavailable.
pub(crate) fn random_u64() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            log::warn!("getrandom unavailable, using counter: {e}");
            fallback_counter()
        }
    }
}

fn fallback_counter() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::SeqCst)
}
