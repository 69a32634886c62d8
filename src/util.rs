use std::sync::atomic::{AtomicU64, Ordering};

static CALL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static STREAM_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static SOURCE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
const HEX: &[u8; 16] = b"0123456789abcdef";

/// Call id for vendors that never send one (Gemini before function call ids).
#[inline]
pub(crate) fn next_call_id() -> String {
    next_generated_id("call", &CALL_ID_COUNTER)
}

#[inline]
pub(crate) fn next_stream_id() -> String {
    next_generated_id("blk", &STREAM_ID_COUNTER)
}

#[inline]
pub(crate) fn next_source_id() -> String {
    next_generated_id("src", &SOURCE_ID_COUNTER)
}

#[inline]
pub(crate) fn next_approval_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn next_generated_id(prefix: &str, counter: &AtomicU64) -> String {
    let id = counter.fetch_add(1, Ordering::Relaxed);
    let mut out = String::with_capacity(prefix.len() + 17);
    out.push_str(prefix);
    out.push('_');
    push_u64_hex_16(&mut out, id);
    out
}

#[inline]
fn push_u64_hex_16(out: &mut String, mut value: u64) {
    let mut buf = [b'0'; 16];
    let mut idx = 16;
    while idx > 0 {
        idx -= 1;
        let nibble = usize::try_from(value & 0x0f).unwrap_or(0);
        buf[idx] = HEX[nibble];
        value >>= 4;
    }
    for byte in buf {
        out.push(char::from(byte));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_prefixed_and_fixed_width() {
        let counter = AtomicU64::new(0x1234_abcd);
        assert_eq!(
            next_generated_id("blk", &counter),
            "blk_000000001234abcd"
        );
        assert_eq!(
            next_generated_id("blk", &counter),
            "blk_000000001234abce"
        );
    }

    #[test]
    fn stream_ids_are_unique() {
        let a = next_stream_id();
        let b = next_stream_id();
        assert_ne!(a, b);
        assert!(a.starts_with("blk_"));
    }

    #[test]
    fn approval_ids_are_uuids() {
        let id = next_approval_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
