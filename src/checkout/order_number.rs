use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

/// Issues `ORD-` + upper-case base-36 millisecond stamps.
///
/// Stamps are strictly increasing within one generator, so two submissions in
/// the same millisecond still get distinct numbers. Uniqueness across processes
/// is left to the store, which rejects duplicates.
#[derive(Debug, Default)]
pub struct OrderNumberGenerator {
    last_stamp: AtomicU64,
}

impl OrderNumberGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_number(&self) -> String {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        self.next_at(now)
    }

    fn next_at(&self, now_ms: u64) -> String {
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now_ms.max(last + 1)))
            .unwrap_or_else(|last| last);
        let stamp = now_ms.max(previous + 1);
        format!("{ORDER_NUMBER_PREFIX}{}", to_base36(stamp))
    }
}

/// Upper-case base-36 digits of `n`.
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(char::from(DIGITS[(n % 36) as usize]));
        n /= 36;
    }
    digits.iter().rev().collect()
}
