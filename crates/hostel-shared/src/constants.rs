//! Application-wide constants

/// Debounce window for identical payment submissions.
pub const DEFAULT_DUPLICATE_PAYMENT_WINDOW_SECS: u64 = 5;

/// Scale used for every persisted monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12,2)` column holds, in hundredths
/// (9 999 999 999.99).
pub const MAX_MONEY_CENTS: i64 = 999_999_999_999;

pub const DEFAULT_CURRENCY_SUFFIX: &str = "TZS";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 28_800;

pub const AUTH_COOKIE_NAME: &str = "token";
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
