//! Run configuration constants

use std::time::Duration;

/// Number of install records requested per page.
pub const PAGE_SIZE: usize = 50;

/// Maximum number of rank lookups attempted for one domain.
/// Bounds how long a persistently rate-limited domain can hold up the run.
pub const MAX_RANK_ATTEMPTS: u32 = 5;

/// Delay between rank lookup attempts after a transient rate limit.
/// One second is enough for the per-call rate-limit window to reset.
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Directory the rank store lives in.
pub const OUTPUT_DIR: &str = "output";

/// File name of the rank store.
pub const OUTPUT_FILE: &str = "ranks.csv";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_is_one_second() {
        assert_eq!(RETRY_DELAY, Duration::from_secs(1));
    }
}
