use chrono::{DateTime, Utc};

/// Trait for providing the current UTC time.
pub trait Now: Send + Sync + 'static {
    /// Returns the current UTC time.
    fn now() -> DateTime<Utc>;
}

/// Implementation that returns the actual current system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNow;

impl Now for SystemNow {
    fn now() -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(feature = "mock")]
pub mod mock {
    use super::*;

    /// The instant returned by [`MockNow`]: 2020-01-01 00:00:00 UTC.
    pub const MOCK_TIMESTAMP: i64 = 1_577_836_800;

    /// Mock time provider for testing.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct MockNow;

    impl Now for MockNow {
        fn now() -> DateTime<Utc> {
            DateTime::from_timestamp(MOCK_TIMESTAMP, 0).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_now() {
        let now1 = SystemNow::now();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let now2 = SystemNow::now();

        assert!(now2 > now1);
    }

    #[cfg(feature = "mock")]
    #[test]
    fn test_mock_now() {
        use mock::{MOCK_TIMESTAMP, MockNow};

        assert_eq!(MockNow::now().timestamp(), MOCK_TIMESTAMP);
        assert_eq!(MockNow::now(), MockNow::now());
    }
}
