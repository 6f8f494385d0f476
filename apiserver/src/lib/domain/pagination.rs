/// Offset/limit window for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    /// Build a window from optional client input.
    ///
    /// Negative offsets become 0; missing or non-positive limits fall back to
    /// the default and large limits are capped.
    pub fn new(offset: Option<i64>, limit: Option<i64>) -> Self {
        let offset = offset.unwrap_or(0).max(0);
        let limit = match limit {
            Some(limit) if limit > 0 => limit.min(Self::MAX_LIMIT),
            _ => Self::DEFAULT_LIMIT,
        };
        Self { offset, limit }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            Pagination::new(None, None),
            Pagination {
                offset: 0,
                limit: 20
            }
        );
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Pagination::new(Some(-3), Some(0)).offset, 0);
        assert_eq!(Pagination::new(Some(-3), Some(0)).limit, 20);
        assert_eq!(Pagination::new(Some(40), Some(500)).limit, 100);
        assert_eq!(Pagination::new(Some(40), Some(5)), Pagination { offset: 40, limit: 5 });
    }
}
