//! Decision port for runs that may exceed the remaining quota

use super::models::QuotaEstimate;

/// Asked whether to go on when the pre-flight estimate exceeds the quota
/// left. Returning false aborts the run before any call is made.
pub trait Confirm {
    fn confirm(&mut self, estimate: &QuotaEstimate) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&QuotaEstimate) -> bool,
{
    fn confirm(&mut self, estimate: &QuotaEstimate) -> bool {
        self(estimate)
    }
}

/// Always gives the same answer
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _estimate: &QuotaEstimate) -> bool {
        self.0
    }
}
