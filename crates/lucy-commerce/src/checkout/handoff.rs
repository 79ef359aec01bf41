//! One-shot handoff of the order summary to the confirmation view.

use lucy_cache::Cache;
use tracing::warn;

use crate::checkout::OrderSummary;
use crate::CommerceError;

/// Default cache slot for the last order.
pub const DEFAULT_LAST_ORDER_KEY: &str = "lastOrder";

/// A read-once slot holding the most recent [`OrderSummary`].
#[derive(Debug, Clone)]
pub struct OrderHandoff {
    cache: Cache,
    key: String,
}

impl OrderHandoff {
    pub fn new(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    /// Store `summary`, replacing any previous one.
    pub fn write(&self, summary: &OrderSummary) -> Result<(), CommerceError> {
        self.cache.set(&self.key, summary)?;
        Ok(())
    }

    /// Read the summary and delete the slot.
    ///
    /// `None` when nothing was handed off or the slot was unreadable; the
    /// confirmation view then sends the shopper home.
    pub fn take(&self) -> Option<OrderSummary> {
        match self.cache.take(&self.key) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding unreadable order summary");
                None
            }
        }
    }
}
