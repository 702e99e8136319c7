/// Result of an exclusivity request. When `evicted` is set, the caller is
/// responsible for silencing that plugin (best effort).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub evicted: Option<String>,
}

/// Grants at most one plugin the right to be the active audio source.
///
/// Arbitration is advisory: a misbehaving plugin can still emit audio
/// without the token, but the state model and cooperating plugins agree on
/// one logical owner.
#[derive(Debug, Default)]
pub struct Arbiter {
    holder: Option<String>,
}

impl Arbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfer the token to `plugin_id`. Idempotent when the requester
    /// already holds it.
    pub fn request_exclusive(&mut self, plugin_id: &str) -> Grant {
        if self.holder.as_deref() == Some(plugin_id) {
            return Grant { evicted: None };
        }
        let evicted = self.holder.replace(plugin_id.to_string());
        if let Some(previous) = &evicted {
            tracing::debug!(from = %previous, to = %plugin_id, "exclusive playback transferred");
        }
        Grant { evicted }
    }

    /// Clear the token only if `plugin_id` is the current holder. A stale or
    /// late release must never evict a newer holder.
    pub fn release(&mut self, plugin_id: &str) -> bool {
        if self.holder.as_deref() == Some(plugin_id) {
            self.holder = None;
            true
        } else {
            false
        }
    }

    pub fn current_holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    pub fn is_holder(&self, plugin_id: &str) -> bool {
        self.holder.as_deref() == Some(plugin_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_most_one_holder() {
        let mut arbiter = Arbiter::new();
        assert!(arbiter.current_holder().is_none());

        arbiter.request_exclusive("a");
        assert_eq!(arbiter.current_holder(), Some("a"));

        let grant = arbiter.request_exclusive("b");
        assert_eq!(grant.evicted.as_deref(), Some("a"));
        assert_eq!(arbiter.current_holder(), Some("b"));
    }

    #[test]
    fn request_is_idempotent_for_holder() {
        let mut arbiter = Arbiter::new();
        arbiter.request_exclusive("a");
        let grant = arbiter.request_exclusive("a");
        assert_eq!(grant.evicted, None);
        assert_eq!(arbiter.current_holder(), Some("a"));
    }

    #[test]
    fn stale_release_is_a_no_op() {
        let mut arbiter = Arbiter::new();
        arbiter.request_exclusive("a");
        arbiter.request_exclusive("b");

        assert!(!arbiter.release("a"));
        assert_eq!(arbiter.current_holder(), Some("b"));

        assert!(arbiter.release("b"));
        assert!(arbiter.current_holder().is_none());
    }

    #[test]
    fn holder_survives_arbitrary_request_sequences() {
        let mut arbiter = Arbiter::new();
        for id in ["a", "b", "a", "c", "c", "b"] {
            arbiter.request_exclusive(id);
            assert_eq!(arbiter.current_holder(), Some(id));
        }
    }
}
