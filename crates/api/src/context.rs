/// Who is performing the request, taken from the `x-changed-by` header.
///
/// Absent when the header is missing or blank; the mutator then falls back to
/// its configured default actor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorContext {
    actor: Option<String>,
}

impl ActorContext {
    pub fn new(actor: Option<String>) -> Self {
        Self {
            actor: actor.filter(|a| !a.trim().is_empty()),
        }
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_actor_is_absent() {
        assert_eq!(ActorContext::new(Some("  ".into())).actor(), None);
        assert_eq!(ActorContext::new(Some("alice".into())).actor(), Some("alice"));
        assert_eq!(ActorContext::default().actor(), None);
    }
}
