//! Hardcoded non-functional representatives.
//!
//! Ids listed here are always classified as non-functional, whatever the
//! user's known list says about them.

use std::collections::HashSet;

use repwatch_types::RepAddress;

/// Representatives shipped as known-bad. Currently empty.
const NON_FUNCTIONAL_REPRESENTATIVES: &[&str] = &[];

#[derive(Clone, Debug, Default)]
pub struct Blocklist {
    ids: HashSet<RepAddress>,
}

impl Blocklist {
    /// The list shipped with the monitor.
    pub fn builtin() -> Self {
        Self::new(NON_FUNCTIONAL_REPRESENTATIVES.iter().copied().map(RepAddress::from))
    }

    pub fn new(ids: impl IntoIterator<Item = RepAddress>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Exact id match.
    pub fn contains(&self, id: &RepAddress) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_empty() {
        assert!(Blocklist::builtin().is_empty());
    }

    #[test]
    fn contains_is_exact() {
        let list = Blocklist::new([RepAddress::new("ban_1bad")]);
        assert!(list.contains(&RepAddress::new("ban_1bad")));
        assert!(!list.contains(&RepAddress::new("ban_1BAD")));
        assert!(!list.contains(&RepAddress::new("ban_1good")));
        assert_eq!(list.len(), 1);
    }
}
