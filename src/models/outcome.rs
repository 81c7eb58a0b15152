//! Per-entity import outcomes.

/// Which attribute groups an import applied to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppliedGroups {
    /// Birth moment overwritten.
    pub birthday: bool,
    /// Lineage adopted.
    pub lineage: bool,
    /// Traits set or experience adjusted.
    pub traits: bool,
}

impl AppliedGroups {
    /// Returns true if no group was applied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.birthday && !self.lineage && !self.traits
    }

    /// Names of the applied groups, in birthday, lineage, traits order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.birthday, "birthday"),
            (self.lineage, "lineage"),
            (self.traits, "traits"),
        ]
        .into_iter()
        .filter_map(|(applied, name)| applied.then_some(name))
        .collect()
    }

    /// English enumeration of the applied groups, such as
    /// `birthday and traits`, or `None` when nothing applied.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        match self.names().as_slice() {
            [] => None,
            [only] => Some((*only).to_string()),
            [init @ .., last] => Some(format!("{} and {last}", init.join(", "))),
        }
    }
}

/// What happened to one entity during an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The entity has no record; nothing was attempted.
    RecordMissing,
    /// A value failed to convert; nothing was applied.
    ParseFailed {
        /// The offending key.
        key: String,
    },
    /// Parsing succeeded; these groups were applied.
    Applied(AppliedGroups),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(birthday: bool, lineage: bool, traits: bool) -> AppliedGroups {
        AppliedGroups {
            birthday,
            lineage,
            traits,
        }
    }

    #[test]
    fn test_describe_every_combination() {
        assert_eq!(groups(false, false, false).describe(), None);
        assert_eq!(groups(true, false, false).describe().as_deref(), Some("birthday"));
        assert_eq!(groups(false, true, false).describe().as_deref(), Some("lineage"));
        assert_eq!(groups(false, false, true).describe().as_deref(), Some("traits"));
        assert_eq!(
            groups(true, true, false).describe().as_deref(),
            Some("birthday and lineage")
        );
        assert_eq!(
            groups(true, false, true).describe().as_deref(),
            Some("birthday and traits")
        );
        assert_eq!(
            groups(false, true, true).describe().as_deref(),
            Some("lineage and traits")
        );
        assert_eq!(
            groups(true, true, true).describe().as_deref(),
            Some("birthday, lineage and traits")
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(AppliedGroups::default().is_empty());
        assert!(!groups(false, false, true).is_empty());
    }
}
