//! Family closure traversal.
//!
//! The closure of a character is the character itself, all blood ancestors,
//! every descendant of those ancestors reached through sibling lines, and
//! all of the character's own descendants:
//!
//! ```text
//!            grandfather ── grandmother
//!                 │
//!       ┌─────────┴──────────┐
//!     father               uncle ──── (aunt by marriage: excluded)
//!       │                    │
//!   ┌───┴───┐             cousin
//!  self   sister
//!   │       │
//!  son    niece
//! ```
//!
//! Spouses are never traversed, so in-laws only appear if they are also
//! related by blood.
//!
//! The walk uses an explicit stack instead of recursion and keeps separate
//! upward and downward expansion guards. Each character is expanded at most
//! once in each direction, which bounds the work and terminates even when a
//! host graph contains a cycle.

use crate::host::FamilyRelations;
use crate::models::EntityId;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Deduplicated, insertion-ordered set of closure members.
///
/// The originating character is always the first member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyClosure {
    members: Vec<EntityId>,
    index: HashSet<EntityId>,
}

impl FamilyClosure {
    fn with_origin(origin: &EntityId) -> Self {
        let mut closure = Self {
            members: Vec::new(),
            index: HashSet::new(),
        };
        closure.insert(origin);
        closure
    }

    fn insert(&mut self, id: &EntityId) {
        if self.index.insert(id.clone()) {
            self.members.push(id.clone());
        }
    }

    /// The character the closure was computed for.
    #[must_use]
    pub fn origin(&self) -> &EntityId {
        &self.members[0]
    }

    /// Returns true if `id` is a member.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains(id)
    }

    /// Number of members, the origin included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; a closure contains at least its origin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates members in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.members.iter()
    }

    /// Members in visiting order.
    #[must_use]
    pub fn as_slice(&self) -> &[EntityId] {
        &self.members
    }
}

impl<'a> IntoIterator for &'a FamilyClosure {
    type Item = &'a EntityId;
    type IntoIter = std::slice::Iter<'a, EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

enum Step {
    /// Visit, then walk parents and each sibling's descendants.
    Up(EntityId),
    /// Visit, then walk children.
    Down(EntityId),
}

/// Computes the family closure of `origin`.
///
/// Visiting order is depth-first pre-order: the character, its paternal
/// line, its maternal line, sibling lines, then its own descendants. The
/// order only depends on the order the host reports relations in, so two
/// calls against the same host state return identical closures.
#[instrument(skip_all, fields(origin = %origin))]
pub fn family_closure<R>(relations: &R, origin: &EntityId) -> FamilyClosure
where
    R: FamilyRelations + ?Sized,
{
    let mut closure = FamilyClosure::with_origin(origin);
    let mut expanded_up: HashSet<EntityId> = HashSet::new();
    let mut expanded_down: HashSet<EntityId> = HashSet::new();

    // Popped in reverse: the upward walk runs to completion first.
    let mut stack = vec![Step::Down(origin.clone()), Step::Up(origin.clone())];

    while let Some(step) = stack.pop() {
        match step {
            Step::Up(id) => {
                if !expanded_up.insert(id.clone()) {
                    continue;
                }
                closure.insert(&id);

                let siblings = relations.siblings(&id);
                stack.extend(siblings.into_iter().rev().map(Step::Down));
                if let Some(mother) = relations.mother(&id) {
                    stack.push(Step::Up(mother));
                }
                if let Some(father) = relations.father(&id) {
                    stack.push(Step::Up(father));
                }
            },
            Step::Down(id) => {
                if !expanded_down.insert(id.clone()) {
                    continue;
                }
                closure.insert(&id);

                let children = relations.children(&id);
                stack.extend(children.into_iter().rev().map(Step::Down));
            },
        }
    }

    debug!(members = closure.len(), "computed family closure");
    closure
}
