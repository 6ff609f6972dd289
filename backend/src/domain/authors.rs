//! Author reconciliation.
//!
//! Projects carry a free-text `authors_text` field such as `"Ana, Bruno"`.
//! Reconciliation resolves those names against registered identities and
//! produces the set of associated user ids. The function is pure: the same
//! text, identity snapshot, existing set, and mode always give the same
//! result.
//!
//! Matching is Unicode case-insensitive equality on the whole display name.
//! When several identities share a name, the first in snapshot order wins;
//! callers supply snapshots ordered by `display_name` then `id` so the choice
//! is stable.

use std::collections::BTreeSet;

use super::{DisplayName, UserId};

/// How the reconciled names combine with existing associations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Keep existing associations and add any matched names.
    Additive,
    /// Rebuild the set from the text alone.
    Replace,
}

/// `(id, display_name)` pair from the identity snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIdentity {
    pub id: UserId,
    pub display_name: DisplayName,
}

impl AuthorIdentity {
    pub fn new(id: UserId, display_name: DisplayName) -> Self {
        Self { id, display_name }
    }
}

/// Result of reconciling a project's author text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorReconciliation {
    /// Full association set after reconciliation.
    pub associations: BTreeSet<UserId>,
    /// Ids present in `associations` but absent from the input set.
    pub added: BTreeSet<UserId>,
    /// Candidate names with no matching identity, in text order.
    pub unmatched: Vec<String>,
}

/// Split author text on commas, trimming and dropping empty tokens.
///
/// Duplicates are kept; the association set deduplicates by id.
///
/// # Examples
/// ```
/// use catalog::domain::authors::split_author_names;
///
/// assert_eq!(split_author_names(" Ana ,, bruno,"), vec!["Ana", "bruno"]);
/// ```
pub fn split_author_names(authors_text: &str) -> Vec<&str> {
    authors_text
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

fn find_identity<'a>(name: &str, known: &'a [AuthorIdentity]) -> Option<&'a AuthorIdentity> {
    let wanted = name.to_lowercase();
    known
        .iter()
        .find(|identity| identity.display_name.as_ref().to_lowercase() == wanted)
}

/// Resolve `authors_text` against `known` identities.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use catalog::domain::authors::{reconcile_authors, AuthorIdentity, ReconcileMode};
/// use catalog::domain::{DisplayName, UserId};
///
/// let ana = UserId::random();
/// let known = vec![AuthorIdentity::new(ana, DisplayName::new("Ana").unwrap())];
/// let result = reconcile_authors("ana, Carlos", &known, &BTreeSet::new(), ReconcileMode::Additive);
/// assert!(result.associations.contains(&ana));
/// assert_eq!(result.unmatched, vec!["Carlos".to_owned()]);
/// ```
pub fn reconcile_authors(
    authors_text: &str,
    known: &[AuthorIdentity],
    existing: &BTreeSet<UserId>,
    mode: ReconcileMode,
) -> AuthorReconciliation {
    let mut associations = match mode {
        ReconcileMode::Additive => existing.clone(),
        ReconcileMode::Replace => BTreeSet::new(),
    };
    let mut unmatched = Vec::new();

    for name in split_author_names(authors_text) {
        match find_identity(name, known) {
            Some(identity) => {
                associations.insert(identity.id);
            }
            None => unmatched.push(name.to_owned()),
        }
    }

    let added = associations.difference(existing).copied().collect();
    AuthorReconciliation {
        associations,
        added,
        unmatched,
    }
}
