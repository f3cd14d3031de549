//! `Problems`: the immutable, ordered list of problems a container carries.

use crate::problem::{IntoProblem, ProblemRef};
use std::fmt;
use std::sync::Arc;

/// An immutable ordered list of problems. Cloning is cheap; the backing
/// storage is shared.
///
/// The empty list needs no allocation, so `NO_PROBLEMS` is a constant.
#[derive(Clone, Default)]
pub struct Problems {
    items: Option<Arc<[ProblemRef]>>,
}

/// The canonical empty problem list.
pub const NO_PROBLEMS: Problems = Problems::NONE;

impl Problems {
    pub const NONE: Problems = Problems { items: None };

    /// Build a list from already-shared problems, keeping their order.
    #[must_use]
    pub fn from_vec(items: Vec<ProblemRef>) -> Self {
        if items.is_empty() {
            Self::NONE
        } else {
            Self {
                items: Some(items.into()),
            }
        }
    }

    /// A list of exactly one problem.
    #[must_use]
    pub fn single(problem: impl IntoProblem) -> Self {
        Self::from_vec(vec![problem.into_problem_ref()])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_none()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProblemRef> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ProblemRef] {
        match &self.items {
            Some(items) => items,
            None => &[],
        }
    }

    /// The local messages, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.iter().map(|p| p.local_message()).collect()
    }

    /// Copy the problems into a fresh vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<ProblemRef> {
        self.as_slice().to_vec()
    }

    /// True when both lists share the same backing storage (or are both empty).
    #[must_use]
    pub fn ptr_eq(&self, other: &Problems) -> bool {
        match (&self.items, &other.items) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for Problems {
    /// Problems compare pairwise: the same shared problem, or the same
    /// message and origin.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(a, b)| {
                Arc::ptr_eq(a, b)
                    || (a.local_message() == b.local_message() && a.origin() == b.origin())
            })
    }
}

impl fmt::Debug for Problems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for Problems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{problem}")?;
        }
        Ok(())
    }
}

impl From<Vec<ProblemRef>> for Problems {
    fn from(items: Vec<ProblemRef>) -> Self {
        Self::from_vec(items)
    }
}

impl<P: IntoProblem> FromIterator<P> for Problems {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().map(IntoProblem::into_problem_ref).collect())
    }
}

impl<'a> IntoIterator for &'a Problems {
    type Item = &'a ProblemRef;
    type IntoIter = std::slice::Iter<'a, ProblemRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
