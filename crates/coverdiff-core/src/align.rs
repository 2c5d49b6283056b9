//! Category alignment between the two table summaries.
//!
//! Categories are joined on exact string equality of their names: no
//! trimming, no case folding. Keys are ordered by first appearance, left
//! table first, then the right table's names not already seen.
//!
//! If one table holds several categories with the same name, only the first
//! is paired. Later duplicates are unreachable under this key scheme and are
//! counted by [`AlignedComparison::shadowed`] so callers can report them.

use std::collections::HashSet;

use serde::Serialize;

use crate::{ComparisonResult, WarrantyCategory};

/// One aligned row: the categories from each table sharing `name`.
///
/// At least one of `left` / `right` is `Some`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedCategoryPair<'a> {
    pub name: &'a str,
    pub left: Option<&'a WarrantyCategory>,
    pub right: Option<&'a WarrantyCategory>,
}

impl AlignedCategoryPair<'_> {
    pub fn is_shared(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

/// The aligned view of a [`ComparisonResult`], borrowed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedComparison<'a> {
    pairs: Vec<AlignedCategoryPair<'a>>,
    shadowed: usize,
}

impl<'a> AlignedComparison<'a> {
    pub fn pairs(&self) -> &[AlignedCategoryPair<'a>] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlignedCategoryPair<'a>> {
        self.pairs.iter()
    }

    /// Number of categories hidden behind an earlier same-named category in
    /// the same table.
    pub fn shadowed(&self) -> usize {
        self.shadowed
    }

    pub fn into_pairs(self) -> Vec<AlignedCategoryPair<'a>> {
        self.pairs
    }
}

impl<'a> IntoIterator for &'a AlignedComparison<'a> {
    type Item = &'a AlignedCategoryPair<'a>;
    type IntoIter = std::slice::Iter<'a, AlignedCategoryPair<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Compute the aligned view. Pure: the same input always yields the same output.
pub fn align(result: &ComparisonResult) -> AlignedComparison<'_> {
    let left = &result.left.categories;
    let right = &result.right.categories;

    let mut seen: HashSet<&str> = HashSet::with_capacity(left.len() + right.len());
    let keys: Vec<&str> = left
        .iter()
        .chain(right.iter())
        .map(|c| c.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect();

    let pairs = keys
        .into_iter()
        .map(|name| AlignedCategoryPair {
            name,
            left: first_named(left, name),
            right: first_named(right, name),
        })
        .collect();

    AlignedComparison {
        pairs,
        shadowed: count_shadowed(left) + count_shadowed(right),
    }
}

fn first_named<'a>(
    categories: &'a [WarrantyCategory],
    name: &str,
) -> Option<&'a WarrantyCategory> {
    categories.iter().find(|c| c.name == name)
}

fn count_shadowed(categories: &[WarrantyCategory]) -> usize {
    let mut seen = HashSet::with_capacity(categories.len());
    categories
        .iter()
        .filter(|c| !seen.insert(c.name.as_str()))
        .count()
}
