//! Search-text filtering over cached collections.
//!
//! Filtering is a pure projection: it borrows from the collection and never
//! reorders or mutates it.

#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;

use std::borrow::Cow;

use super::lookup::resolve_class_name;
use crate::net::types::{ClassItem, Student, Teacher};

/// A record that can be matched against free-text search.
pub trait Searchable {
    /// Text fields the needle is matched against. `classes` is the cached
    /// class collection, for records that reference a class.
    fn search_fields<'a>(&'a self, classes: &'a [ClassItem]) -> Vec<Cow<'a, str>>;
}

impl Searchable for ClassItem {
    fn search_fields<'a>(&'a self, _classes: &'a [ClassItem]) -> Vec<Cow<'a, str>> {
        let mut fields = vec![Cow::Borrowed(self.name.as_str())];
        fields.extend(self.section.as_deref().map(Cow::Borrowed));
        fields
    }
}

impl Searchable for Student {
    fn search_fields<'a>(&'a self, classes: &'a [ClassItem]) -> Vec<Cow<'a, str>> {
        let mut fields = vec![Cow::Borrowed(self.name.as_str())];
        fields.extend(self.section.as_deref().map(Cow::Borrowed));
        fields.extend(self.class.as_ref().map(|r| resolve_class_name(r, classes)));
        fields
    }
}

impl Searchable for Teacher {
    fn search_fields<'a>(&'a self, _classes: &'a [ClassItem]) -> Vec<Cow<'a, str>> {
        vec![Cow::Borrowed(self.name.as_str())]
    }
}

/// Case-insensitive substring match of `needle` against any search field.
/// A blank needle matches everything.
#[must_use]
pub fn matches<R: Searchable>(record: &R, needle: &str, classes: &[ClassItem]) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || matches_lowered(record, &needle, classes)
}

fn matches_lowered<R: Searchable>(record: &R, needle: &str, classes: &[ClassItem]) -> bool {
    record.search_fields(classes).iter().any(|field| field.to_lowercase().contains(needle))
}

/// Records of `items` matching `needle`, in collection order.
#[must_use]
pub fn filter_view<'a, R: Searchable>(items: &'a [R], needle: &str, classes: &[ClassItem]) -> Vec<&'a R> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|r| matches_lowered(*r, &needle, classes)).collect()
}
