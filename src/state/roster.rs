//! Derived class rosters: students grouped by class and gender tallies.

#[cfg(test)]
#[path = "roster_test.rs"]
mod roster_test;

use crate::net::types::{ClassItem, Student};

/// Students sharing one class. `class` is `None` for the trailing group of
/// students whose class is not in the cache.
#[derive(Debug, PartialEq, Eq)]
pub struct ClassGroup<'a> {
    pub class: Option<&'a ClassItem>,
    pub students: Vec<&'a Student>,
}

/// Group `students` by class, following the order of `classes`.
///
/// Classes without students are omitted. Students with no class, or a class
/// missing from `classes`, are collected in a final group.
#[must_use]
pub fn group_by_class<'a>(students: &[&'a Student], classes: &'a [ClassItem]) -> Vec<ClassGroup<'a>> {
    let class_id_of = |s: &Student| s.class.as_ref().map(|r| r.id().to_owned());

    let mut groups: Vec<ClassGroup<'a>> = classes
        .iter()
        .filter_map(|class| {
            let id = class.id.as_deref()?;
            let members: Vec<&Student> =
                students.iter().copied().filter(|s| class_id_of(s).as_deref() == Some(id)).collect();
            (!members.is_empty()).then_some(ClassGroup { class: Some(class), students: members })
        })
        .collect();

    let unassigned: Vec<&Student> = students
        .iter()
        .copied()
        .filter(|s| match class_id_of(s) {
            Some(id) => !classes.iter().any(|c| c.id.as_deref() == Some(id.as_str())),
            None => true,
        })
        .collect();
    if !unassigned.is_empty() {
        groups.push(ClassGroup { class: None, students: unassigned });
    }
    groups
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenderTally {
    pub total: usize,
    pub boys: usize,
    pub girls: usize,
}

/// Count the students embedded in `class` by gender.
#[must_use]
pub fn gender_tally(class: &ClassItem) -> GenderTally {
    let members = class.students.as_deref().unwrap_or_default();
    let count = |gender: &str| members.iter().filter(|m| m.gender.as_deref() == Some(gender)).count();
    GenderTally { total: members.len(), boys: count("Male"), girls: count("Female") }
}
