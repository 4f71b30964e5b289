//! Reference resolution and display helpers shared by rendering and filtering.

#[cfg(test)]
#[path = "lookup_test.rs"]
mod lookup_test;

use std::borrow::Cow;

use crate::net::types::{AttendanceMark, ClassItem, ClassRef, PersonRef, Teacher};

/// Shown wherever an optional field has no value.
pub const PLACEHOLDER: &str = "-";
pub const NOT_ASSIGNED: &str = "Not assigned";

/// Name of the class `class_ref` points at.
///
/// Embedded references carry their own name. Bare identifiers are looked up
/// in the locally cached `classes`; when nothing matches, the identifier
/// itself is returned.
#[must_use]
pub fn resolve_class_name<'a>(class_ref: &'a ClassRef, classes: &'a [ClassItem]) -> Cow<'a, str> {
    match class_ref {
        ClassRef::Embedded(summary) => Cow::Borrowed(summary.name.as_str()),
        ClassRef::ById(id) => classes
            .iter()
            .find(|c| c.id.as_deref() == Some(id.as_str()))
            .map_or(Cow::Borrowed(id.as_str()), |c| Cow::Borrowed(c.name.as_str())),
    }
}

/// Class label for an optional reference; blank or absent references render
/// as [`PLACEHOLDER`].
#[must_use]
pub fn class_label<'a>(class_ref: Option<&'a ClassRef>, classes: &'a [ClassItem]) -> Cow<'a, str> {
    match class_ref {
        Some(r) if !r.id().is_empty() => resolve_class_name(r, classes),
        _ => Cow::Borrowed(PLACEHOLDER),
    }
}

/// `value` if present and non-blank, else [`PLACEHOLDER`].
#[must_use]
pub fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => PLACEHOLDER,
    }
}

/// Date part of an ISO timestamp (`2024-01-02T00:00:00Z` -> `2024-01-02`).
#[must_use]
pub fn date_only(value: &str) -> &str {
    value.split('T').next().unwrap_or(value)
}

/// Optional date rendered as its date part or [`PLACEHOLDER`].
#[must_use]
pub fn date_label(value: Option<&str>) -> &str {
    or_placeholder(value.map(date_only))
}

#[must_use]
pub fn attendance_label(marks: Option<&[AttendanceMark]>) -> String {
    match marks {
        Some(marks) if !marks.is_empty() => marks
            .iter()
            .map(|m| format!("{}:{}", date_only(&m.date), m.status))
            .collect::<Vec<_>>()
            .join(", "),
        _ => PLACEHOLDER.to_owned(),
    }
}

/// `Subject (Class), ...` for a teacher's assignments.
#[must_use]
pub fn subjects_label(teacher: &Teacher, classes: &[ClassItem]) -> String {
    match teacher.subjects.as_deref() {
        Some(subjects) if !subjects.is_empty() => subjects
            .iter()
            .map(|s| format!("{} ({})", s.subject_name, resolve_class_name(&s.class_id, classes)))
            .collect::<Vec<_>>()
            .join(", "),
        _ => PLACEHOLDER.to_owned(),
    }
}

/// Teacher name on a class subject, when the server embedded one.
#[must_use]
pub fn teacher_label(teacher: Option<&PersonRef>) -> &str {
    match teacher {
        Some(PersonRef::Embedded(p)) => &p.name,
        _ => NOT_ASSIGNED,
    }
}
