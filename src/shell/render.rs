//! Plain-text rendering of collections for the terminal.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write;

use crate::net::types::{ClassItem, Principal, Student, Teacher};
use crate::state::lookup::{
    PLACEHOLDER, attendance_label, class_label, date_label, or_placeholder, subjects_label, teacher_label,
};
use crate::state::roster::{gender_tally, group_by_class};

/// Left-aligned columns separated by two spaces.
#[must_use]
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = table_line(headers.iter().copied(), &widths);
    for row in rows {
        out.push('\n');
        out.push_str(&table_line(row.iter().map(String::as_str), &widths));
    }
    out
}

fn table_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells.zip(widths).map(|(cell, &width)| format!("{cell:<width$}")).collect();
    padded.join("  ").trim_end().to_owned()
}

fn id_of(id: Option<&str>) -> String {
    or_placeholder(id).to_owned()
}

// =============================================================================
// CLASSES
// =============================================================================

#[must_use]
pub fn classes(items: &[&ClassItem]) -> String {
    if items.is_empty() {
        return "No classes found.".to_owned();
    }
    let mut out = String::new();
    for class in items {
        let _ = writeln!(out, "{} [{}]", class.name, id_of(class.id.as_deref()));
        if let Some(section) = class.section.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(out, "  Section: {section}");
        }
        if class.students.is_some() {
            let tally = gender_tally(class);
            let _ = writeln!(out, "  Total: {}, Boys: {}, Girls: {}", tally.total, tally.boys, tally.girls);
        }
        if let Some(subjects) = class.subject_teachers.as_deref().filter(|s| !s.is_empty()) {
            let labels: Vec<String> = subjects
                .iter()
                .map(|s| format!("{} ({})", s.subject_name, teacher_label(s.teacher_id.as_ref())))
                .collect();
            let _ = writeln!(out, "  Subjects: {}", labels.join(", "));
        }
    }
    out.trim_end().to_owned()
}

// =============================================================================
// STUDENTS
// =============================================================================

const STUDENT_HEADERS: &[&str] = &[
    "ID", "Name", "DOB", "Gender", "Class", "Roll No", "Father", "Mother", "Mobile", "WhatsApp", "Email", "Address",
    "Attendance",
];

fn student_row(student: &Student, classes: &[ClassItem]) -> Vec<String> {
    vec![
        id_of(student.id.as_deref()),
        student.name.clone(),
        date_label(student.dob.as_deref()).to_owned(),
        or_placeholder(student.gender.as_deref()).to_owned(),
        class_label(student.class.as_ref(), classes).into_owned(),
        student.roll_number.map_or_else(|| PLACEHOLDER.to_owned(), |n| n.to_string()),
        or_placeholder(student.father_name.as_deref()).to_owned(),
        or_placeholder(student.mother_name.as_deref()).to_owned(),
        or_placeholder(student.mobile_number.as_deref()).to_owned(),
        or_placeholder(student.whatsapp_number.as_deref()).to_owned(),
        or_placeholder(student.email.as_deref()).to_owned(),
        or_placeholder(student.address.as_deref()).to_owned(),
        attendance_label(student.attendance.as_deref()),
    ]
}

/// Students grouped under class headings, unassigned students last.
#[must_use]
pub fn students(items: &[&Student], classes: &[ClassItem]) -> String {
    if items.is_empty() {
        return "No students found.".to_owned();
    }
    let blocks: Vec<String> = group_by_class(items, classes)
        .into_iter()
        .map(|group| {
            let heading = group.class.map_or("Unassigned", |c| c.name.as_str());
            let rows: Vec<Vec<String>> = group.students.iter().map(|s| student_row(s, classes)).collect();
            format!("== {heading} ==\n{}", table(STUDENT_HEADERS, &rows))
        })
        .collect();
    blocks.join("\n\n")
}

// =============================================================================
// TEACHERS
// =============================================================================

const TEACHER_HEADERS: &[&str] =
    &["ID", "Name", "DOB", "Gender", "Email", "Mobile", "Address", "Qualifications", "Subjects"];

#[must_use]
pub fn teachers(items: &[&Teacher], classes: &[ClassItem]) -> String {
    if items.is_empty() {
        return "No teachers found.".to_owned();
    }
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|t| {
            vec![
                id_of(t.id.as_deref()),
                t.name.clone(),
                date_label(t.dob.as_deref()).to_owned(),
                or_placeholder(t.gender.as_deref()).to_owned(),
                or_placeholder(Some(t.email.as_str())).to_owned(),
                or_placeholder(t.mobile_number.as_deref()).to_owned(),
                or_placeholder(t.address.as_deref()).to_owned(),
                or_placeholder(t.qualifications.as_deref()).to_owned(),
                subjects_label(t, classes),
            ]
        })
        .collect();
    table(TEACHER_HEADERS, &rows)
}

#[must_use]
pub fn principal(principal: &Principal) -> String {
    format!("{} <{}> ({})", principal.name, principal.email, principal.role)
}
