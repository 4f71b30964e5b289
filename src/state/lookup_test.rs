use super::*;
use crate::net::types::{ClassSummary, PersonSummary, SubjectAssignment};

fn classes() -> Vec<ClassItem> {
    vec![
        ClassItem { id: Some("c1".into()), name: "Grade 1".into(), ..ClassItem::default() },
        ClassItem { id: Some("c2".into()), name: "Grade 2".into(), ..ClassItem::default() },
    ]
}

// =============================================================
// resolve_class_name
// =============================================================

#[test]
fn embedded_reference_uses_its_own_name() {
    let r = ClassRef::Embedded(ClassSummary { id: "c9".into(), name: "Grade 9".into(), section: None });
    assert_eq!(resolve_class_name(&r, &classes()), "Grade 9");
}

#[test]
fn bare_id_is_looked_up_in_cache() {
    let r = ClassRef::ById("c2".into());
    assert_eq!(resolve_class_name(&r, &classes()), "Grade 2");
}

#[test]
fn unknown_id_falls_back_to_raw_identifier() {
    let r = ClassRef::ById("c404".into());
    assert_eq!(resolve_class_name(&r, &classes()), "c404");
}

#[test]
fn class_label_of_absent_or_blank_is_dash() {
    assert_eq!(class_label(None, &classes()), PLACEHOLDER);
    let blank = ClassRef::ById(String::new());
    assert_eq!(class_label(Some(&blank), &classes()), PLACEHOLDER);
}

// =============================================================
// placeholders and dates
// =============================================================

#[test]
fn or_placeholder_handles_none_and_blank() {
    assert_eq!(or_placeholder(None), "-");
    assert_eq!(or_placeholder(Some("  ")), "-");
    assert_eq!(or_placeholder(Some("Lagos")), "Lagos");
}

#[test]
fn date_only_strips_time() {
    assert_eq!(date_only("2012-05-06T00:00:00.000Z"), "2012-05-06");
    assert_eq!(date_only("2012-05-06"), "2012-05-06");
    assert_eq!(date_label(None), "-");
}

#[test]
fn attendance_label_joins_marks() {
    let marks = vec![
        AttendanceMark { date: "2024-01-02T00:00:00Z".into(), status: "present".into() },
        AttendanceMark { date: "2024-01-03T00:00:00Z".into(), status: "absent".into() },
    ];
    assert_eq!(attendance_label(Some(&marks)), "2024-01-02:present, 2024-01-03:absent");
    assert_eq!(attendance_label(Some(&[])), "-");
    assert_eq!(attendance_label(None), "-");
}

// =============================================================
// teachers
// =============================================================

#[test]
fn subjects_label_resolves_each_class() {
    let teacher = Teacher {
        name: "Lee".into(),
        subjects: Some(vec![
            SubjectAssignment { class_id: ClassRef::ById("c1".into()), subject_name: "Math".into() },
            SubjectAssignment {
                class_id: ClassRef::Embedded(ClassSummary { id: "c7".into(), name: "Grade 7".into(), section: None }),
                subject_name: "Art".into(),
            },
            SubjectAssignment { class_id: ClassRef::ById("gone".into()), subject_name: "PE".into() },
        ]),
        ..Teacher::default()
    };
    assert_eq!(subjects_label(&teacher, &classes()), "Math (Grade 1), Art (Grade 7), PE (gone)");
}

#[test]
fn subjects_label_without_subjects_is_dash() {
    assert_eq!(subjects_label(&Teacher::default(), &classes()), "-");
}

#[test]
fn teacher_label_needs_embedded_name() {
    let embedded = PersonRef::Embedded(PersonSummary { id: "t1".into(), name: "Mr. Lee".into() });
    assert_eq!(teacher_label(Some(&embedded)), "Mr. Lee");
    assert_eq!(teacher_label(Some(&PersonRef::ById("t1".into()))), NOT_ASSIGNED);
    assert_eq!(teacher_label(None), NOT_ASSIGNED);
}
