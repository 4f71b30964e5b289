//! Per-entity form rules: which fields can be edited, how values parse, and
//! what a record needs before it may be saved.
//!
//! Fields are addressed by their wire names (`mobileNumber`, `rollNumber`),
//! so a `field=value` pair from the command line maps onto the JSON the
//! server sees. A blank value clears an optional field.

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;

use crate::error::FieldError;
use crate::net::Resource;
use crate::net::types::{ClassItem, ClassRef, Student, SubjectAssignment, Teacher};
use crate::state::lookup::date_only;

/// A record that can be edited through an [`Editor`](super::draft::Editor).
pub trait Draft: Resource + Default + PartialEq {
    /// Wire names accepted by [`Draft::set_field`].
    const FIELDS: &'static [&'static str];

    /// Assign `value` to the field called `field`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown field or an unparsable value; the
    /// record is unchanged in that case.
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError>;

    /// # Errors
    ///
    /// Returns every validation message, in field order.
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Shape a server record for editing.
    #[must_use]
    fn prepare_for_edit(self) -> Self {
        self
    }
}

/// Split `field=value`. Only the first `=` separates.
///
/// # Errors
///
/// Returns [`FieldError::Malformed`] when there is no `=` or no field name.
pub fn parse_assignment(raw: &str) -> Result<(&str, &str), FieldError> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value)),
        _ => Err(FieldError::Malformed(raw.to_owned())),
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn unknown(noun: &'static str, field: &str) -> FieldError {
    FieldError::Unknown { noun, field: field.to_owned() }
}

fn require(value: &str, message: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(message.to_owned());
    }
}

fn into_result(errors: Vec<String>) -> Result<(), Vec<String>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// =============================================================================
// CLASS
// =============================================================================

impl Draft for ClassItem {
    const FIELDS: &'static [&'static str] = &["name", "section", "description"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError> {
        match field {
            "name" => self.name = value.trim().to_owned(),
            "section" => self.section = optional(value),
            "description" => self.description = optional(value),
            other => return Err(unknown(Self::NOUN, other)),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        require(&self.name, "Class name is required.", &mut errors);
        into_result(errors)
    }
}

// =============================================================================
// STUDENT
// =============================================================================

impl Draft for Student {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "photo",
        "dob",
        "gender",
        "address",
        "class",
        "section",
        "rollNumber",
        "fatherName",
        "motherName",
        "mobileNumber",
        "whatsappNumber",
        "email",
    ];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError> {
        match field {
            "name" => self.name = value.trim().to_owned(),
            "photo" => self.photo = optional(value),
            "dob" => self.dob = optional(value),
            "gender" => self.gender = optional(value),
            "address" => self.address = optional(value),
            "class" => self.class = optional(value).map(ClassRef::ById),
            "section" => self.section = optional(value),
            "rollNumber" => {
                self.roll_number = match optional(value) {
                    None => None,
                    Some(raw) => Some(raw.parse().map_err(|_| FieldError::InvalidValue {
                        field: "rollNumber",
                        value: raw,
                        expected: "a whole number",
                    })?),
                };
            }
            "fatherName" => self.father_name = optional(value),
            "motherName" => self.mother_name = optional(value),
            "mobileNumber" => self.mobile_number = optional(value),
            "whatsappNumber" => self.whatsapp_number = optional(value),
            "email" => self.email = optional(value),
            other => return Err(unknown(Self::NOUN, other)),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        require(&self.name, "Student name is required.", &mut errors);
        into_result(errors)
    }
}

// =============================================================================
// TEACHER
// =============================================================================

impl Draft for Teacher {
    const FIELDS: &'static [&'static str] =
        &["name", "photo", "dob", "gender", "email", "mobileNumber", "address", "qualifications"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError> {
        match field {
            "name" => self.name = value.trim().to_owned(),
            "photo" => self.photo = optional(value),
            "dob" => self.dob = optional(value),
            "gender" => self.gender = optional(value),
            "email" => self.email = value.trim().to_owned(),
            "mobileNumber" => self.mobile_number = optional(value),
            "address" => self.address = optional(value),
            "qualifications" => self.qualifications = optional(value),
            other => return Err(unknown(Self::NOUN, other)),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        require(&self.name, "Teacher name is required.", &mut errors);
        require(&self.email, "Teacher email is required.", &mut errors);
        into_result(errors)
    }

    /// Dates are edited as `YYYY-MM-DD` and class references as bare ids.
    fn prepare_for_edit(mut self) -> Self {
        self.dob = self.dob.as_deref().map(|d| date_only(d).to_owned());
        if let Some(subjects) = self.subjects.as_mut() {
            for subject in subjects {
                subject.class_id = subject.class_id.flattened();
            }
        }
        self
    }
}

impl Teacher {
    /// Add a subject for `class_id`. Both parts are required; returns whether
    /// anything was added.
    pub fn add_subject(&mut self, class_id: &str, subject_name: &str) -> bool {
        let (class_id, subject_name) = (class_id.trim(), subject_name.trim());
        if class_id.is_empty() || subject_name.is_empty() {
            return false;
        }
        self.subjects.get_or_insert_with(Vec::new).push(SubjectAssignment {
            class_id: ClassRef::ById(class_id.to_owned()),
            subject_name: subject_name.to_owned(),
        });
        true
    }

    /// Remove the subject at `index`; out-of-range indexes are ignored.
    pub fn remove_subject(&mut self, index: usize) -> bool {
        match self.subjects.as_mut() {
            Some(subjects) if index < subjects.len() => {
                subjects.remove(index);
                true
            }
            _ => false,
        }
    }
}

/// Parse `CLASS_ID:SUBJECT` into its parts.
///
/// # Errors
///
/// Returns [`FieldError::Malformed`] when there is no `:`.
pub fn parse_subject(raw: &str) -> Result<(&str, &str), FieldError> {
    raw.split_once(':').ok_or_else(|| FieldError::Malformed(raw.to_owned()))
}
