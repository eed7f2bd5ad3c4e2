//! Decoder for the line-oriented repository metadata format.
//!
//! Each archive entry is a UTF-8 text block of `%FIELD%` headers followed
//! by value lines:
//!
//! ```text
//! %NAME%
//! zlib
//!
//! %DEPENDS%
//! glibc
//! ```
//!
//! A header opens a field; every non-blank line until the next header is a
//! value line of that field. Blank lines are skipped, never terminators.
//! Every field decodes to an ordered sequence of strings; callers that
//! need a single value take the first element.

use thiserror::Error;

use crate::core::depend::{parse_constraint, parse_optdep};
use crate::core::PackageRecord;

/// Error decoding one metadata block. Local to a single entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` is not numeric: `{value}`")]
    NotNumeric { field: &'static str, value: String },
}

/// The raw fields of one metadata block, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    fields: Vec<(String, Vec<String>)>,
}

impl RawEntry {
    /// Decode a metadata block into its raw fields.
    pub fn decode(text: &str) -> RawEntry {
        let mut entry = RawEntry::default();
        let mut current: Option<usize> = None;

        for line in text.lines() {
            if line.len() >= 2 && line.starts_with('%') && line.ends_with('%') {
                let name = line[1..line.len() - 1].to_ascii_lowercase();
                current = Some(entry.field_index(&name));
            } else if line.trim().is_empty() {
                continue;
            } else if let Some(idx) = current {
                entry.fields[idx].1.push(line.to_string());
            }
        }

        entry
    }

    /// Encode the raw fields back into block form, one blank line between
    /// fields. `decode(encode(e)) == e` for any entry.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (name, values) in &self.fields {
            out.push('%');
            out.push_str(&name.to_ascii_uppercase());
            out.push_str("%\n");
            for value in values {
                out.push_str(value);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    /// Values of `field`, empty when the field is absent.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// First value of `field`, if any.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// Append a value line to `field`, declaring the field if needed.
    pub fn push_value(&mut self, field: &str, value: &str) {
        let idx = self.field_index(field);
        self.fields[idx].1.push(value.to_string());
    }

    /// Replace the values of `field` wholesale.
    pub fn set(&mut self, field: &str, values: Vec<String>) {
        let idx = self.field_index(field);
        self.fields[idx].1 = values;
    }

    /// Clone of this entry with `other`'s fields layered on top.
    pub fn overlay(&self, other: &RawEntry) -> RawEntry {
        let mut merged = self.clone();
        for (name, values) in &other.fields {
            merged.set(name, values.clone());
        }
        merged
    }

    /// Index of `field`, declaring it (empty) at the end if absent. A
    /// repeated header re-opens the existing field, so later value lines
    /// keep appending in order.
    fn field_index(&mut self, field: &str) -> usize {
        match self.fields.iter().position(|(name, _)| name == field) {
            Some(idx) => idx,
            None => {
                self.fields.push((field.to_string(), Vec::new()));
                self.fields.len() - 1
            }
        }
    }
}

/// Decode one metadata block into a package record.
pub fn decode_package(text: &str) -> Result<PackageRecord, DecodeError> {
    let raw = RawEntry::decode(text);

    Ok(PackageRecord {
        filename: Some(required(&raw, "filename")?.to_string()),
        name: required(&raw, "name")?.to_string(),
        base: required(&raw, "base")?.to_string(),
        version: required(&raw, "version")?.to_string(),
        desc: required(&raw, "desc")?.to_string(),
        csize: Some(required_numeric(&raw, "csize")?),
        isize: Some(required_numeric(&raw, "isize")?),
        url: Some(required(&raw, "url")?.to_string()),
        arch: Some(required(&raw, "arch")?.to_string()),
        builddate: Some(required_numeric(&raw, "builddate")? as i64),
        packager: Some(required(&raw, "packager")?.to_string()),
        md5sum: raw.first("md5sum").map(str::to_string),
        sha256sum: raw.first("sha256sum").map(str::to_string),
        pgpsig: raw.first("pgpsig").map(str::to_string),
        licenses: raw.get("license").to_vec(),
        conflicts: raw.get("conflicts").to_vec(),
        provides: raw.get("provides").to_vec(),
        replaces: raw.get("replaces").to_vec(),
        depends: raw.get("depends").iter().map(|s| parse_constraint(s)).collect(),
        makedepends: raw
            .get("makedepends")
            .iter()
            .map(|s| parse_constraint(s))
            .collect(),
        optdepends: raw.get("optdepends").iter().map(|s| parse_optdep(s)).collect(),
    })
}

fn required<'a>(raw: &'a RawEntry, field: &'static str) -> Result<&'a str, DecodeError> {
    raw.first(field).ok_or(DecodeError::MissingField { field })
}

fn required_numeric(raw: &RawEntry, field: &'static str) -> Result<u64, DecodeError> {
    let value = required(raw, field)?;
    value.parse().map_err(|_| DecodeError::NotNumeric {
        field,
        value: value.to_string(),
    })
}
