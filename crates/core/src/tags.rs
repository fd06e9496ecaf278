//! Field tag inspection
//!
//! Pure functions that select or match record fields by an external tag name
//! (for example the `db` column name of a persisted record). Each record type
//! exposes a static table of its fields in declaration order through the
//! [`Tagged`] trait, usually generated with the [`tagged!`](crate::tagged) macro.
//!
//! Both operations are permissive: a value that matches nothing yields an empty
//! result instead of an error. Callers cannot tell "unknown field" apart from
//! "field excluded with `-`", so they must check for emptiness themselves.

use std::collections::HashSet;

/// Tag value that excludes a field from selection and matching.
pub const SKIP: &str = "-";

/// Tag metadata for a single record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTags {
    pub name: &'static str,
    pub tags: &'static [(&'static str, &'static str)],
}

impl FieldTags {
    /// Look up the value of `tag` on this field.
    pub fn lookup(&self, tag: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, value)| *value)
    }
}

/// A record type whose fields carry tags.
pub trait Tagged {
    /// Fields of the record in declaration order.
    fn fields() -> &'static [FieldTags];
}

/// Implement [`Tagged`] for a record from a field/tag listing.
///
/// ```rust
/// use webhelpers_core::tagged;
///
/// struct User {
///     id: String,
///     name: String,
/// }
///
/// tagged!(User {
///     id => { json: "id", db: "id" },
///     name => { json: "name", db: "full_name" },
/// });
/// ```
#[macro_export]
macro_rules! tagged {
    ($ty:ty { $($field:ident => { $($tag:ident : $value:literal),* $(,)? }),* $(,)? }) => {
        impl $crate::tags::Tagged for $ty {
            fn fields() -> &'static [$crate::tags::FieldTags] {
                &[$(
                    $crate::tags::FieldTags {
                        name: stringify!($field),
                        tags: &[$((stringify!($tag), $value)),*],
                    }
                ),*]
            }
        }
    };
}

/// Build the filter set from a comma separated list, ignoring whitespace.
fn parse_filter(allowed: &str) -> HashSet<String> {
    let compact: String = allowed.chars().filter(|c| !c.is_whitespace()).collect();

    compact.split(',').map(str::to_string).collect()
}

/// Select the `tag` values of `fields` that appear in the comma separated `allowed` list.
///
/// Values come out in field declaration order. The `-` value is never returned.
pub fn select_in_fields(fields: &[FieldTags], allowed: &str, tag: &str) -> Vec<String> {
    let filter = parse_filter(allowed);

    fields
        .iter()
        .filter_map(|field| field.lookup(tag))
        .filter(|value| *value != SKIP && filter.contains(*value))
        .map(str::to_string)
        .collect()
}

/// Find the `tag` value of `fields` equal to `value`.
///
/// Every field is scanned and the last match wins. Returns an empty string when
/// nothing matches or when `value` is `-`.
pub fn match_in_fields(fields: &[FieldTags], value: &str, tag: &str) -> String {
    let mut out = String::new();

    for found in fields.iter().filter_map(|field| field.lookup(tag)) {
        if found == value && found != SKIP {
            out = found.to_string();
        }
    }

    out
}

/// [`select_in_fields`] over the fields of `T`.
pub fn select_by_tag<T: Tagged + ?Sized>(allowed: &str, tag: &str) -> Vec<String> {
    select_in_fields(T::fields(), allowed, tag)
}

/// [`match_in_fields`] over the fields of `T`.
pub fn match_by_tag<T: Tagged + ?Sized>(value: &str, tag: &str) -> String {
    match_in_fields(T::fields(), value, tag)
}
