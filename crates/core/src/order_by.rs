//! ORDER BY clause construction
//!
//! Turns a user supplied sort field such as `-created_at` into a clause like
//! `created_at DESC`, accepting only fields the record exposes under the given tag.

use crate::tags::{match_by_tag, Tagged};

/// Sort direction of an ORDER BY clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split one leading `-` off `field`, returning the bare field and its direction.
pub fn parse_sort_field(field: &str) -> (&str, SortDirection) {
    match field.strip_prefix('-') {
        Some(rest) => (rest, SortDirection::Desc),
        None => (field, SortDirection::Asc),
    }
}

/// Build an ORDER BY clause for `field` against the `tag` values of `T`.
///
/// Returns an empty string when `field` is empty or does not match any tagged
/// field of `T`. Invalid sort fields are dropped silently, so an empty result
/// means "no ordering" to the caller.
pub fn build_order_by<T: Tagged + ?Sized>(field: &str, tag: &str) -> String {
    if field.is_empty() {
        return String::new();
    }

    let (field, direction) = parse_sort_field(field);

    let matched = match_by_tag::<T>(field, tag);
    if matched.is_empty() {
        return matched;
    }

    format!("{} {}", matched, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::fixtures::UserModel;

    #[test]
    fn test_build_order_by_asc() {
        assert_eq!(build_order_by::<UserModel>("id", "db"), "id ASC");
    }

    #[test]
    fn test_build_order_by_desc() {
        assert_eq!(
            build_order_by::<UserModel>("-created_at", "db"),
            "created_at DESC"
        );
    }

    #[test]
    fn test_build_order_by_empty_field() {
        assert_eq!(build_order_by::<UserModel>("", "db"), "");
    }

    #[test]
    fn test_build_order_by_unknown_field() {
        assert_eq!(build_order_by::<UserModel>("x", "db"), "");
        assert_eq!(build_order_by::<UserModel>("-x", "db"), "");
    }

    #[test]
    fn test_build_order_by_only_dash() {
        assert_eq!(build_order_by::<UserModel>("-", "db"), "");
    }

    #[test]
    fn test_build_order_by_strips_single_dash() {
        // "--id" leaves "-id", which is not a column
        assert_eq!(build_order_by::<UserModel>("--id", "db"), "");
    }

    #[test]
    fn test_build_order_by_skip_tag() {
        assert_eq!(build_order_by::<UserModel>("-", "json"), "");
        assert_eq!(build_order_by::<UserModel>("--", "json"), "");
    }

    #[test]
    fn test_parse_sort_field() {
        assert_eq!(parse_sort_field("name"), ("name", SortDirection::Asc));
        assert_eq!(parse_sort_field("-name"), ("name", SortDirection::Desc));
        assert_eq!(parse_sort_field("na-me"), ("na-me", SortDirection::Asc));
    }
}
