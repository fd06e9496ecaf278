//! Pagination parameter handling
//!
//! Pure functions that turn the string `per_page` and `page` query parameters of
//! a listing endpoint into a row offset and limit.

/// Default page size when `per_page` is empty
pub const DEFAULT_PER_PAGE: &str = "10";

/// Default page when `page` is empty
pub const DEFAULT_PAGE: &str = "1";

/// Error type for pagination operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// The named parameter is not an integer
    InvalidParameter(&'static str),
    /// `(page - 1) * per_page` does not fit in an `i64`
    Overflow,
}

impl std::fmt::Display for PaginationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaginationError::InvalidParameter(name) => {
                write!(f, "Invalid parameter {}: not an int", name)
            }
            PaginationError::Overflow => write!(f, "Invalid pagination: offset overflows"),
        }
    }
}

impl std::error::Error for PaginationError {}

/// Resolved pagination values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of rows to skip
    pub offset: i64,
    /// Number of rows per page
    pub per_page: i64,
    /// Page to show back to the user, never lower than 1
    pub page: i64,
}

fn parse_param(value: &str, default: &str, name: &'static str) -> Result<i64, PaginationError> {
    let value = if value.is_empty() { default } else { value };

    value
        .parse::<i64>()
        .map_err(|_| PaginationError::InvalidParameter(name))
}

/// Compute the offset, page size and display page from raw query parameters
///
/// # Arguments
/// * `per_page` - Page size, defaults to 10 when empty
/// * `page` - 1-based page number, defaults to 1 when empty
///
/// # Returns
/// The resolved [`Pagination`]. A page lower than 1 is treated as page 1.
/// [`PaginationError::Overflow`] when the offset is out of `i64` range.
pub fn compute_pagination(per_page: &str, page: &str) -> Result<Pagination, PaginationError> {
    let per_page = parse_param(per_page, DEFAULT_PER_PAGE, "per_page")?;
    let page = parse_param(page, DEFAULT_PAGE, "page")?.max(1);

    // page >= 1, so only the product can overflow
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or(PaginationError::Overflow)?;

    Ok(Pagination {
        offset,
        per_page,
        page,
    })
}
