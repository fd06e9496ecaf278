//! Core library for webhelpers
//!
//! This crate implements the **Functional Core** of the webhelpers workspace,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`webhelpers_core`** (this crate): Pure transformation functions with zero I/O
//! - **`webhelpers`**: HTTP exchange, mock server and vendor clients (the Imperative Shell)
//!
//! Everything here is deterministic. Functions that depend on time, such as URL
//! signing, take the current time as an argument.
//!
//! # Module Organization
//!
//! - [`tags`]: Select and match record fields by tag name
//! - [`order_by`]: ORDER BY clause construction from a sort field
//! - [`pagination`]: Offset and page size from `per_page`/`page` query parameters
//! - [`imagecompressor`]: Response shapes and parsers of image compression services
//! - [`cloudstorage`]: Public and V4 signed object URLs
//!
//! # Example Usage
//!
//! ```rust
//! use webhelpers_core::order_by::build_order_by;
//! use webhelpers_core::pagination::compute_pagination;
//! use webhelpers_core::tagged;
//!
//! struct User {
//!     id: String,
//!     name: String,
//! }
//!
//! tagged!(User {
//!     id => { json: "id", db: "id" },
//!     name => { json: "name", db: "name" },
//! });
//!
//! assert_eq!(build_order_by::<User>("-name", "db"), "name DESC");
//!
//! let page = compute_pagination("10", "0").unwrap();
//! assert_eq!((page.offset, page.per_page, page.page), (0, 10, 1));
//! ```

pub mod cloudstorage;
pub mod imagecompressor;
pub mod order_by;
pub mod pagination;
pub mod tags;
