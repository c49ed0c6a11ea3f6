//! URL handling module for Page-Audit
//!
//! This module provides page URL normalization plus the small URL
//! inspections the check catalogue relies on (canonical comparison and
//! query/session parameter detection).

mod inspect;
mod normalize;

pub use inspect::{canonical_points_to, has_query, has_session_param};
pub use normalize::{normalize_page_url, strip_trailing_slash};
