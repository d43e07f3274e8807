//! HTML parsing for NHC archive pages
//!
//! This module turns fetched archive pages into structured records:
//! year index pages into [`CycloneRecord`](crate::models::CycloneRecord)s,
//! cyclone detail pages into advisory links, and product pages into
//! bulletin text.

pub mod advisory;
pub mod html;
pub mod selectors;
pub mod year_index;

pub use advisory::{empty_advisory_map, resolve_advisory_links};
pub use html::{classify_product, extract_pre_text, is_plain_text, ProductBody};
pub use year_index::{detect_layout, parse_year_page, PageLayout, ParsePage};
