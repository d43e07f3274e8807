//! CSS selectors shared by the archive page parsers
//!
//! NHC archive pages are plain table layouts, so a handful of element
//! selectors covers every generation from 1998 onward.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    pub static ref ANCHOR: Selector = parse_selector!("a[href]");
    pub static ref TABLE: Selector = parse_selector!("table");
    pub static ref ROW: Selector = parse_selector!("tr");
    pub static ref HEADER_CELL: Selector = parse_selector!("th");
    pub static ref HEADER_CELL_WITH_ID: Selector = parse_selector!("th[id]");
    pub static ref DATA_CELL: Selector = parse_selector!("td");
    pub static ref DATA_CELL_WITH_HEADERS: Selector = parse_selector!("td[headers]");
    pub static ref PRE: Selector = parse_selector!("pre");
}
