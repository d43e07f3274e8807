//! Year index page parsing with multi-layout support
//!
//! The NHC archive published its yearly storm lists in several table
//! generations. Each generation is a [`PageLayout`] variant with its own
//! [`ParsePage`] implementation; [`parse_year_page`] detects the layout and
//! falls back from the 2008+ layout to the legacy ones when it yields nothing.
//!
//! | Layout             | Years       | Basin source                         |
//! |--------------------|-------------|--------------------------------------|
//! | `AtcfIndex`        | 2008+       | `<!-- atcf_index=al01 -->` comments  |
//! | `HeadersAttribute` | some legacy | `<td headers="ep">` cells            |
//! | `ColumnHeaders`    | 1998-2007   | header row text, per column          |

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

use crate::models::{Basin, CycloneRecord, PageFormat};
use crate::parser::selectors::{
    ANCHOR, DATA_CELL, DATA_CELL_WITH_HEADERS, HEADER_CELL, HEADER_CELL_WITH_ID, ROW, TABLE,
};
use crate::utils::normalize_whitespace;

/// Inputs shared by every layout parser
pub struct PageContext<'a> {
    /// Archive year the page lists
    pub year: i32,
    /// URL the page was fetched from, used to resolve relative links
    pub page_url: &'a Url,
}

/// Extract the cyclones listed on a year index page
pub trait ParsePage {
    fn parse(&self, document: &Html, ctx: &PageContext<'_>) -> Vec<CycloneRecord>;
}

/// Known year index page generations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    AtcfIndex,
    HeadersAttribute,
    ColumnHeaders,
}

impl PageLayout {
    fn parser(&self) -> &'static dyn ParsePage {
        match self {
            PageLayout::AtcfIndex => &AtcfIndexParser,
            PageLayout::HeadersAttribute => &HeadersAttributeParser,
            PageLayout::ColumnHeaders => &ColumnHeadersParser,
        }
    }
}

impl std::fmt::Display for PageLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageLayout::AtcfIndex => write!(f, "AtcfIndex"),
            PageLayout::HeadersAttribute => write!(f, "HeadersAttribute"),
            PageLayout::ColumnHeaders => write!(f, "ColumnHeaders"),
        }
    }
}

/// Detect the layout of a year index page
#[must_use]
pub fn detect_layout(document: &Html) -> PageLayout {
    let has_atcf_marker = document.tree.root().descendants().any(|node| {
        node.value()
            .as_comment()
            .is_some_and(|comment| comment.contains("atcf_index="))
    });

    if has_atcf_marker {
        PageLayout::AtcfIndex
    } else {
        detect_legacy_layout(document)
    }
}

fn detect_legacy_layout(document: &Html) -> PageLayout {
    if document.select(&DATA_CELL_WITH_HEADERS).next().is_some() {
        PageLayout::HeadersAttribute
    } else {
        PageLayout::ColumnHeaders
    }
}

/// Parse a year index page into cyclone records, in discovery order
///
/// Legacy layouts are only consulted when the `atcf_index` layout finds
/// nothing, so a page carrying stray markers still gets a legacy pass.
pub fn parse_year_page(html: &str, year: i32, page_url: &Url) -> Vec<CycloneRecord> {
    let document = Html::parse_document(html);
    let ctx = PageContext { year, page_url };

    let layout = detect_layout(&document);
    let records = layout.parser().parse(&document, &ctx);

    if !records.is_empty() || layout != PageLayout::AtcfIndex {
        tracing::debug!(year, layout = %layout, count = records.len(), "Parsed year index");
        return records;
    }

    let legacy = detect_legacy_layout(&document);
    let records = legacy.parser().parse(&document, &ctx);
    tracing::debug!(year, layout = %legacy, count = records.len(), "Parsed year index");
    records
}

/// 2008+ pages: each storm link follows an `atcf_index` comment
pub struct AtcfIndexParser;

impl ParsePage for AtcfIndexParser {
    fn parse(&self, document: &Html, ctx: &PageContext<'_>) -> Vec<CycloneRecord> {
        let mut cyclones = Vec::new();

        for node in document.tree.root().descendants() {
            let Some(comment) = node.value().as_comment() else {
                continue;
            };
            let comment: &str = comment;
            let Some(caps) = atcf_index_re().captures(comment) else {
                continue;
            };
            let cyclone_id = caps[1].to_string();
            let basin_code = cyclone_id[..2].to_string();

            let anchor = node
                .next_siblings()
                .find(|sibling| {
                    sibling
                        .value()
                        .as_text()
                        .map_or(true, |text| !text.trim().is_empty())
                })
                .and_then(ElementRef::wrap)
                .filter(|element| element.value().name() == "a");

            let Some(anchor) = anchor else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(detail_url) = ctx.page_url.join(href) else {
                continue;
            };

            let full_name = normalize_whitespace(&anchor.text().collect::<String>());
            let name = strip_category_prefix(&full_name).to_uppercase();

            cyclones.push(CycloneRecord {
                id: cyclone_id,
                name,
                full_name,
                detail_url: detail_url.to_string(),
                format: PageFormat::New,
                basin: Basin::from_code(&basin_code).unwrap_or(Basin::Unknown),
                basin_code,
            });
        }

        cyclones
    }
}

/// Legacy pages whose cells name their basin column via `headers`
pub struct HeadersAttributeParser;

impl ParsePage for HeadersAttributeParser {
    fn parse(&self, document: &Html, ctx: &PageContext<'_>) -> Vec<CycloneRecord> {
        let mut cyclones = Vec::new();
        let mut current_basin = Basin::Atlantic;

        for cell in document.select(&DATA_CELL_WITH_HEADERS) {
            let headers = cell.value().attr("headers").unwrap_or_default();
            let first = headers.split_whitespace().next().unwrap_or_default();
            if let Some(basin) = Basin::from_code(first) {
                current_basin = basin;
            }

            collect_legacy_links(cell, current_basin, ctx, &mut cyclones);
        }

        cyclones
    }
}

/// Legacy pages with one basin per table column, named in a header row
pub struct ColumnHeadersParser;

impl ParsePage for ColumnHeadersParser {
    fn parse(&self, document: &Html, ctx: &PageContext<'_>) -> Vec<CycloneRecord> {
        let mut cyclones = Vec::new();

        for table in document.select(&TABLE) {
            let mut header_row: Option<Vec<ElementRef<'_>>> = None;
            let mut data_rows = Vec::new();

            for row in table.select(&ROW) {
                let mut headers: Vec<_> = row.select(&HEADER_CELL_WITH_ID).collect();
                if headers.is_empty() {
                    headers = row.select(&HEADER_CELL).collect();
                }

                if !headers.is_empty() {
                    header_row = Some(headers);
                } else if row.select(&DATA_CELL).next().is_some() {
                    data_rows.push(row);
                }
            }

            let Some(header_row) = header_row else {
                continue;
            };
            if data_rows.is_empty() {
                continue;
            }

            let basin_by_column = column_basins(&header_row);

            for row in data_rows {
                for (column, cell) in row.select(&DATA_CELL).enumerate() {
                    let basin = basin_by_column
                        .get(&column)
                        .copied()
                        .unwrap_or(Basin::Atlantic);
                    collect_legacy_links(cell, basin, ctx, &mut cyclones);
                }
            }
        }

        cyclones
    }
}

/// Map header cell positions to basins
///
/// An `id` naming a basin code wins; otherwise the header text decides,
/// checked in the order atlantic, pacific (without "east"), central pacific.
fn column_basins(header_row: &[ElementRef<'_>]) -> HashMap<usize, Basin> {
    let mut basins = HashMap::new();

    for (column, header) in header_row.iter().enumerate() {
        let id = header.value().attr("id").unwrap_or_default();
        if let Some(basin) = Basin::from_code(id) {
            basins.insert(column, basin);
            continue;
        }

        let text = header.text().collect::<String>().trim().to_lowercase();
        if text.contains("atlantic") {
            basins.insert(column, Basin::Atlantic);
        } else if text.contains("pacific") && !text.contains("east") {
            basins.insert(column, Basin::EastPacific);
        } else if text.contains("central") && text.contains("pacific") {
            basins.insert(column, Basin::CentralPacific);
        }
    }

    basins
}

/// A legacy storm page filename pattern
///
/// Year-prefixed patterns capture the year and the name; the year must
/// equal the page's archive year.
struct LegacyNamePattern {
    regex: Regex,
    year_prefixed: bool,
}

impl LegacyNamePattern {
    fn new(pattern: &str, year_prefixed: bool) -> Self {
        Self {
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
            year_prefixed,
        }
    }

    /// Storm name in `href`, if it matches for `year`
    fn storm_name(&self, href: &str, year: i32) -> Option<String> {
        if !self.year_prefixed {
            return self.regex.captures(href).map(|caps| caps[1].to_string());
        }

        let year = year.to_string();
        self.regex
            .captures_iter(href)
            .find(|caps| caps[1] == *year)
            .map(|caps| caps[2].to_string())
    }
}

lazy_static! {
    /// Filename patterns of legacy storm pages, in priority order
    ///
    /// - `1998ALEXadv.html` (1998)
    /// - `ARLENE.html` (1999-2002)
    /// - `2003ANA.shtml` (2003-2007)
    /// - `ANA.shtml`
    static ref LEGACY_NAME_PATTERNS: [LegacyNamePattern; 4] = [
        LegacyNamePattern::new(r"(\d{4})([A-Z]+)adv\.html", true),
        LegacyNamePattern::new(r"([A-Z]+)\.html", false),
        LegacyNamePattern::new(r"(\d{4})([A-Z]+)\.shtml", true),
        LegacyNamePattern::new(r"([A-Z]+)\.shtml", false),
    ];
}

/// Add every storm link inside `cell` not already discovered
fn collect_legacy_links(
    cell: ElementRef<'_>,
    basin: Basin,
    ctx: &PageContext<'_>,
    cyclones: &mut Vec<CycloneRecord>,
) {
    for pattern in LEGACY_NAME_PATTERNS.iter() {
        for link in cell.select(&ANCHOR) {
            let href = link.value().attr("href").unwrap_or_default();
            let Some(name) = pattern.storm_name(href, ctx.year) else {
                continue;
            };

            let id = format!("legacy_{}_{}", ctx.year, name.to_lowercase());
            if cyclones.iter().any(|c| c.id == id) {
                continue;
            }

            let Ok(detail_url) = ctx.page_url.join(href) else {
                continue;
            };

            cyclones.push(CycloneRecord {
                id,
                name,
                full_name: normalize_whitespace(&link.text().collect::<String>()),
                detail_url: detail_url.to_string(),
                format: PageFormat::Legacy,
                basin,
                basin_code: basin.code().to_string(),
            });
        }
    }
}

fn atcf_index_re() -> &'static Regex {
    static ATCF_INDEX_RE: OnceLock<Regex> = OnceLock::new();
    ATCF_INDEX_RE
        .get_or_init(|| Regex::new(r"atcf_index=([a-z]{2}\d{2})").expect("Invalid regex pattern"))
}

/// Drop a leading "Hurricane", "Tropical Storm" or "Tropical Depression"
pub fn strip_category_prefix(full_name: &str) -> &str {
    static PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX_RE.get_or_init(|| {
        Regex::new(r"^(?:Hurricane|Tropical Storm|Tropical Depression)\s+")
            .expect("Invalid regex pattern")
    });

    match re.find(full_name) {
        Some(prefix) => &full_name[prefix.end()..],
        None => full_name,
    }
}
