//! Advisory link resolution for cyclone detail pages
//!
//! New-format pages link products as `{id}{year}.{kind}.{nnn}.shtml`.
//! Legacy pages are tried in two passes: ATCF-style filenames recovered
//! from the page body (2003 onward), then the per-product directories
//! `mar/`, `pub/`, `dis/` and `prb/` used before ATCF naming.

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use url::Url;

use crate::crawler::url::sequence_hint;
use crate::models::{AdvisoryLink, AdvisoryMap, CycloneRecord, PageFormat, ProductKind};
use crate::parser::selectors::ANCHOR;

/// First year whose legacy pages use ATCF product filenames
pub const FIRST_ATCF_FILENAME_YEAR: i32 = 2003;

/// Map with an empty list for every product kind
#[must_use]
pub fn empty_advisory_map() -> AdvisoryMap {
    ProductKind::all()
        .into_iter()
        .map(|kind| (kind, Vec::new()))
        .collect()
}

/// Resolve the product links on a cyclone's detail page
///
/// Every product kind is present in the result; each list is sorted by URL.
/// A product linked twice appears twice.
pub fn resolve_advisory_links(
    html: &str,
    cyclone: &CycloneRecord,
    year: i32,
    page_url: &Url,
) -> AdvisoryMap {
    let document = Html::parse_document(html);
    let hrefs: Vec<&str> = document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .collect();

    let mut advisories = match cyclone.format {
        PageFormat::New => new_format_links(&hrefs, &cyclone.id, year),
        PageFormat::Legacy => legacy_links(html, &hrefs, &cyclone.id, year),
    };

    let mut map = empty_advisory_map();
    for (kind, href) in advisories.drain(..) {
        let Ok(url) = page_url.join(href) else {
            tracing::debug!(href, "Skipping unresolvable advisory link");
            continue;
        };
        let url = url.to_string();
        map.entry(kind).or_default().push(AdvisoryLink {
            product_kind: kind,
            sequence_hint: sequence_hint(&url),
            url,
        });
    }

    for links in map.values_mut() {
        links.sort_by(|a, b| a.url.cmp(&b.url));
    }

    map
}

fn new_format_links<'a>(hrefs: &[&'a str], id: &str, year: i32) -> Vec<(ProductKind, &'a str)> {
    let id = regex::escape(id);
    let short_year = year.rem_euclid(100);

    let patterns: Vec<(ProductKind, Regex, Regex)> = ProductKind::all()
        .into_iter()
        .map(|kind| {
            let short = kind.short_name();
            let full = Regex::new(&format!(r"{id}{year}\.{short}\.\d{{3}}\.shtml"))
                .expect("Invalid regex pattern");
            let two_digit = Regex::new(&format!(r"{id}{short_year:02}\.{short}\.\d{{3}}\.shtml"))
                .expect("Invalid regex pattern");
            (kind, full, two_digit)
        })
        .collect();

    let mut links = Vec::new();
    for href in hrefs {
        for (kind, full, two_digit) in &patterns {
            if full.is_match(href) || two_digit.is_match(href) {
                links.push((*kind, *href));
            }
        }
    }
    links
}

fn legacy_links<'a>(
    html: &str,
    hrefs: &[&'a str],
    id: &str,
    year: i32,
) -> Vec<(ProductKind, &'a str)> {
    let atcf_id = if year >= FIRST_ATCF_FILENAME_YEAR {
        atcf_id_in_body(html).unwrap_or_else(|| id.to_string())
    } else {
        id.to_string()
    };

    let links = legacy_atcf_links(hrefs, &atcf_id, year);
    if !links.is_empty() {
        return links;
    }

    legacy_directory_links(hrefs)
}

/// Recover an `al01`-style storm id from a legacy page body
fn atcf_id_in_body(html: &str) -> Option<String> {
    static ATCF_ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = ATCF_ID_RE
        .get_or_init(|| Regex::new(r"(al|ep|cp)(\d{2})\d{4}").expect("Invalid regex pattern"));

    re.captures(html).map(|caps| format!("{}{}", &caps[1], &caps[2]))
}

fn legacy_atcf_links<'a>(hrefs: &[&'a str], id: &str, year: i32) -> Vec<(ProductKind, &'a str)> {
    let id = regex::escape(id);

    let patterns: Vec<(ProductKind, Vec<Regex>)> = ProductKind::all()
        .into_iter()
        .map(|kind| {
            let per_alias = kind
                .legacy_aliases()
                .iter()
                .map(|alias| {
                    Regex::new(&format!(
                        r"/archive/{year}/(?:[a-z]+|{id})/{id}{year}\.{alias}\.\d{{3}}\.shtml"
                    ))
                    .expect("Invalid regex pattern")
                })
                .collect();
            (kind, per_alias)
        })
        .collect();

    let mut links = Vec::new();
    for href in hrefs {
        for (kind, aliases) in &patterns {
            if aliases.iter().any(|re| re.is_match(href)) {
                links.push((*kind, *href));
            }
        }
    }
    links
}

fn legacy_directory_links<'a>(hrefs: &[&'a str]) -> Vec<(ProductKind, &'a str)> {
    static DIRECTORY_RES: OnceLock<Vec<(ProductKind, Regex)>> = OnceLock::new();
    let patterns = DIRECTORY_RES.get_or_init(|| {
        ProductKind::all()
            .into_iter()
            .map(|kind| {
                let re = Regex::new(&format!(
                    r"archive(?:/\d{{4}})?/{}/[A-Z]+\d+\.\d+(?:\.html)?",
                    kind.legacy_dir()
                ))
                .expect("Invalid regex pattern");
                (kind, re)
            })
            .collect()
    });

    let mut links = Vec::new();
    for href in hrefs {
        for (kind, re) in patterns {
            if re.is_match(href) {
                links.push((*kind, *href));
            }
        }
    }
    links
}
