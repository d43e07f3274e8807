//! Advisory product body extraction
//!
//! Advisory products are served either as bare text or as an HTML page
//! wrapping the bulletin in one or more `<pre>` blocks. The largest block
//! is the bulletin; smaller ones are navigation or headers.

use scraper::Html;

use crate::parser::selectors::PRE;

/// Markers whose presence marks a body as HTML
const HTML_MARKERS: [&str; 3] = ["<html", "<body", "<!doctype"];

/// Content to persist for one downloaded product
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductBody {
    /// Bulletin text, saved with a `.txt` suffix
    Text(String),
    /// Page with no usable `<pre>` content, saved verbatim as `.html`
    Html(String),
}

/// True when the body carries none of the HTML markers (case-insensitive)
#[must_use]
pub fn is_plain_text(body: &str) -> bool {
    let lowered = body.to_lowercase();
    !HTML_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Trimmed text of the largest `<pre>` block
///
/// Ties keep the earliest block. Returns `None` when the page has no
/// `<pre>` or the largest one is blank.
#[must_use]
pub fn extract_pre_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let mut largest: Option<String> = None;
    for pre in document.select(&PRE) {
        let text = pre.text().collect::<String>();
        let longer = largest
            .as_ref()
            .map_or(true, |current| text.chars().count() > current.chars().count());
        if longer {
            largest = Some(text);
        }
    }

    largest
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Decide what to persist for a fetched product body
#[must_use]
pub fn classify_product(body: String) -> ProductBody {
    if is_plain_text(&body) {
        return ProductBody::Text(body);
    }

    match extract_pre_text(&body) {
        Some(text) => ProductBody::Text(text),
        None => ProductBody::Html(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_detection() {
        assert!(is_plain_text("ZCZC MIATCMAT1 ALL\nTTAA00 KNHC"));
        assert!(!is_plain_text("<!DOCTYPE html><p>x</p>"));
        assert!(!is_plain_text("<HTML><BODY>x</BODY></HTML>"));
    }

    #[test]
    fn test_largest_pre_wins() {
        let html = r#"<html><body>
            <pre>nav</pre>
            <pre>
HURRICANE IRENE FORECAST/ADVISORY NUMBER   1
NWS TPC/NATIONAL HURRICANE CENTER MIAMI FL
</pre>
        </body></html>"#;

        let text = extract_pre_text(html).unwrap();
        assert!(text.starts_with("HURRICANE IRENE"));
        assert!(text.ends_with("MIAMI FL"));
    }

    #[test]
    fn test_blank_pre_is_none() {
        assert_eq!(extract_pre_text("<html><pre>   \n </pre></html>"), None);
        assert_eq!(extract_pre_text("<html><p>no pre</p></html>"), None);
    }

    #[test]
    fn test_classify_product() {
        assert_eq!(
            classify_product(String::from("BULLETIN")),
            ProductBody::Text(String::from("BULLETIN"))
        );
        assert_eq!(
            classify_product(String::from("<html><pre> TEXT </pre></html>")),
            ProductBody::Text(String::from("TEXT"))
        );
        let page = String::from("<html><body>moved</body></html>");
        assert_eq!(classify_product(page.clone()), ProductBody::Html(page));
    }
}
