//! DOM access for the mail adapters, on top of `scraper`.
//!
//! Text follows DOM `textContent`: every descendant text node concatenated,
//! entities already decoded by the parser. Runs of whitespace are collapsed.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::message::Link;

/// Parse a static CSS selector.
pub fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("valid static css selector")
}

/// First element matching any of `selectors`, tried in order over the whole
/// document.
pub fn first_match<'a>(doc: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| doc.select(s).next())
}

pub fn text_content(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Attribute value, `None` when absent or blank.
pub fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Every `<a href>` under `el`, in document order.
pub fn links(el: ElementRef<'_>) -> Vec<Link> {
    static ANCHOR: Lazy<Selector> = Lazy::new(|| css("a[href]"));
    el.select(&ANCHOR)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            Some(Link::new(text_content(a), href))
        })
        .collect()
}
