use super::Error;
use scraper::{ElementRef, Selector};

/// First element under `element` matching `selector`; `label` names what was looked for
/// in the error.
pub fn element_from_selection<'a>(
    selector: &Selector,
    element: ElementRef<'a>,
    label: &str,
) -> Result<ElementRef<'a>, Error> {
    element
        .select(selector)
        .next()
        .ok_or_else(|| Error::html_parse_error(&format!("Could not find the {label}.")))
}

/// All text under the element, as `textContent` would give it.
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Direct child elements with one of the given tag names.
pub fn child_elements<'a>(
    element: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| names.contains(&child.value().name()))
}
