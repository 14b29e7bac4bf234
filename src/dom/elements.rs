//! Built-in element sets used by the `prose` preset.

use phf::phf_set;

use super::ElementData;

/// Elements whose content is never prose and must not be scanned.
pub static NON_PROSE_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "br",
    "hr",
    "script",
    "style",
    "img",
    "video",
    "audio",
    "canvas",
    "svg",
    "map",
    "object",
    "input",
    "textarea",
    "select",
    "option",
    "optgroup",
    "button",
};

/// Elements that break prose into separate runs. Matches never span one of these.
pub static NON_CONTIGUOUS_PROSE_ELEMENTS: phf::Set<&'static str> = phf_set! {
    // Block elements
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "nav",
    "noscript",
    "ol",
    "output",
    "p",
    "pre",
    "section",
    "ul",
    // Other misc. elements that are not part of continuous inline prose
    "br",
    "li",
    "summary",
    "dt",
    "details",
    "rp",
    "rt",
    "rtc",
    // Media / source elements
    "script",
    "style",
    "img",
    "video",
    "audio",
    "canvas",
    "svg",
    "map",
    "object",
    // Input elements
    "input",
    "textarea",
    "select",
    "option",
    "optgroup",
    "button",
    // Table related elements
    "table",
    "tbody",
    "thead",
    "th",
    "tr",
    "td",
    "caption",
    "col",
    "tfoot",
    "colgroup",
};

/// Element filter of the `prose` preset: false for elements whose text is not prose.
#[must_use]
pub fn is_prose_element(element: &ElementData) -> bool {
    !NON_PROSE_ELEMENTS.contains(element.name())
}

/// Context predicate of the `prose` preset: true for elements that end a run of prose.
#[must_use]
pub fn is_non_inline_prose(element: &ElementData) -> bool {
    NON_CONTIGUOUS_PROSE_ELEMENTS.contains(element.name())
}
