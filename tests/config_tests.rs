//! Tests for the type-safe options builder

use kodegen_tools_domfind::{
    Document, ElementData, FinderOptions, ForceContext, PortionMode, Preset, Replacement, Wrap,
    find_and_replace,
};

#[test]
fn test_builder_requires_pattern() {
    // This should not compile if uncommented - no pattern given
    // let options = FinderOptions::builder().wrap("span").build();

    // This SHOULD compile - pattern provided
    let options = FinderOptions::builder()
        .find("needle")
        .build()
        .unwrap();

    assert!(matches!(options.replacement(), Replacement::Template(t) if t == "$&"));
}

#[test]
fn test_builder_optional_fields_have_defaults() {
    let options = FinderOptions::builder().find("needle").build().unwrap();

    assert!(options.wrap().is_none());
    assert_eq!(options.wrap_class(), None);
    assert_eq!(options.portion_mode(), PortionMode::Retain);
    assert!(options.accepts(&ElementData::new("script")));
    assert!(!options.forces_context(&ElementData::new("div")));
}

#[test]
fn test_builder_with_all_optional_fields() {
    let options = FinderOptions::builder()
        .find("needle")
        .replace("<$&>")
        .wrap("mark")
        .wrap_class("hit")
        .portion_mode(PortionMode::First)
        .filter_elements(|el| el.name() != "code")
        .force_context(ForceContext::All)
        .build()
        .unwrap();

    assert!(matches!(options.replacement(), Replacement::Template(t) if t == "<$&>"));
    assert!(matches!(options.wrap(), Some(Wrap::Tag(tag)) if tag == "mark"));
    assert_eq!(options.wrap_class(), Some("hit"));
    assert_eq!(options.portion_mode(), PortionMode::First);
    assert!(!options.accepts(&ElementData::new("code")));
    assert!(options.forces_context(&ElementData::new("em")));
}

#[test]
fn test_builder_field_override() {
    // Later calls replace earlier ones
    let options = FinderOptions::builder()
        .find("needle")
        .wrap("b")
        .wrap("i")
        .portion_mode(PortionMode::First)
        .portion_mode(PortionMode::Retain)
        .build()
        .unwrap();

    assert!(matches!(options.wrap(), Some(Wrap::Tag(tag)) if tag == "i"));
    assert_eq!(options.portion_mode(), PortionMode::Retain);
}

#[test]
fn test_prose_preset_keeps_explicit_context() {
    let options = FinderOptions::builder()
        .find("ab")
        .wrap("span")
        .force_context(false)
        .preset(Preset::Prose)
        .build()
        .unwrap();

    // Filter comes from the preset, context stays off
    assert!(!options.accepts(&ElementData::new("style")));
    assert!(!options.forces_context(&ElementData::new("p")));

    let mut doc = Document::parse_fragment("<p>a</p><p>b</p><style>ab</style>");
    let finder = find_and_replace(&mut doc, &options).unwrap();
    assert_eq!(finder.matches().len(), 1);
    assert_eq!(
        doc.to_html(),
        "<p><span>a</span></p><p><span>b</span></p><style>ab</style>"
    );
}

#[test]
fn test_context_predicate_from_builder() {
    let options = FinderOptions::builder()
        .find("ab")
        .force_context_when(|el| el.attr("data-break").is_some())
        .build()
        .unwrap();

    let mut doc = Document::parse_fragment(r#"<p>a<i data-break="">b</i></p><p>a<i>b</i></p>"#);
    let finder = find_and_replace(&mut doc, &options).unwrap();
    assert_eq!(finder.matches().len(), 1);
    assert_eq!(finder.matches()[0].start_index(), 2);
}
