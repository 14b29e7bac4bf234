//! Shared helpers for the domfind test suite

use kodegen_tools_domfind::{Document, ElementData, NodeId};
use proptest::prelude::*;

/// A document shape built directly into the arena, bypassing the HTML parser
/// so that adjacent and empty text nodes survive.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Shape {
    Text(String),
    Element(&'static str, Vec<Shape>),
}

/// Small trees over a two-letter alphabet, mixing inline, block and filtered tags.
#[allow(dead_code)]
pub fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = "[ab ]{0,4}".prop_map(Shape::Text);
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            prop::sample::select(vec!["b", "em", "span", "p", "div", "script"]),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, children)| Shape::Element(tag, children))
    })
}

/// Build `shapes` under a fresh `<div>` and return the document and that root.
#[allow(dead_code)]
pub fn build_document(shapes: &[Shape]) -> (Document, NodeId) {
    let mut doc = Document::new();
    let doc_root = doc.root();
    let root = doc
        .append_element(doc_root, ElementData::new("div"))
        .expect("document root exists");
    for shape in shapes {
        append_shape(&mut doc, root, shape);
    }
    (doc, root)
}

#[allow(dead_code)]
fn append_shape(doc: &mut Document, parent: NodeId, shape: &Shape) {
    match shape {
        Shape::Text(text) => {
            doc.append_text(parent, text.clone()).expect("parent exists");
        }
        Shape::Element(tag, children) => {
            let id = doc
                .append_element(parent, ElementData::new(*tag))
                .expect("parent exists");
            for child in children {
                append_shape(doc, id, child);
            }
        }
    }
}

/// Creates a small article used by the batch tests.
#[allow(dead_code)]
pub fn create_article_html() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>Triangles</title></head>
<body>
<div id="content">
<h1>Pythagoras</h1>
<p>Pythagoras proved it around 530 BC. In 1907 a proof by <em>Pytha</em>goras was cited again.</p>
<script>var Pythagoras = 1;</script>
</div>
<p id="footer">Pythagoras</p>
</body>
</html>"#
        .to_string()
}
