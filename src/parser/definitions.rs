use std::sync::LazyLock;

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Inline elements Javadoc wraps around a definition anchor.
const INLINE_WRAPPERS: &[&str] = &["span", "code", "i", "b"];

/// An anchor that introduces a documented symbol, with its `<dt>` container.
pub struct DefinitionSite<'a> {
    pub anchor: ElementRef<'a>,
    pub term: ElementRef<'a>,
}

impl DefinitionSite<'_> {
    pub fn name(&self) -> String {
        self.anchor.text().collect()
    }

    pub fn href(&self) -> Option<&str> {
        self.anchor.value().attr("href")
    }

    pub fn term_text(&self) -> String {
        self.term.text().collect()
    }

    pub fn term_class(&self) -> &str {
        self.term.value().attr("class").unwrap_or("")
    }
}

/// All definition sites of a document, in document order.
pub fn definition_sites(html: &Html) -> impl Iterator<Item = DefinitionSite<'_>> {
    html.select(&ANCHOR_SEL).filter_map(|anchor| {
        let term = definition_term(anchor)?;
        Some(DefinitionSite { anchor, term })
    })
}

/// The `<dt>` an anchor defines, if the anchor leads it (directly or through
/// one inline wrapper).
pub fn definition_term(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let parent = ElementRef::wrap(anchor.parent()?)?;
    if !leads(parent, anchor) {
        return None;
    }
    let container = if is_inline_wrapper(parent) {
        let outer = ElementRef::wrap(parent.parent()?)?;
        if !leads(outer, parent) {
            return None;
        }
        outer
    } else {
        parent
    };
    container
        .value()
        .name()
        .eq_ignore_ascii_case("dt")
        .then_some(container)
}

fn is_inline_wrapper(el: ElementRef<'_>) -> bool {
    let name = el.value().name();
    INLINE_WRAPPERS.iter().any(|w| name.eq_ignore_ascii_case(w))
}

/// Whether `child` is the first rendered child of `parent`.
fn leads(parent: ElementRef<'_>, child: ElementRef<'_>) -> bool {
    parent
        .children()
        .find(|c| is_rendered(c.value()))
        .is_some_and(|c| c.id() == child.id())
}

fn is_rendered(node: &Node) -> bool {
    match node {
        Node::Text(t) => !t.chars().all(|c| c.is_ascii_whitespace()),
        Node::Comment(_) => false,
        _ => true,
    }
}
