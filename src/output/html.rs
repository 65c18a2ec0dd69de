//! HTML call-tree renderer.
//!
//! Every node with children becomes a collapsible `<details>` section whose
//! summary reads `calls: <count>, <name>` and whose body lists the children
//! in linearized order. Leaves and back-reference markers are plain text.

use crate::aggregator::registry::{backref_title, Edge, NodeId, Registry};
use crate::aggregator::sorter::CallForest;
use log::debug;

const DOCUMENT_OPEN: &str = "<html><body>\n";
const DOCUMENT_CLOSE: &str = "</body></html>\n";

/// Render the whole forest as one HTML document
///
/// **Public** - main entry point for HTML rendering
///
/// The forest must be linearized first; rendering follows every call edge.
pub fn render_html(forest: &CallForest) -> String {
    let mut out = String::from(DOCUMENT_OPEN);

    for &root in forest.roots() {
        render_tree(forest.registry(), root, &mut out);
        if forest.registry().node(root).children.is_empty() {
            out.push_str("<br>\n");
        }
    }

    out.push_str(DOCUMENT_CLOSE);
    debug!("Rendered {} roots into {} bytes of HTML", forest.roots().len(), out.len());
    out
}

/// Render one root with an explicit stack of open sections
fn render_tree(registry: &Registry, root: NodeId, out: &mut String) {
    if !open_node(registry, root, out) {
        return;
    }

    // (open node, index of the next child edge to render)
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];

    while let Some(top) = stack.last_mut() {
        let (node, index) = *top;
        let Some(edge) = registry.node(node).children.get(index) else {
            stack.pop();
            out.push_str("</ul>\n</details>\n");
            if !stack.is_empty() {
                out.push_str("</li>\n");
            }
            continue;
        };
        top.1 += 1;

        out.push_str("<li>");
        match edge {
            Edge::Call(child) if open_node(registry, *child, out) => stack.push((*child, 0)),
            Edge::Call(_) => out.push_str("</li>\n"),
            Edge::Backref { name } => {
                out.push_str(&escape_html(&backref_title(name)));
                out.push_str("</li>\n");
            }
        }
    }
}

/// Write a leaf title, or open a node's section and list
///
/// Returns whether a section was opened and needs its children rendered.
fn open_node(registry: &Registry, id: NodeId, out: &mut String) -> bool {
    let node = registry.node(id);
    let title = escape_html(&node.title());

    if node.children.is_empty() {
        out.push_str(&title);
        return false;
    }

    out.push_str(&format!(
        "<details><summary><b>Expand/Collapse</b> {}</summary>\n",
        title
    ));
    out.push_str("<ul>\n");
    true
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{linearize, sort_by_frequency};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_forest() {
        let forest = sort_by_frequency(Registry::new());
        assert_eq!(render_html(&forest), "<html><body>\n</body></html>\n");
    }

    #[test]
    fn test_nested_sections_and_backref() {
        let mut registry = Registry::new();
        let a = registry.observe("#A");
        let b = registry.observe("#B");
        registry.observe("#A");
        registry.link(a, b);
        registry.link(b, a);
        registry.mark_root(a);

        let mut forest = sort_by_frequency(registry);
        linearize(&mut forest);

        let expected = "<html><body>\n\
<details><summary><b>Expand/Collapse</b> calls: 2, A</summary>\n\
<ul>\n\
<li><details><summary><b>Expand/Collapse</b> calls: 1, B</summary>\n\
<ul>\n\
<li>Backlink: A</li>\n\
</ul>\n\
</details>\n\
</li>\n\
</ul>\n\
</details>\n\
</body></html>\n";
        assert_eq!(render_html(&forest), expected);
    }

    #[test]
    fn test_leaf_root_is_plain_text() {
        let mut registry = Registry::new();
        let solo = registry.observe("#solo");
        registry.mark_root(solo);

        let forest = sort_by_frequency(registry);

        assert_eq!(
            render_html(&forest),
            "<html><body>\ncalls: 1, solo<br>\n</body></html>\n"
        );
    }

    #[test]
    fn test_escapes_markup_in_names() {
        assert_eq!(
            escape_html("Vec<T>::push & \"x\""),
            "Vec&lt;T&gt;::push &amp; &quot;x&quot;"
        );
    }

    #[test]
    fn test_deep_chain_renders_without_recursion() {
        let mut registry = Registry::new();
        let ids: Vec<NodeId> = (0..50_000)
            .map(|i| registry.observe(&format!("#f{}", i)))
            .collect();
        for pair in ids.windows(2) {
            registry.link(pair[0], pair[1]);
        }
        registry.link(ids[ids.len() - 1], ids[0]);
        registry.mark_root(ids[0]);

        let mut forest = sort_by_frequency(registry);
        linearize(&mut forest);
        let html = render_html(&forest);

        assert_eq!(html.matches("<details>").count(), 50_000);
        assert_eq!(html.matches("</details>\n").count(), 50_000);
        assert_eq!(html.matches("<li>").count(), html.matches("</li>\n").count());
        assert!(html.contains("<li>Backlink: f0</li>\n</ul>\n</details>\n</li>\n"));
        assert!(html.ends_with("</ul>\n</details>\n</body></html>\n"));
    }
}
