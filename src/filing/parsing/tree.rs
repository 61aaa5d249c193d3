use scraper::{ElementRef, Html};

use super::text::clean_text;

/// Node handle into a [`DomTree`] arena. Ids are assigned in preorder during
/// ingestion, so comparing ids compares document order. This ordering (and
/// the order of `children`) is the deterministic sibling-iteration contract
/// that title resolution and footnote association rely on.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleKind {
    #[default]
    Normal,
    Italic,
}

/// Typed formatting descriptor, parsed once at tree ingestion from the
/// element's `style` attribute plus tag-implied emphasis (`b`, `i`, ...).
/// Classification logic downstream never touches raw style strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleDescriptor {
    pub weight: FontWeight,
    pub kind: StyleKind,
    pub size_pt: Option<u32>,
    pub inherits_family: bool,
    pub bottom_border: bool,
}

impl StyleDescriptor {
    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.kind == StyleKind::Italic
    }

    /// Bold or italic. Table titles and section headers are signaled by
    /// either in EDGAR markup.
    pub fn is_emphasized(&self) -> bool {
        self.is_bold() || self.is_italic()
    }

    /// Emphasis fields only, for "same style" comparisons across adjacent
    /// title runs.
    pub fn emphasis(&self) -> (FontWeight, StyleKind) {
        (self.weight, self.kind)
    }

    /// Fields a child element inherits. Borders belong to the box that
    /// declared them and are not propagated.
    fn inheritable(&self) -> StyleDescriptor {
        StyleDescriptor {
            weight: self.weight,
            kind: self.kind,
            size_pt: self.size_pt,
            inherits_family: self.inherits_family,
            bottom_border: false,
        }
    }

    fn apply_tag(&mut self, name: &str) {
        match name {
            "b" | "strong" => self.weight = FontWeight::Bold,
            "i" | "em" => self.kind = StyleKind::Italic,
            _ => {}
        }
    }

    fn apply_style_attr(&mut self, attr: &str) {
        for decl in attr.split(';') {
            let Some((key, value)) = decl.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_ascii_lowercase();
            match key.as_str() {
                "font-weight" => {
                    if value == "bold" || value == "bolder" || value.parse::<u32>().map_or(false, |w| w >= 600) {
                        self.weight = FontWeight::Bold;
                    } else {
                        self.weight = FontWeight::Normal;
                    }
                }
                "font-style" => {
                    self.kind = if value.contains("italic") {
                        StyleKind::Italic
                    } else {
                        StyleKind::Normal
                    };
                }
                "font-size" => {
                    if let Some(pt) = value.strip_suffix("pt") {
                        if let Ok(size) = pt.trim().parse::<f32>() {
                            self.size_pt = Some(size.round() as u32);
                        }
                    }
                }
                "font-family" => {
                    self.inherits_family = value == "inherit";
                }
                "border-bottom" | "border-bottom-style" => {
                    if !value.contains("none") && !value.is_empty() {
                        self.bottom_border = true;
                    }
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug)]
pub enum NodeData {
    Element { name: String, style: StyleDescriptor },
    Text(String),
}

#[derive(Debug)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
    /// Exclusive end of this node's preorder subtree: descendants occupy
    /// `id + 1 .. subtree_end`.
    pub subtree_end: NodeId,
}

/// A styled text run: the unit the classifier and section segmenter operate
/// on. Runs are emitted in document order.
#[derive(Debug, Clone)]
pub struct Run {
    pub node: NodeId,
    pub text: String,
    pub style: StyleDescriptor,
}

/// Elements that hold a single styled run of text in EDGAR markup.
const RUN_TAGS: &[&str] = &["font", "span", "b", "strong", "i", "em", "u"];

/// Subtrees that never contribute document text.
const BLACKLIST_TAGS: &[&str] = &["script", "style", "noscript"];

/// Arena-backed parse tree for one sub-document body. Built once from the
/// raw markup; read-only afterwards.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Parse a sub-document body into an arena tree. Styles are resolved to
    /// typed [`StyleDescriptor`]s here, with emphasis and font size inherited
    /// from enclosing elements.
    pub fn parse(html: &str) -> DomTree {
        let document = Html::parse_document(html);
        let mut tree = DomTree { nodes: Vec::new() };
        let root_style = StyleDescriptor::default();
        let root = tree.push_node(None, NodeData::Element {
            name: "#document".to_string(),
            style: root_style,
        });
        tree.ingest_element(document.root_element(), root, root_style);
        let end = tree.nodes.len();
        tree.nodes[root].subtree_end = end;
        tree
    }

    fn push_node(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            data,
            subtree_end: id + 1,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    fn ingest_element(&mut self, element: ElementRef, parent: NodeId, inherited: StyleDescriptor) {
        let name = element.value().name().to_ascii_lowercase();
        if BLACKLIST_TAGS.contains(&name.as_str()) {
            return;
        }

        let mut style = inherited.inheritable();
        style.apply_tag(&name);
        if let Some(attr) = element.value().attr("style") {
            style.apply_style_attr(attr);
        }

        let id = self.push_node(Some(parent), NodeData::Element { name, style });
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                self.ingest_element(child_element, id, style);
            } else if let Some(text) = child.value().as_text() {
                // Whitespace-only nodes are kept so that concatenated text
                // content preserves word boundaries across inline markup.
                self.push_node(Some(id), NodeData::Text(text.to_string()));
            }
        }
        self.nodes[id].subtree_end = self.nodes.len();
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].data {
            NodeData::Element { name, .. } => Some(name.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn style(&self, id: NodeId) -> StyleDescriptor {
        match &self.nodes[id].data {
            NodeData::Element { style, .. } => *style,
            NodeData::Text(_) => self
                .parent(id)
                .map(|p| self.style(p))
                .unwrap_or_default(),
        }
    }

    /// Explicit ancestor path, nearest parent first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.nodes[id].parent;
        while let Some(node) = current {
            path.push(node);
            current = self.nodes[node].parent;
        }
        path
    }

    pub fn is_named(&self, id: NodeId, name: &str) -> bool {
        self.element_name(id) == Some(name)
    }

    pub fn has_ancestor_named(&self, id: NodeId, name: &str) -> bool {
        self.ancestors(id).iter().any(|&a| self.is_named(a, name))
    }

    /// True when `id` lies inside the preorder subtree rooted at `root`.
    pub fn is_within(&self, id: NodeId, root: NodeId) -> bool {
        id >= root && id < self.nodes[root].subtree_end
    }

    /// First node after `id`'s whole subtree in document order, if any.
    pub fn subtree_end(&self, id: NodeId) -> NodeId {
        self.nodes[id].subtree_end
    }

    /// Cleaned text of the node and all its descendants, concatenated in
    /// document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        clean_text(&out)
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { .. } => {
                for &child in &self.nodes[id].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// All `<table>` elements under `id` that are not nested inside another
    /// table, in document order.
    pub fn tables_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut tables = Vec::new();
        let mut cursor = id;
        while cursor < self.nodes[id].subtree_end {
            if self.is_named(cursor, "table") {
                tables.push(cursor);
                cursor = self.nodes[cursor].subtree_end;
            } else {
                cursor += 1;
            }
        }
        tables
    }

    /// True when the node sits inside any `<table>` element.
    pub fn is_inside_table(&self, id: NodeId) -> bool {
        self.has_ancestor_named(id, "table")
    }

    /// Does this cell (or anything inside it) carry a ruled bottom border?
    pub fn has_bottom_border(&self, id: NodeId) -> bool {
        if self.style(id).bottom_border {
            return true;
        }
        (id + 1..self.nodes[id].subtree_end).any(|d| self.style(d).bottom_border)
    }

    /// Styled text runs in document order under `scope`. A run is the
    /// innermost run-tag element holding actual text; outer wrappers with a
    /// nested run inside are descended through instead of emitted.
    pub fn styled_runs(&self, scope: NodeId) -> Vec<Run> {
        let mut runs = Vec::new();
        self.collect_runs(scope, &mut runs);
        runs
    }

    fn collect_runs(&self, id: NodeId, runs: &mut Vec<Run>) {
        let is_run_tag = self
            .element_name(id)
            .map_or(false, |name| RUN_TAGS.contains(&name));
        if is_run_tag && !self.has_nested_run(id) {
            let text = self.text_content(id);
            if !text.is_empty() {
                runs.push(Run {
                    node: id,
                    text,
                    style: self.style(id),
                });
            }
            return;
        }
        for &child in &self.nodes[id].children {
            self.collect_runs(child, runs);
        }
    }

    fn has_nested_run(&self, id: NodeId) -> bool {
        for &child in &self.nodes[id].children {
            let child_is_run = self
                .element_name(child)
                .map_or(false, |name| RUN_TAGS.contains(&name));
            if child_is_run && !self.text_content(child).is_empty() {
                return true;
            }
            if self.has_nested_run(child) {
                return true;
            }
        }
        false
    }
}
