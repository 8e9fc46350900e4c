//! In-process host implementations.

use serde::Serialize;

use super::{
    Binding, ContainerSpec, Layout, ParameterHost, RenameSink, WidgetHost, WidgetSpec,
    WidgetTemplate,
};
use crate::error::BuildError;
use crate::parameter::Parameter;

/// A custom parameter page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

/// Custom parameter pages of one operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterSet {
    pages: Vec<Page>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty page, as the operator's own settings page would be.
    pub fn add_page(&mut self, name: &str) {
        self.pages.push(Page {
            name: name.to_string(),
            parameters: Vec::new(),
        });
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// All parameters across pages, in page order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.pages.iter().flat_map(|p| p.parameters.iter())
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.parameters().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ParameterHost for ParameterSet {
    fn reset_page(&mut self, page: &str) -> Result<(), BuildError> {
        self.pages.retain(|p| p.name != page);
        self.add_page(page);
        Ok(())
    }

    fn append_parameter(&mut self, page: &str, parameter: &Parameter) -> Result<(), BuildError> {
        if self.get(&parameter.name).is_some() {
            return Err(BuildError::host(format!(
                "parameter '{}' already exists",
                parameter.name
            )));
        }
        let Some(target) = self.pages.iter_mut().find(|p| p.name == page) else {
            return Err(BuildError::host(format!("no parameter page '{page}'")));
        };
        target.parameters.push(parameter.clone());
        Ok(())
    }

    fn existing_names(&self) -> Vec<String> {
        self.parameters().map(|p| p.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    Container {
        layout: Layout,
        align_order: Option<usize>,
    },
    Widget {
        template: WidgetTemplate,
        properties: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub x: i64,
    pub kind: NodeKind,
    pub bindings: Vec<Binding>,
}

impl Node {
    pub fn property(&self, key: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Widget { properties, .. } => properties
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            NodeKind::Container { .. } => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container { .. })
    }
}

/// Arena-backed UI panel. Sibling names are kept unique by suffixing a
/// number, the way the host renames a copied node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetTree {
    nodes: Vec<Option<Node>>,
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node {
                name: "ui".to_string(),
                parent: None,
                children: Vec::new(),
                x: 0,
                kind: NodeKind::Container {
                    layout: Layout::Vertical,
                    align_order: None,
                },
                bindings: Vec::new(),
            })],
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, BuildError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| BuildError::host(format!("no such node {id:?}")))
    }

    /// Look a node up by slash-separated names below the root.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let mut current = self.root();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            let node = self.node(current)?;
            current = node
                .children
                .iter()
                .copied()
                .find(|c| self.node(*c).is_some_and(|n| n.name == part))?;
        }
        Some(current)
    }

    /// Live nodes below the root.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indented one-line-per-node rendering, for display and comparisons.
    pub fn outline(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(root) = self.node(self.root()) {
            for child in &root.children {
                self.outline_into(*child, 0, &mut lines);
            }
        }
        lines
    }

    fn outline_into(&self, id: NodeId, depth: usize, lines: &mut Vec<String>) {
        let Some(node) = self.node(id) else {
            return;
        };
        let kind = match &node.kind {
            NodeKind::Container { layout, .. } => format!("{layout:?}"),
            NodeKind::Widget { template, .. } => format!("{template:?}"),
        };
        lines.push(format!("{}{} [{kind}]", "  ".repeat(depth), node.name));
        for child in &node.children {
            self.outline_into(*child, depth + 1, lines);
        }
    }

    fn unique_name(&self, parent: NodeId, name: &str) -> String {
        let taken = |candidate: &str| {
            self.node(parent).is_some_and(|p| {
                p.children
                    .iter()
                    .any(|c| self.node(*c).is_some_and(|n| n.name == candidate))
            })
        };
        if !taken(name) {
            return name.to_string();
        }
        let mut i = 1;
        loop {
            let candidate = format!("{name}{i}");
            if !taken(&candidate) {
                return candidate;
            }
            i += 1;
        }
    }

    fn insert(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, BuildError> {
        if self.node(parent).map_or(true, |p| !p.is_container()) {
            return Err(BuildError::host(format!("{parent:?} is not a container")));
        }
        node.name = self.unique_name(parent, &node.name);
        node.parent = Some(parent);
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }
}

impl WidgetHost for WidgetTree {
    type Id = NodeId;

    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn clear(&mut self) -> Result<(), BuildError> {
        // Only the root survives, so the whole arena can be dropped.
        self.nodes.truncate(1);
        let root = self.node_mut(self.root())?;
        root.children.clear();
        root.kind = NodeKind::Container {
            layout: Layout::Vertical,
            align_order: None,
        };
        Ok(())
    }

    fn create_container(
        &mut self,
        parent: NodeId,
        spec: ContainerSpec,
    ) -> Result<NodeId, BuildError> {
        self.insert(
            parent,
            Node {
                name: spec.name,
                parent: None,
                children: Vec::new(),
                x: spec.x,
                kind: NodeKind::Container {
                    layout: spec.layout,
                    align_order: spec.align_order,
                },
                bindings: Vec::new(),
            },
        )
    }

    fn create_widget(&mut self, parent: NodeId, spec: WidgetSpec) -> Result<NodeId, BuildError> {
        self.insert(
            parent,
            Node {
                name: spec.name,
                parent: None,
                children: Vec::new(),
                x: spec.x,
                kind: NodeKind::Widget {
                    template: spec.template,
                    properties: spec.properties,
                },
                bindings: Vec::new(),
            },
        )
    }

    fn set_binding(&mut self, node: NodeId, binding: Binding) -> Result<(), BuildError> {
        let node = self.node_mut(node)?;
        node.bindings.retain(|b| b.target() != binding.target());
        node.bindings.push(binding);
        Ok(())
    }

    fn set_property(&mut self, node: NodeId, key: &str, value: &str) -> Result<(), BuildError> {
        let node = self.node_mut(node)?;
        let NodeKind::Widget { properties, .. } = &mut node.kind else {
            return Err(BuildError::host(format!(
                "container '{}' has no widget properties",
                node.name
            )));
        };
        match properties.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => properties.push((key.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn template(&self, node: NodeId) -> Option<WidgetTemplate> {
        match self.node(node)?.kind {
            NodeKind::Widget { template, .. } => Some(template),
            NodeKind::Container { .. } => None,
        }
    }

    fn destroy(&mut self, node: NodeId) -> Result<(), BuildError> {
        if node == self.root() {
            return Err(BuildError::host("cannot destroy the root container"));
        }
        let parent = self.node(node).and_then(|n| n.parent);
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|c| *c != node);
        }
        self.remove_subtree(node);
        Ok(())
    }
}

/// One exported (parameter, address) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRow {
    pub parameter: String,
    pub address: String,
}

/// Ordered rename table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameTable {
    pub rows: Vec<RenameRow>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address_of(&self, parameter: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.parameter == parameter)
            .map(|r| r.address.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RenameSink for RenameTable {
    fn clear(&mut self) {
        self.rows.clear();
    }

    fn append_row(&mut self, parameter: &str, address: &str) {
        self.rows.push(RenameRow {
            parameter: parameter.to_string(),
            address: address.to_string(),
        });
    }
}
