/// One `<Node>` element of a scene document, before any transform is
/// interpreted.
///
/// Every field holds the raw text of the matching element. Producing this tree
/// from markup is left to the caller's deserializer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentNode {
    pub name: String,
    /// Primitive kind, e.g. `Sphere` or `Cube`
    pub geometry: Option<String>,
    /// Carried through untouched; primitive sizing is not applied yet
    pub length: Option<String>,
    /// Carried through untouched; primitive sizing is not applied yet
    pub radius: Option<String>,
    /// Sixteen space-separated numbers, row by row
    pub transformation: String,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// A group node with no geometry
    pub fn new(name: impl Into<String>, transformation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transformation: transformation.into(),
            ..Self::default()
        }
    }

    pub fn with_geometry(mut self, geometry: impl Into<String>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    pub fn with_length(mut self, length: impl Into<String>) -> Self {
        self.length = Some(length.into());
        self
    }

    pub fn with_radius(mut self, radius: impl Into<String>) -> Self {
        self.radius = Some(radius.into());
        self
    }

    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DocumentNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of nodes in this subtree, including `self`
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}
