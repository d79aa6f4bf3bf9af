//! Arena storage for the contours of one tracing pass.
//!
//! A [`Hierarchy`] owns every contour it holds; nodes refer to each other
//! through [`NodeId`] indices, never through references. A [`ContourRef`]
//! is a borrowed cursor into the arena, so every link it hands out stays
//! valid exactly as long as the hierarchy is alive.

use std::ops::Deref;

use serde::Serialize;

use crate::contour::Contour;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// Forest links of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Links {
    pub next: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub parent: Option<NodeId>,
    /// First child
    pub child: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub contour: Contour,
    pub links: Links,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hierarchy {
    nodes: Vec<Node>,
    head: Option<NodeId>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the forest from `(contour, parent index)` pairs.
    ///
    /// Siblings are chained in input order. A parent must precede its
    /// children; any other parent index makes the entry top-level.
    pub fn from_parents(entries: Vec<(Contour, Option<usize>)>) -> Self {
        let len = entries.len();
        let mut nodes: Vec<Node> = Vec::with_capacity(len);
        let mut parents: Vec<Option<usize>> = Vec::with_capacity(len);
        for (i, (contour, parent)) in entries.into_iter().enumerate() {
            parents.push(parent.filter(|&p| p < i));
            nodes.push(Node {
                contour,
                links: Links::default(),
            });
        }

        // Last node of each sibling chain, keyed by parent (None = roots)
        let mut last_root: Option<usize> = None;
        let mut last_child: Vec<Option<usize>> = vec![None; len];
        let mut head = None;

        for (i, parent) in parents.iter().copied().enumerate() {
            nodes[i].links.parent = parent.map(NodeId);
            let tail = match parent {
                Some(p) => &mut last_child[p],
                None => &mut last_root,
            };
            match *tail {
                Some(prev) => {
                    nodes[prev].links.next = Some(NodeId(i));
                    nodes[i].links.prev = Some(NodeId(prev));
                }
                None => match parent {
                    Some(p) => nodes[p].links.child = Some(NodeId(i)),
                    None => head = Some(NodeId(i)),
                },
            }
            *tail = Some(i);
        }

        Self { nodes, head }
    }

    /// A flat sibling chain with no nesting.
    pub fn from_contours(contours: Vec<Contour>) -> Self {
        Self::from_parents(contours.into_iter().map(|c| (c, None)).collect())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First top-level contour, `None` when the trace found nothing.
    pub fn head(&self) -> Option<ContourRef<'_>> {
        self.head.map(|id| ContourRef { hierarchy: self, id })
    }

    pub fn get(&self, id: NodeId) -> Option<ContourRef<'_>> {
        (id.0 < self.nodes.len()).then_some(ContourRef { hierarchy: self, id })
    }

    pub fn contour_mut(&mut self, id: NodeId) -> Option<&mut Contour> {
        self.nodes.get_mut(id.0).map(|node| &mut node.contour)
    }

    pub fn links(&self, id: NodeId) -> Option<Links> {
        self.nodes.get(id.0).map(|node| node.links)
    }

    /// Every node in arena order.
    pub fn iter(&self) -> impl Iterator<Item = ContourRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| ContourRef {
            hierarchy: self,
            id: NodeId(i),
        })
    }

    /// The top-level sibling chain.
    pub fn roots(&self) -> Siblings<'_> {
        Siblings { next: self.head() }
    }

    pub fn contours(&self) -> impl Iterator<Item = &Contour> + '_ {
        self.nodes.iter().map(|node| &node.contour)
    }

    pub fn contours_mut(&mut self) -> impl Iterator<Item = &mut Contour> + '_ {
        self.nodes.iter_mut().map(|node| &mut node.contour)
    }
}

/// Borrowed cursor to one node of a [`Hierarchy`].
#[derive(Clone, Copy)]
pub struct ContourRef<'h> {
    hierarchy: &'h Hierarchy,
    id: NodeId,
}

impl<'h> ContourRef<'h> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn hierarchy(&self) -> &'h Hierarchy {
        self.hierarchy
    }

    pub fn contour(&self) -> &'h Contour {
        &self.node().contour
    }

    pub fn links(&self) -> Links {
        self.node().links
    }

    pub fn next(&self) -> Option<ContourRef<'h>> {
        self.follow(self.links().next)
    }

    pub fn prev(&self) -> Option<ContourRef<'h>> {
        self.follow(self.links().prev)
    }

    pub fn parent(&self) -> Option<ContourRef<'h>> {
        self.follow(self.links().parent)
    }

    pub fn child(&self) -> Option<ContourRef<'h>> {
        self.follow(self.links().child)
    }

    /// This node followed by its next siblings.
    pub fn siblings(&self) -> Siblings<'h> {
        Siblings { next: Some(*self) }
    }

    pub fn children(&self) -> Siblings<'h> {
        Siblings { next: self.child() }
    }

    /// Every node nested below this one, depth first.
    pub fn descendants(&self) -> Descendants<'h> {
        Descendants {
            stack: self.child().into_iter().collect(),
        }
    }

    /// Nesting depth, 0 for top-level contours.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), |node| node.parent()).count()
    }

    fn node(&self) -> &'h Node {
        &self.hierarchy.nodes[self.id.0]
    }

    fn follow(&self, id: Option<NodeId>) -> Option<ContourRef<'h>> {
        id.map(|id| ContourRef {
            hierarchy: self.hierarchy,
            id,
        })
    }
}

impl Deref for ContourRef<'_> {
    type Target = Contour;

    fn deref(&self) -> &Contour {
        self.contour()
    }
}

impl std::fmt::Debug for ContourRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContourRef")
            .field("id", &self.id)
            .field("points", &self.contour().len())
            .finish()
    }
}

impl PartialEq for ContourRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.hierarchy, other.hierarchy) && self.id == other.id
    }
}

/// Iterator over a sibling chain.
#[derive(Debug, Clone)]
pub struct Siblings<'h> {
    next: Option<ContourRef<'h>>,
}

impl<'h> Iterator for Siblings<'h> {
    type Item = ContourRef<'h>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next();
        Some(current)
    }
}

/// Depth-first iterator over a subtree, excluding its root.
#[derive(Debug, Clone)]
pub struct Descendants<'h> {
    stack: Vec<ContourRef<'h>>,
}

impl<'h> Iterator for Descendants<'h> {
    type Item = ContourRef<'h>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let Some(next) = current.next() {
            self.stack.push(next);
        }
        if let Some(child) = current.child() {
            self.stack.push(child);
        }
        Some(current)
    }
}
