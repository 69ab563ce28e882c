use crate::spatial::quadtree::point_quadtree::{Node, Quadtree};
use crate::spatial::quadtree::prelude::*;

/// An explicit copy of one node of a Quadtree, annotated for traversal and drawing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Quad<P> {
    /// Position of this node in a pre-order walk of the tree, starting at 0.
    pub id: usize,

    /// Number of edges between the root and this node.
    pub depth: usize,

    /// The square this node covers.
    pub bbox: BBox2D,

    /// Number of distinct points below this node. A chain of duplicates counts once.
    pub size: usize,

    /// Number of edges on the longest path down to a leaf.
    pub height: usize,

    pub kind: QuadKind<P>
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum QuadKind<P> {
    // Indexed by quadrant, empty slots stay None.
    Internal([Option<Box<Quad<P>>>; 4]),

    // Every payload chained at this point, newest first.
    Leaf(Vec<P>)
}

impl<P> Quad<P> {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, QuadKind::Leaf(_))
    }

    pub fn children(&self) -> Option<&[Option<Box<Quad<P>>>; 4]> {
        match &self.kind {
            QuadKind::Internal(children) => Some(children),
            QuadKind::Leaf(_) => None
        }
    }

    pub fn data(&self) -> Option<&[P]> {
        match &self.kind {
            QuadKind::Internal(_) => None,
            QuadKind::Leaf(data) => Some(data)
        }
    }
}

/// A node waiting to be visited during the first pass.
struct Visit<'a, P> {
    node: &'a Node<P>,
    bbox: BBox2D,
    depth: usize,
    parent: Option<(usize, usize)>
}

enum Pending<P> {
    Internal([Option<usize>; 4]),
    Leaf(Vec<P>)
}

/// A node after the first pass, with its children referenced by id.
struct Flat<P> {
    depth: usize,
    bbox: BBox2D,
    pending: Pending<P>
}

impl<P: Clone> Quadtree<P> {

    /// Returns an annotated copy of the tree, or None if the tree is empty.
    ///
    /// The first pass walks the tree in pre-order (quadrants 0 to 3) to assign ids, depths and
    /// squares. The second pass walks it backwards so that every child is finished before its
    /// parent, which lets the parent sum sizes and take the maximum height.
    pub fn build_node_representation(&self) -> Option<Quad<P>> {
        let root = self.root()?;
        let extent = self.extent()?;

        let mut flat: Vec<Flat<P>> = vec![];
        let mut stack = vec![Visit { node: root, bbox: extent, depth: 0, parent: None }];

        while let Some(visit) = stack.pop() {
            let id = flat.len();

            if let Some((parent, i)) = visit.parent {
                if let Pending::Internal(children) = &mut flat[parent].pending {
                    children[i] = Some(id);
                }
            }

            let pending = match visit.node {
                Node::Leaf(leaf) => Pending::Leaf(leaf.iter().cloned().collect()),

                Node::Internal(children) => {
                    // Pushed backwards so that quadrant 0 is popped first.
                    for (i, child) in children.iter().enumerate().rev() {
                        if let Some(child) = child {
                            stack.push(Visit {
                                node: child,
                                bbox: visit.bbox.child(i),
                                depth: visit.depth + 1,
                                parent: Some((id, i))
                            });
                        }
                    }
                    Pending::Internal([None; 4])
                }
            };

            flat.push(Flat { depth: visit.depth, bbox: visit.bbox, pending });
        }

        let mut built: Vec<Option<Quad<P>>> = (0..flat.len()).map(|_| None).collect();

        for (id, entry) in flat.into_iter().enumerate().rev() {
            let quad = match entry.pending {
                Pending::Leaf(data) => Quad {
                    id,
                    depth: entry.depth,
                    bbox: entry.bbox,
                    size: 1,
                    height: 0,
                    kind: QuadKind::Leaf(data)
                },

                Pending::Internal(ids) => {
                    let children = ids.map(|child| child.and_then(|c| built[c].take()).map(Box::new));
                    let size = children.iter().flatten().map(|c| c.size).sum();
                    let height = 1 + children.iter().flatten().map(|c| c.height).max().unwrap_or(0);

                    Quad {
                        id,
                        depth: entry.depth,
                        bbox: entry.bbox,
                        size,
                        height,
                        kind: QuadKind::Internal(children)
                    }
                }
            };

            built[id] = Some(quad);
        }

        built.into_iter().next().flatten()
    }
}
