use std::mem;

use log::{debug, trace};

use crate::error::{QuadtreeError, Result};
use crate::spatial::quadtree::prelude::*;

/// A leaf holds the payload of a single point. Points inserted earlier at exactly the same
/// coordinates hang off of it through 'next', newest first.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf<P> {
    point: Vec2,
    data: P,
    next: Option<Box<Leaf<P>>>
}

impl<P> Leaf<P> {
    pub(crate) fn new(point: Vec2, data: P) -> Self {
        Self {
            point,
            data,
            next: None
        }
    }

    /// Returns the coordinates this leaf was inserted at.
    pub fn point(&self) -> &Vec2 {
        &self.point
    }

    pub fn data(&self) -> &P {
        &self.data
    }

    /// Returns the leaf of the previous point inserted at the same coordinates.
    pub fn next(&self) -> Option<&Leaf<P>> {
        self.next.as_deref()
    }

    /// Iterates the payloads of the whole chain, starting with this leaf.
    pub fn iter(&self) -> LeafIter<'_, P> {
        LeafIter { next: Some(self) }
    }
}

pub struct LeafIter<'a, P> {
    next: Option<&'a Leaf<P>>
}

impl<'a, P> Iterator for LeafIter<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        let leaf = self.next?;
        self.next = leaf.next.as_deref();
        Some(&leaf.data)
    }
}

/// A node is either a leaf or an internal node with one slot per quadrant.
#[derive(Clone, Debug, PartialEq)]
pub enum Node<P> {
    Leaf(Leaf<P>),

    // Indexed by quadrant, see prelude::quadrant.
    Internal(Box<[Option<Node<P>>; 4]>)
}

impl<P> Node<P> {
    /// Returns an internal node holding only 'child', in quadrant 'i'.
    fn wrap(i: usize, child: Option<Node<P>>) -> Self {
        let mut children = [None, None, None, None];
        children[i] = child;
        Node::Internal(Box::new(children))
    }

    pub fn leaf(&self) -> Option<&Leaf<P>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal(_) => None
        }
    }

    pub fn children(&self) -> Option<&[Option<Node<P>>; 4]> {
        match self {
            Node::Leaf(_) => None,
            Node::Internal(children) => Some(children)
        }
    }

    /// Builds the smallest subtree of 'bbox' that separates the two leaves.
    ///
    /// Both leaves must lie within 'bbox' and have different coordinates.
    fn split(mut bbox: BBox2D, existing: Leaf<P>, leaf: Leaf<P>) -> Self {
        let mut path = vec![];

        loop {
            let i = bbox.quadrant_of(&leaf.point);
            let j = bbox.quadrant_of(&existing.point);

            if i != j {
                trace!("separated {:?} from {:?} at depth {}", leaf.point, existing.point, path.len() + 1);

                let mut children = [None, None, None, None];
                children[i] = Some(Node::Leaf(leaf));
                children[j] = Some(Node::Leaf(existing));

                return path.into_iter().rev().fold(
                    Node::Internal(Box::new(children)),
                    |node, k| Node::wrap(k, Some(node))
                );
            }

            path.push(i);
            bbox = bbox.child(i);
        }
    }
}

/// A dynamic point quadtree.
///
/// The tree starts out without an extent. The first covered point sets it to the unit square
/// containing that point, and every point after that which falls outside of it doubles the
/// square (possibly several times) until it fits. Existing nodes keep their absolute position.
#[derive(Clone, Debug, PartialEq)]
pub struct Quadtree<P = Vec2> {
    extent: Option<BBox2D>,
    root: Option<Node<P>>,
    len: usize
}

impl<P> Default for Quadtree<P> {
    fn default() -> Self {
        Self {
            extent: None,
            root: None,
            len: 0
        }
    }
}

/// Returns the point (x, y), or an error if either coordinate is not finite.
pub(crate) fn checked_point(x: f64, y: f64) -> Result<Vec2> {
    if x.is_finite() && y.is_finite() {
        Ok(Vec2::new(x, y))
    } else {
        Err(QuadtreeError::InvalidCoordinate { x, y })
    }
}

/// Works out the square covering 'point', starting from 'extent', without touching the tree.
///
/// The quadrant the old square takes in each doubled one is appended to 'path'.
fn plan_growth(extent: Option<BBox2D>, point: &Vec2, path: &mut Vec<usize>) -> Result<BBox2D> {
    let Some(mut bbox) = extent else {
        let bbox = BBox2D::unit_at(point);

        // Past 2^53 the unit square collapses and can't hold anything.
        if !bbox.contains(point) {
            return Err(QuadtreeError::ExtentOverflow { x: point.x, y: point.y });
        }
        return Ok(bbox);
    };

    while !bbox.contains(point) {
        let (i, grown) = bbox.grow_towards(point);
        if !grown.is_finite() || grown.side() <= bbox.side() {
            return Err(QuadtreeError::ExtentOverflow { x: point.x, y: point.y });
        }

        path.push(i);
        bbox = grown;
    }

    Ok(bbox)
}

impl<P> Quadtree<P> {

    /// Returns a new, empty Quadtree without an extent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new, empty Quadtree whose extent covers both corners.
    pub fn with_extent(p0: [f64; 2], p1: [f64; 2]) -> Result<Self> {
        let mut tree = Self::new();
        tree.set_extent(p0, p1)?;
        Ok(tree)
    }

    /// Returns the number of points contained in this tree, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<&Node<P>> {
        self.root.as_ref()
    }

    /// Returns the current extent, or None if nothing has been covered yet.
    pub fn extent(&self) -> Option<BBox2D> {
        self.extent
    }

    /// Grows the extent to cover both corners.
    pub fn set_extent(&mut self, p0: [f64; 2], p1: [f64; 2]) -> Result<&mut Self> {
        let p0 = checked_point(p0[0], p0[1])?;
        let p1 = checked_point(p1[0], p1[1])?;
        self.cover_corners(&p0, &p1)?;
        Ok(self)
    }

    /// Grows the extent until it covers (x, y). Does nothing if it already does.
    pub fn cover(&mut self, x: f64, y: f64) -> Result<&mut Self> {
        let point = checked_point(x, y)?;
        self.cover_point(&point)?;
        Ok(self)
    }

    /// Adds a point with the given payload, growing the extent to cover it first.
    pub fn add(&mut self, x: f64, y: f64, data: P) -> Result<&mut Self> {
        let point = checked_point(x, y)?;
        let bbox = self.cover_point(&point)?;
        self.insert(bbox, Leaf::new(point, data));
        Ok(self)
    }

    /// Iterates every payload in the tree. Chained payloads come newest first.
    pub fn data(&self) -> impl Iterator<Item = &P> {
        let mut stack: Vec<&Node<P>> = self.root.iter().collect();

        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                match node {
                    Node::Leaf(leaf) => return Some(leaf),
                    Node::Internal(children) => stack.extend(children.iter().rev().flatten())
                }
            }
            None
        })
        .flat_map(Leaf::iter)
    }

    /// Visits each node in pre-order along with the square it covers.
    ///
    /// If 'callback' returns true, the children of that node are skipped.
    pub fn visit<F>(&self, mut callback: F)
        where F: FnMut(&Node<P>, &BBox2D) -> bool
    {
        let (Some(root), Some(extent)) = (&self.root, self.extent) else {
            return;
        };

        let mut stack = vec![(root, extent)];
        while let Some((node, bbox)) = stack.pop() {
            if callback(node, &bbox) {
                continue;
            }

            if let Node::Internal(children) = node {
                for (i, child) in children.iter().enumerate().rev() {
                    if let Some(child) = child {
                        stack.push((child, bbox.child(i)));
                    }
                }
            }
        }
    }

    /// Grows the extent to cover 'point' and returns it.
    ///
    /// The tree is left untouched if the extent would stop being finite.
    pub(crate) fn cover_point(&mut self, point: &Vec2) -> Result<BBox2D> {
        let mut path = vec![];
        let bbox = plan_growth(self.extent, point, &mut path)?;
        Ok(self.commit_growth(bbox, path))
    }

    /// Grows the extent to cover both corners and returns it.
    ///
    /// Nothing changes unless both corners can be covered.
    pub(crate) fn cover_corners(&mut self, p0: &Vec2, p1: &Vec2) -> Result<BBox2D> {
        let mut path = vec![];
        let bbox = plan_growth(self.extent, p0, &mut path)?;
        let bbox = plan_growth(Some(bbox), p1, &mut path)?;
        Ok(self.commit_growth(bbox, path))
    }

    /// Makes 'bbox' the extent, wrapping the root once per doubling in 'path'.
    fn commit_growth(&mut self, bbox: BBox2D, path: Vec<usize>) -> BBox2D {
        if self.extent.is_none() {
            debug!("initialized extent to {:?}", bbox.corners());
        } else if !path.is_empty() {
            debug!("doubled extent {} time(s) to {:?}", path.len(), bbox.corners());
        }

        // A lone leaf has no position of its own, only internal nodes need to be re-rooted.
        if !path.is_empty() && matches!(self.root, Some(Node::Internal(_))) {
            let old_root = self.root.take();
            self.root = path.into_iter().fold(old_root, |node, i| Some(Node::wrap(i, node)));
        }

        self.extent = Some(bbox);
        bbox
    }

    /// Places 'leaf' in the tree, given that 'bbox' is the current extent and covers it.
    pub(crate) fn insert(&mut self, bbox: BBox2D, leaf: Leaf<P>) {
        self.len += 1;

        let mut bbox = bbox;
        let mut slot = &mut self.root;

        loop {
            match slot {
                None => {
                    *slot = Some(Node::Leaf(leaf));
                    return;
                }

                Some(Node::Internal(children)) => {
                    let i = bbox.quadrant_of(&leaf.point);
                    bbox = bbox.child(i);
                    slot = &mut children[i];
                }

                Some(Node::Leaf(existing)) if existing.point == leaf.point => {
                    trace!("chaining duplicate point {:?}", leaf.point);

                    let previous = mem::replace(existing, leaf);
                    existing.next = Some(Box::new(previous));
                    return;
                }

                Some(Node::Leaf(_)) => {
                    if let Some(Node::Leaf(existing)) = slot.take() {
                        *slot = Some(Node::split(bbox, existing, leaf));
                    }
                    return;
                }
            }
        }
    }
}

impl<P: From<Vec2>> Quadtree<P> {
    /// Adds a point whose payload is the point itself.
    pub fn add_point(&mut self, x: f64, y: f64) -> Result<&mut Self> {
        self.add(x, y, P::from(Vec2::new(x, y)))
    }
}
