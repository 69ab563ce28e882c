use std::collections::HashSet;

use proptest::prelude::*;

use crate::spatial::quadtree::point_quadtree::*;
use crate::spatial::quadtree::prelude::*;
use crate::spatial::quadtree::representation::*;

/// Mixes quarter-step values, which repeat and land on midpoints, with arbitrary ones.
fn coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-40i32..40).prop_map(|v| f64::from(v) / 4.0),
        -1000.0f64..1000.0,
    ]
}

fn points() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((coordinate(), coordinate()), 1..64)
}

fn distinct(points: &[(f64, f64)]) -> usize {
    // Adding 0.0 folds -0.0 into 0.0, which the tree treats as the same coordinate.
    points.iter()
        .map(|(x, y)| ((x + 0.0).to_bits(), (y + 0.0).to_bits()))
        .collect::<HashSet<_>>()
        .len()
}

/// Checks ids, depths, squares and sizes below 'quad', returning the deepest leaf depth.
fn check_quad(quad: &Quad<Vec2>, next_id: &mut usize, depth: usize) -> Result<usize, TestCaseError> {
    prop_assert_eq!(quad.id, *next_id);
    prop_assert_eq!(quad.depth, depth);
    *next_id += 1;

    match &quad.kind {
        QuadKind::Leaf(data) => {
            prop_assert!(!data.is_empty());
            prop_assert!(data.iter().all(|p| *p == data[0]));
            prop_assert!(quad.bbox.contains(&data[0]));
            prop_assert_eq!((quad.size, quad.height), (1, 0));
            Ok(depth)
        }

        QuadKind::Internal(children) => {
            // Never split further than needed to separate two points: a node with a single
            // child only exists to lead down to a node that does separate them.
            prop_assert!(quad.size >= 2);
            let occupied: Vec<&Quad<Vec2>> = children.iter().flatten().map(|c| &**c).collect();
            if let [only] = occupied[..] {
                prop_assert!(!only.is_leaf());
            }

            let mut deepest = depth;
            for (i, child) in children.iter().enumerate() {
                if let Some(child) = child {
                    prop_assert_eq!(child.bbox, quad.bbox.child(i));
                    deepest = deepest.max(check_quad(child, next_id, depth + 1)?);
                }
            }

            let size: usize = children.iter().flatten().map(|c| c.size).sum();
            prop_assert_eq!(quad.size, size);
            prop_assert_eq!(quad.height, deepest - depth);
            Ok(deepest)
        }
    }
}

proptest! {
    #[test]
    fn extent_covers_every_point_and_only_grows(points in points()) {
        let mut tree: Quadtree = Quadtree::new();
        let mut previous: Option<BBox2D> = None;

        for &(x, y) in &points {
            tree.cover(x, y).unwrap();
            let extent = tree.extent().unwrap();

            prop_assert!(extent.contains(&Vec2::new(x, y)));
            prop_assert_eq!(extent.side(), extent.max.y - extent.min.y);
            prop_assert_eq!(extent.side().log2().fract(), 0.0);

            if let Some(previous) = previous {
                prop_assert!(extent.min.x <= previous.min.x && extent.min.y <= previous.min.y);
                prop_assert!(extent.max.x >= previous.max.x && extent.max.y >= previous.max.y);
            }
            previous = Some(extent);
        }

        for &(x, y) in &points {
            prop_assert!(tree.extent().unwrap().contains(&Vec2::new(x, y)));
        }
    }

    #[test]
    fn representation_mirrors_the_tree(points in points()) {
        let mut tree: Quadtree = Quadtree::new();
        for &(x, y) in &points {
            tree.add_point(x, y).unwrap();
        }

        prop_assert_eq!(tree.len(), points.len());

        let before = tree.clone();
        let root = tree.build_node_representation().unwrap();
        prop_assert_eq!(&tree, &before);

        prop_assert_eq!(root.size, distinct(&points));
        prop_assert_eq!(root.bbox, tree.extent().unwrap());

        let mut next_id = 0;
        let deepest = check_quad(&root, &mut next_id, 0)?;
        prop_assert_eq!(root.height, deepest);
    }

    #[test]
    fn every_payload_is_kept(points in points()) {
        let mut tree = Quadtree::<usize>::new();
        for (i, &(x, y)) in points.iter().enumerate() {
            tree.add(x, y, i).unwrap();
        }

        let mut data: Vec<usize> = tree.data().copied().collect();
        data.sort_unstable();
        prop_assert_eq!(data, (0..points.len()).collect::<Vec<_>>());

        let mut leaves = 0;
        tree.visit(|node, bbox| {
            if let Some(leaf) = node.leaf() {
                leaves += 1;
                assert!(bbox.contains(leaf.point()));
            }
            false
        });
        prop_assert_eq!(leaves, distinct(&points));
    }

    #[test]
    fn bulk_loading_keeps_every_point(points in points()) {
        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();

        let mut tree: Quadtree = Quadtree::new();
        tree.add_all(&xs, &ys, None).unwrap();

        prop_assert_eq!(tree.len(), points.len());
        prop_assert_eq!(tree.build_node_representation().unwrap().size, distinct(&points));
    }

    #[test]
    fn quadrant_agrees_with_the_child_square(x in coordinate(), y in coordinate()) {
        let mut tree: Quadtree = Quadtree::new();
        tree.cover(-1000.0, -1000.0).unwrap().cover(1000.0, 1000.0).unwrap();

        let mut bbox = tree.extent().unwrap();
        let p = Vec2::new(x, y);

        for _ in 0..8 {
            let i = bbox.quadrant_of(&p);
            prop_assert_eq!(i, bbox.quadrant_of(&p));
            bbox = bbox.child(i);
            prop_assert!(bbox.contains(&p));
        }
    }
}
