//! A static 2-D KD-tree and the Flann-like [`PointPairEstimator`] built on
//! top of it.

use super::point_pair_estimator::{PointPair, PointPairEstimator};
use geom::Point2d;

struct KdNode {
    point_index: usize,
    axis: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// A KD-tree over a fixed set of 2-D points, built once and queried many
/// times. Rebuilding (via [`Flann2dIndex::build`]) is the only way to
/// change the indexed point set.
struct Flann2dIndex {
    points: Vec<Point2d>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl Flann2dIndex {
    fn build(points: Vec<Point2d>) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = Self::build_recursive(&points, &mut indices, 0, &mut nodes);
        Self { points, nodes, root }
    }

    fn build_recursive(
        points: &[Point2d],
        indices: &mut [usize],
        depth: usize,
        nodes: &mut Vec<KdNode>,
    ) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }
        let axis = (depth % 2) as u8;
        indices.sort_by(|&a, &b| {
            let va = if axis == 0 { points[a].x() } else { points[a].y() };
            let vb = if axis == 0 { points[b].x() } else { points[b].y() };
            va.partial_cmp(&vb).unwrap()
        });
        let mid = indices.len() / 2;
        let point_index = indices[mid];
        let (left_slice, rest) = indices.split_at_mut(mid);
        let right_slice = &mut rest[1..];

        let left = Self::build_recursive(points, left_slice, depth + 1, nodes);
        let right = Self::build_recursive(points, right_slice, depth + 1, nodes);

        nodes.push(KdNode { point_index, axis, left, right });
        Some(nodes.len() - 1)
    }

    /// Nearest neighbour to `query`, with an epsilon relaxation: a
    /// subtree that could only improve on the current best by a factor
    /// smaller than `1 + epsilon` is skipped. `epsilon = 0` is exact NN.
    fn nearest(&self, query: Point2d, epsilon: f64) -> Option<(usize, f64)> {
        let root = self.root?;
        let mut best: Option<(usize, f64)> = None;
        self.search(root, query, epsilon, &mut best);
        best.map(|(idx, d2)| (idx, d2.sqrt()))
    }

    fn search(&self, node_idx: usize, query: Point2d, epsilon: f64, best: &mut Option<(usize, f64)>) {
        let node = &self.nodes[node_idx];
        let p = self.points[node.point_index];
        let d2 = (p.x() - query.x()).powi(2) + (p.y() - query.y()).powi(2);
        if best.map_or(true, |(_, bd)| d2 < bd) {
            *best = Some((node.point_index, d2));
        }

        let diff = if node.axis == 0 { query.x() - p.x() } else { query.y() - p.y() };
        let (near, far) = if diff < 0.0 { (node.left, node.right) } else { (node.right, node.left) };

        if let Some(n) = near {
            self.search(n, query, epsilon, best);
        }
        let plane_dist2 = diff * diff;
        let relaxed_bound = (1.0 + epsilon).powi(2);
        if let Some(f) = far {
            if best.map_or(true, |(_, bd)| plane_dist2 * relaxed_bound < bd) {
                self.search(f, query, epsilon, best);
            }
        }
    }
}

/// [`PointPairEstimator`] backed by a 2-D KD-tree: `set_model` builds the
/// tree, `find_pairs` runs one 1-NN query per query point.
pub struct FlannPointPairEstimator {
    index: Option<Flann2dIndex>,
    epsilon: f64,
}

impl FlannPointPairEstimator {
    pub fn new(epsilon: f64) -> Self {
        Self { index: None, epsilon }
    }
}

impl Default for FlannPointPairEstimator {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PointPairEstimator for FlannPointPairEstimator {
    fn set_model(&mut self, points: &[Point2d]) {
        self.index = Some(Flann2dIndex::build(points.to_vec()));
    }

    fn find_pairs(&self, query: &[Point2d]) -> Vec<PointPair> {
        let Some(index) = &self.index else { return Vec::new() };
        query
            .iter()
            .enumerate()
            .filter_map(|(query_index, &q)| {
                index.nearest(q, self.epsilon).map(|(model_index, distance)| PointPair {
                    model_index,
                    query_index,
                    distance,
                })
            })
            .collect()
    }
}
