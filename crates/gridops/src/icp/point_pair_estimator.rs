//! Point-pair search interface used by ICP to associate two point sets.

use geom::Point2d;

/// One correspondence found by a [`PointPairEstimator`]: `model[model_index]`
/// is the nearest model point to `query[query_index]`, at `distance`.
#[derive(Debug, Clone, Copy)]
pub struct PointPair {
    pub model_index: usize,
    pub query_index: usize,
    pub distance: f64,
}

/// Builds a search structure over a fixed point set (`set_model`) and then
/// answers nearest-neighbour queries against it (`find_pairs`).
pub trait PointPairEstimator {
    fn set_model(&mut self, points: &[Point2d]);
    fn find_pairs(&self, query: &[Point2d]) -> Vec<PointPair>;
}
