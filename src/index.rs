use crate::types::PointRecord;
use crate::viewport::Viewport;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

// Position of a record plus its offset in the dataset slice.
struct IndexedPoint {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree over the located records of a dataset. Holds offsets only, so it
/// must be queried together with the slice it was built from.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    pub fn build(points: &[PointRecord]) -> Self {
        let items: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.coordinate().map(|p| IndexedPoint {
                    index,
                    position: [p.x(), p.y()],
                })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(items),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offsets of the points inside `bounds`, ascending.
    pub fn within(&self, bounds: &Viewport) -> Vec<usize> {
        let rect = bounds.rect();
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|item| item.index)
            .collect();
        // keep dataset order so tie-breaking matches a linear scan
        hits.sort_unstable();
        hits
    }

    /// Offset of the closest point no further than `max_distance` degrees.
    pub fn nearest(&self, lon: f64, lat: f64, max_distance: f64) -> Option<usize> {
        let query = [lon, lat];
        self.tree
            .nearest_neighbor(&query)
            .filter(|item| item.distance_2(&query) <= max_distance * max_distance)
            .map(|item| item.index)
    }
}
