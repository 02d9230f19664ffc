use super::PoreNetwork;
use crate::StrError;
use rand::Rng;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use std::collections::HashSet;

/// Number of nearest-neighbor candidates examined per point
///
/// Gabriel edges connect close points; candidate pairs beyond the 26 nearest
/// neighbors are practically never Gabriel edges for the point densities
/// handled here.
const GABRIEL_KNN: usize = 26;

/// A point in the spatial index with its pore index
#[derive(Clone, Copy, Debug, PartialEq)]
struct IndexedPoint {
    index: usize,
    coords: [f64; 3],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let (dx, dy, dz) = (
            self.coords[0] - point[0],
            self.coords[1] - point[1],
            self.coords[2] - point[2],
        );
        dx * dx + dy * dy + dz * dz
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let (dx, dy, dz) = (a[0] - b[0], a[1] - b[1], a[2] - b[2]);
    dx * dx + dy * dy + dz * dz
}

impl PoreNetwork {
    /// Generates a Gabriel graph over the given points
    ///
    /// An edge (p,q) belongs to the Gabriel graph iff the open ball having pq
    /// as diameter contains no other point. Candidate pairs come from the
    /// nearest neighbors of each point (R*-tree query); each candidate is then
    /// checked with an exact empty-ball test on the midpoint.
    pub fn gabriel(points: &[[f64; 3]]) -> Result<Self, StrError> {
        if points.len() < 2 {
            return Err("at least two points are required");
        }
        let items: Vec<_> = points
            .iter()
            .enumerate()
            .map(|(index, coords)| IndexedPoint { index, coords: *coords })
            .collect();
        let tree = RTree::bulk_load(items);
        let mut seen = HashSet::new();
        let mut conns = Vec::new();
        for (i, p) in points.iter().enumerate() {
            for candidate in tree.nearest_neighbor_iter(p).take(GABRIEL_KNN + 1) {
                let j = candidate.index;
                if j == i {
                    continue;
                }
                let pair = (usize::min(i, j), usize::max(i, j));
                if !seen.insert(pair) {
                    continue;
                }
                let q = &candidate.coords;
                let mid = [(p[0] + q[0]) / 2.0, (p[1] + q[1]) / 2.0, (p[2] + q[2]) / 2.0];
                let radius2 = squared_distance(p, q) / 4.0;
                let blocked = tree.locate_within_distance(mid, radius2).any(|other| {
                    other.index != i
                        && other.index != j
                        && squared_distance(&other.coords, &mid) < radius2 * (1.0 - 1e-12)
                });
                if !blocked {
                    conns.push([pair.0, pair.1]);
                }
            }
        }
        conns.sort_unstable();
        Ok(PoreNetwork {
            coords: points.to_vec(),
            conns,
        })
    }
}

/// Seeds the point cloud for a Gabriel network
///
/// Scatters `npoint` uniform random points in the box `[0,lx] x [0,ly] x [0,lz]`
/// and adds regularly spaced inlet/outlet points on the domain boundary so
/// that the network has entry and exit pores. For flat domains (`lz == 0`)
/// the boundary points lie on the four edges of the rectangle; otherwise they
/// cover the six faces of the box.
pub fn gabriel_seed_points<R: Rng>(
    lx: f64,
    ly: f64,
    lz: f64,
    nx: usize,
    ny: usize,
    nz: usize,
    npoint: usize,
    rng: &mut R,
) -> Vec<[f64; 3]> {
    let mut points = Vec::new();
    let nnx = nx / 2;
    let nny = ny / 2;
    if lz == 0.0 {
        // inlet edges at y = 0 and x = 0
        for i in 0..nnx {
            points.push([i as f64 * (lx / nnx as f64), 0.0, 0.0]);
        }
        for i in 0..nny {
            points.push([0.0, i as f64 * (ly / nny as f64), 0.0]);
        }
        for _ in 0..npoint {
            points.push([rng.gen::<f64>() * lx, rng.gen::<f64>() * ly, 0.0]);
        }
        // outlet edges at y = ly and x = lx
        for i in 0..nnx {
            points.push([i as f64 * (lx / nnx as f64), ly, 0.0]);
        }
        for i in 0..nny {
            points.push([lx, i as f64 * (ly / nny as f64), 0.0]);
        }
    } else {
        let nnz = nz / 2;
        // inlet faces at z = 0, y = 0, and x = 0
        for i in 0..nnx {
            for j in 0..nny {
                points.push([i as f64 * (lx / nnx as f64), j as f64 * (ly / nny as f64), 0.0]);
            }
        }
        for i in 0..nnx {
            for k in 0..nnz {
                points.push([i as f64 * (lx / nnx as f64), 0.0, k as f64 * (lz / nnz as f64)]);
            }
        }
        for j in 0..nny {
            for k in 0..nnz {
                points.push([0.0, j as f64 * (ly / nny as f64), k as f64 * (lz / nnz as f64)]);
            }
        }
        for _ in 0..npoint {
            points.push([rng.gen::<f64>() * lx, rng.gen::<f64>() * ly, rng.gen::<f64>() * lz]);
        }
        // outlet faces at z = lz, y = ly, and x = lx
        for i in 0..nnx {
            for j in 0..nny {
                points.push([i as f64 * (lx / nnx as f64), j as f64 * (ly / nny as f64), lz]);
            }
        }
        for i in 0..nnx {
            for k in 0..nnz {
                points.push([i as f64 * (lx / nnx as f64), ly, k as f64 * (lz / nnz as f64)]);
            }
        }
        for j in 0..nny {
            for k in 0..nnz {
                points.push([lx, j as f64 * (ly / nny as f64), k as f64 * (lz / nnz as f64)]);
            }
        }
    }
    points
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::gabriel_seed_points;
    use crate::PoreNetwork;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn gabriel_of_triangle_with_centroid_works() {
        // the centroid blocks all three triangle sides, so only the
        // vertex-to-centroid edges survive
        let points = [
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [1.0, 1.8, 0.0],
            [1.0, 0.6, 0.0],
        ];
        let pn = PoreNetwork::gabriel(&points).unwrap();
        assert_eq!(pn.conns, &[[0, 3], [1, 3], [2, 3]]);
    }

    #[test]
    fn gabriel_keeps_clear_diagonal() {
        // three points: the long edge (0,2) is blocked by the middle point
        let points = [[0.0, 0.0, 0.0], [1.0, 0.1, 0.0], [2.0, 0.0, 0.0]];
        let pn = PoreNetwork::gabriel(&points).unwrap();
        assert_eq!(pn.conns, &[[0, 1], [1, 2]]);
    }

    #[test]
    fn gabriel_connects_all_points() {
        // the Gabriel graph contains the Euclidean MST, hence is connected
        let mut rng = StdRng::seed_from_u64(7);
        let points = gabriel_seed_points(10.0, 10.0, 10.0, 4, 4, 4, 50, &mut rng);
        let pn = PoreNetwork::gabriel(&points).unwrap();
        assert_eq!(pn.npore(), points.len());
        let health = pn.health();
        assert_eq!(health.ncluster, 1);
        assert_eq!(health.trim_pores.len(), 0);
    }

    #[test]
    fn gabriel_captures_errors() {
        assert_eq!(
            PoreNetwork::gabriel(&[[0.0; 3]]).err(),
            Some("at least two points are required")
        );
    }

    #[test]
    fn seed_points_flat_works() {
        let mut rng = StdRng::seed_from_u64(3);
        let points = gabriel_seed_points(8.0, 6.0, 0.0, 4, 4, 1, 10, &mut rng);
        // 2 + 2 inlet, 10 interior, 2 + 2 outlet
        assert_eq!(points.len(), 18);
        for p in &points {
            assert_eq!(p[2], 0.0);
            assert!(p[0] >= 0.0 && p[0] <= 8.0);
            assert!(p[1] >= 0.0 && p[1] <= 6.0);
        }
        // first inlet point sits at the origin corner
        assert_eq!(points[0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn seed_points_3d_works() {
        let mut rng = StdRng::seed_from_u64(3);
        let points = gabriel_seed_points(8.0, 6.0, 4.0, 4, 4, 4, 20, &mut rng);
        // 3 faces x 4 points inlet, 20 interior, 3 faces x 4 points outlet
        assert_eq!(points.len(), 44);
        let on_z0 = points.iter().filter(|p| p[2] == 0.0).count();
        assert!(on_z0 >= 4);
    }
}
