use crate::StrError;
use petgraph::unionfind::UnionFind;

/// Holds the result of a network health check
///
/// A healthy network consists of a single connected cluster. Pores outside
/// the largest cluster (including isolated pores) are listed for trimming.
#[derive(Clone, Debug)]
pub struct NetworkHealth {
    /// Number of disconnected clusters
    pub ncluster: usize,

    /// Pores with no throat at all
    pub isolated_pores: Vec<usize>,

    /// Pores outside the largest cluster
    pub trim_pores: Vec<usize>,
}

/// Implements a pore network as pore coordinates plus throat connections
///
/// Pores are points in 3D space (voxel units) and throats are unordered pairs
/// of pore indices. Flat (2D) networks simply hold a constant z coordinate.
#[derive(Clone, Debug)]
pub struct PoreNetwork {
    /// Pore coordinates
    pub coords: Vec<[f64; 3]>,

    /// Throat connections (pairs of pore indices)
    pub conns: Vec<[usize; 2]>,
}

/// Half-space edge-diagonal offsets of the 12-connectivity cubic lattice
const EDGE_OFFSETS: [[i64; 3]; 6] = [
    [1, 1, 0],
    [1, -1, 0],
    [1, 0, 1],
    [1, 0, -1],
    [0, 1, 1],
    [0, 1, -1],
];

impl PoreNetwork {
    /// Generates a regular cubic lattice with 6-neighbor (face) connectivity
    ///
    /// Pore (i,j,k) sits at (i,j,k) times the spacing.
    pub fn cubic(nx: usize, ny: usize, nz: usize, spacing: f64) -> Result<Self, StrError> {
        let coords = Self::lattice_coords(nx, ny, nz, spacing)?;
        let index = |i: usize, j: usize, k: usize| (i * ny + j) * nz + k;
        let mut conns = Vec::new();
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    if i + 1 < nx {
                        conns.push([index(i, j, k), index(i + 1, j, k)]);
                    }
                    if j + 1 < ny {
                        conns.push([index(i, j, k), index(i, j + 1, k)]);
                    }
                    if k + 1 < nz {
                        conns.push([index(i, j, k), index(i, j, k + 1)]);
                    }
                }
            }
        }
        Ok(PoreNetwork { coords, conns })
    }

    /// Generates a regular cubic lattice with 12-neighbor (edge-diagonal) connectivity
    pub fn cubic12(nx: usize, ny: usize, nz: usize, spacing: f64) -> Result<Self, StrError> {
        let coords = Self::lattice_coords(nx, ny, nz, spacing)?;
        let index = |i: usize, j: usize, k: usize| (i * ny + j) * nz + k;
        let in_range = |v: i64, n: usize| v >= 0 && (v as usize) < n;
        let mut conns = Vec::new();
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    for offset in &EDGE_OFFSETS {
                        let (ii, jj, kk) = (i as i64 + offset[0], j as i64 + offset[1], k as i64 + offset[2]);
                        if in_range(ii, nx) && in_range(jj, ny) && in_range(kk, nz) {
                            conns.push([index(i, j, k), index(ii as usize, jj as usize, kk as usize)]);
                        }
                    }
                }
            }
        }
        Ok(PoreNetwork { coords, conns })
    }

    /// Generates the coordinates of a regular lattice
    fn lattice_coords(nx: usize, ny: usize, nz: usize, spacing: f64) -> Result<Vec<[f64; 3]>, StrError> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err("lattice dimensions must be positive");
        }
        if spacing <= 0.0 || !spacing.is_finite() {
            return Err("lattice spacing must be positive");
        }
        let mut coords = Vec::with_capacity(nx * ny * nz);
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    coords.push([i as f64 * spacing, j as f64 * spacing, k as f64 * spacing]);
                }
            }
        }
        Ok(coords)
    }

    /// Returns the number of pores
    pub fn npore(&self) -> usize {
        self.coords.len()
    }

    /// Returns the number of throats
    pub fn nthroat(&self) -> usize {
        self.conns.len()
    }

    /// Finds the indices of all throats incident to a pore
    pub fn find_neighbor_throats(&self, pore: usize) -> Vec<usize> {
        self.conns
            .iter()
            .enumerate()
            .filter(|(_, conn)| conn[0] == pore || conn[1] == pore)
            .map(|(index, _)| index)
            .collect()
    }

    /// Finds the pores connected to a pore (unique, ascending)
    pub fn find_neighbor_pores(&self, pore: usize) -> Vec<usize> {
        let mut neighbors: Vec<usize> = self
            .conns
            .iter()
            .filter(|conn| conn[0] == pore || conn[1] == pore)
            .map(|conn| if conn[0] == pore { conn[1] } else { conn[0] })
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Removes the given throats, keeping all pores
    pub fn trim_throats(&mut self, throats: &[usize]) -> Result<(), StrError> {
        let mut keep = vec![true; self.conns.len()];
        for t in throats {
            if *t >= self.conns.len() {
                return Err("throat index is out of range");
            }
            keep[*t] = false;
        }
        let mut index = 0;
        self.conns.retain(|_| {
            let k = keep[index];
            index += 1;
            k
        });
        Ok(())
    }

    /// Removes the given pores along with their throats, renumbering the rest
    pub fn trim_pores(&mut self, pores: &[usize]) -> Result<(), StrError> {
        let npore = self.coords.len();
        let mut keep = vec![true; npore];
        for p in pores {
            if *p >= npore {
                return Err("pore index is out of range");
            }
            keep[*p] = false;
        }
        let mut new_index = vec![usize::MAX; npore];
        let mut count = 0;
        for i in 0..npore {
            if keep[i] {
                new_index[i] = count;
                count += 1;
            }
        }
        let mut index = 0;
        self.coords.retain(|_| {
            let k = keep[index];
            index += 1;
            k
        });
        self.conns.retain(|conn| keep[conn[0]] && keep[conn[1]]);
        for conn in self.conns.iter_mut() {
            conn[0] = new_index[conn[0]];
            conn[1] = new_index[conn[1]];
        }
        Ok(())
    }

    /// Appends a throat connecting two pores
    pub fn connect_pores(&mut self, p1: usize, p2: usize) -> Result<(), StrError> {
        if p1 >= self.coords.len() || p2 >= self.coords.len() {
            return Err("pore index is out of range");
        }
        if p1 == p2 {
            return Err("cannot connect a pore to itself");
        }
        self.conns.push([p1, p2]);
        Ok(())
    }

    /// Computes the Euclidean length of every throat
    pub fn throat_lengths(&self) -> Vec<f64> {
        self.conns
            .iter()
            .map(|conn| {
                let a = &self.coords[conn[0]];
                let b = &self.coords[conn[1]];
                let (dx, dy, dz) = (a[0] - b[0], a[1] - b[1], a[2] - b[2]);
                f64::sqrt(dx * dx + dy * dy + dz * dz)
            })
            .collect()
    }

    /// Checks the connectivity health of the network
    ///
    /// Clusters are found with union-find over the throat connections. All
    /// pores outside the largest cluster are reported for trimming.
    pub fn health(&self) -> NetworkHealth {
        let npore = self.coords.len();
        if npore == 0 {
            return NetworkHealth {
                ncluster: 0,
                isolated_pores: Vec::new(),
                trim_pores: Vec::new(),
            };
        }
        let mut forest = UnionFind::<usize>::new(npore);
        let mut degree = vec![0; npore];
        for conn in &self.conns {
            forest.union(conn[0], conn[1]);
            degree[conn[0]] += 1;
            degree[conn[1]] += 1;
        }
        let labels = forest.into_labeling();
        let mut cluster_size = vec![0; npore];
        for label in &labels {
            cluster_size[*label] += 1;
        }
        let ncluster = cluster_size.iter().filter(|size| **size > 0).count();
        let mut biggest = 0;
        for label in 0..npore {
            if cluster_size[label] > cluster_size[biggest] {
                biggest = label;
            }
        }
        let isolated_pores = (0..npore).filter(|p| degree[*p] == 0).collect();
        let trim_pores = (0..npore).filter(|p| labels[*p] != biggest).collect();
        NetworkHealth {
            ncluster,
            isolated_pores,
            trim_pores,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::PoreNetwork;
    use russell_lab::array_approx_eq;

    #[test]
    fn cubic_works() {
        let pn = PoreNetwork::cubic(2, 2, 2, 1.5).unwrap();
        assert_eq!(pn.npore(), 8);
        // 12 face connections in a 2x2x2 lattice
        assert_eq!(pn.nthroat(), 12);
        array_approx_eq(&pn.coords[0], &[0.0, 0.0, 0.0], 1e-15);
        array_approx_eq(&pn.coords[7], &[1.5, 1.5, 1.5], 1e-15);
        // every pore of a 2x2x2 cube touches exactly 3 faces
        for pore in 0..8 {
            assert_eq!(pn.find_neighbor_pores(pore).len(), 3);
        }
    }

    #[test]
    fn cubic_flat_works() {
        let pn = PoreNetwork::cubic(3, 3, 1, 1.0).unwrap();
        assert_eq!(pn.npore(), 9);
        assert_eq!(pn.nthroat(), 12);
        // center pore has 4 neighbors
        assert_eq!(pn.find_neighbor_pores(4), &[1, 3, 5, 7]);
    }

    #[test]
    fn cubic_captures_errors() {
        assert_eq!(
            PoreNetwork::cubic(0, 2, 2, 1.0).err(),
            Some("lattice dimensions must be positive")
        );
        assert_eq!(
            PoreNetwork::cubic(2, 2, 2, 0.0).err(),
            Some("lattice spacing must be positive")
        );
    }

    #[test]
    fn cubic12_works() {
        let pn = PoreNetwork::cubic12(3, 3, 3, 1.0).unwrap();
        assert_eq!(pn.npore(), 27);
        // center pore connects to its 12 edge-diagonal neighbors
        let center = (1 * 3 + 1) * 3 + 1;
        assert_eq!(pn.find_neighbor_pores(center).len(), 12);
        // all throats have length sqrt(2)
        let lengths = pn.throat_lengths();
        for length in &lengths {
            assert!((length - f64::sqrt(2.0)).abs() < 1e-14);
        }
    }

    #[test]
    fn neighbor_queries_work() {
        // path 0-1-2 plus isolated pore 3
        let pn = PoreNetwork {
            coords: vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [5.0, 5.0, 5.0]],
            conns: vec![[0, 1], [1, 2]],
        };
        assert_eq!(pn.find_neighbor_throats(1), &[0, 1]);
        assert_eq!(pn.find_neighbor_pores(1), &[0, 2]);
        assert_eq!(pn.find_neighbor_throats(3).len(), 0);
    }

    #[test]
    fn trim_throats_works() {
        let mut pn = PoreNetwork::cubic(2, 2, 1, 1.0).unwrap();
        assert_eq!(pn.nthroat(), 4);
        pn.trim_throats(&[0, 2]).unwrap();
        assert_eq!(pn.nthroat(), 2);
        assert_eq!(pn.npore(), 4);
        assert_eq!(pn.trim_throats(&[100]).err(), Some("throat index is out of range"));
    }

    #[test]
    fn trim_pores_works() {
        // square 0-1-3-2 with pore 4 dangling off pore 3
        let mut pn = PoreNetwork {
            coords: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
                [2.0, 1.0, 0.0],
            ],
            conns: vec![[0, 1], [0, 2], [1, 3], [2, 3], [3, 4]],
        };
        pn.trim_pores(&[1]).unwrap();
        assert_eq!(pn.npore(), 4);
        // remaining pores renumbered: 0->0, 2->1, 3->2, 4->3
        assert_eq!(pn.conns, &[[0, 1], [1, 2], [2, 3]]);
        array_approx_eq(&pn.coords[3], &[2.0, 1.0, 0.0], 1e-15);
        assert_eq!(pn.trim_pores(&[100]).err(), Some("pore index is out of range"));
    }

    #[test]
    fn connect_pores_works() {
        let mut pn = PoreNetwork::cubic(2, 1, 1, 1.0).unwrap();
        pn.connect_pores(0, 1).unwrap();
        assert_eq!(pn.nthroat(), 2);
        assert_eq!(pn.connect_pores(0, 9).err(), Some("pore index is out of range"));
        assert_eq!(pn.connect_pores(1, 1).err(), Some("cannot connect a pore to itself"));
    }

    #[test]
    fn throat_lengths_works() {
        let pn = PoreNetwork {
            coords: vec![[0.0; 3], [3.0, 4.0, 0.0]],
            conns: vec![[0, 1]],
        };
        array_approx_eq(&pn.throat_lengths(), &[5.0], 1e-15);
    }

    #[test]
    fn health_works() {
        // two clusters: square 0-1-2-3 and pair 4-5, plus isolated pore 6
        let pn = PoreNetwork {
            coords: vec![[0.0; 3]; 7],
            conns: vec![[0, 1], [1, 2], [2, 3], [3, 0], [4, 5]],
        };
        let health = pn.health();
        assert_eq!(health.ncluster, 3);
        assert_eq!(health.isolated_pores, &[6]);
        assert_eq!(health.trim_pores, &[4, 5, 6]);
    }

    #[test]
    fn health_of_healthy_network_is_clean() {
        let pn = PoreNetwork::cubic(3, 3, 3, 1.0).unwrap();
        let health = pn.health();
        assert_eq!(health.ncluster, 1);
        assert_eq!(health.isolated_pores.len(), 0);
        assert_eq!(health.trim_pores.len(), 0);
    }
}
