use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the coordinates of a node in voxel units
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Holds the geometric data attached to a node
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub node_squared_radius: f64,
    pub node_coordinates: Coordinates,
}

/// Holds a node of the centerline graph
///
/// The id is a string-encoded integer; ids are unique within a graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub metadata: NodeMetadata,
}

/// Holds the geometric data attached to an edge (capillary link)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeMetadata {
    pub link_length: f64,
    pub link_squared_radius: f64,
}

/// Holds an edge (capillary link) of the centerline graph
///
/// Source and target are string-encoded integer ids of existing nodes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub metadata: EdgeMetadata,
}

/// Holds the summary counters of the centerline graph
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub number_of_nodes: usize,
    pub number_of_links: usize,
}

/// Holds the nodes and edges of the centerline graph
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphData {
    pub metadata: GraphMetadata,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Represents the skeleton of a pore space as read from / written to JSON
///
/// This is the interchange format shared by the skeletonization pipeline, the
/// capillary bundle generator, the capillary network generator, and the
/// plotting tools. Coordinates, lengths, and radii are stored in voxel units;
/// multiplying by the voxel size recovers SI units.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CenterlineGraph {
    pub graph: GraphData,
}

impl Node {
    /// Allocates a new node
    pub fn new(id: usize, squared_radius: f64, x: f64, y: f64, z: f64) -> Self {
        Node {
            id: id.to_string(),
            metadata: NodeMetadata {
                node_squared_radius: squared_radius,
                node_coordinates: Coordinates { x, y, z },
            },
        }
    }
}

impl Edge {
    /// Allocates a new edge connecting two nodes given by index
    pub fn new(id: usize, source: usize, target: usize, length: f64, squared_radius: f64) -> Self {
        Edge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            metadata: EdgeMetadata {
                link_length: length,
                link_squared_radius: squared_radius,
            },
        }
    }
}

impl CenterlineGraph {
    /// Allocates a new graph from nodes and edges, filling the metadata counters
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        CenterlineGraph {
            graph: GraphData {
                metadata: GraphMetadata {
                    number_of_nodes: nodes.len(),
                    number_of_links: edges.len(),
                },
                nodes,
                edges,
            },
        }
    }

    /// Reads a JSON file containing the graph, sorted by ascending numeric id
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(&path).map_err(|_| "cannot open centerline file")?;
        let reader = BufReader::new(file);
        let mut graph: CenterlineGraph =
            serde_json::from_reader(reader).map_err(|_| "cannot parse centerline JSON file")?;
        graph.sort_by_id()?;
        Ok(graph)
    }

    /// Writes a compact JSON file with the graph
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }

    /// Writes a pretty (2-space indented) JSON file with the graph
    pub fn write_json_pretty<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer_pretty(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }

    /// Sorts nodes and edges in place by ascending numeric id
    pub fn sort_by_id(&mut self) -> Result<(), StrError> {
        for node in &self.graph.nodes {
            node.id.parse::<usize>().map_err(|_| "node id is not an integer")?;
        }
        for edge in &self.graph.edges {
            edge.id.parse::<usize>().map_err(|_| "edge id is not an integer")?;
        }
        self.graph.nodes.sort_by_key(|node| node.id.parse::<usize>().unwrap_or(0));
        self.graph.edges.sort_by_key(|edge| edge.id.parse::<usize>().unwrap_or(0));
        Ok(())
    }

    /// Returns the number of nodes
    pub fn nnode(&self) -> usize {
        self.graph.nodes.len()
    }

    /// Returns the number of edges
    pub fn nedge(&self) -> usize {
        self.graph.edges.len()
    }

    /// Extracts the x, y, and z coordinate arrays of all nodes
    pub fn node_coordinates(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let x = self.graph.nodes.iter().map(|n| n.metadata.node_coordinates.x).collect();
        let y = self.graph.nodes.iter().map(|n| n.metadata.node_coordinates.y).collect();
        let z = self.graph.nodes.iter().map(|n| n.metadata.node_coordinates.z).collect();
        (x, y, z)
    }

    /// Extracts the squared radii of all nodes
    pub fn node_squared_radii(&self) -> Vec<f64> {
        self.graph.nodes.iter().map(|n| n.metadata.node_squared_radius).collect()
    }

    /// Extracts the (source, target) node index arrays of all edges
    pub fn edge_endpoints(&self) -> Result<(Vec<usize>, Vec<usize>), StrError> {
        let mut sources = Vec::with_capacity(self.graph.edges.len());
        let mut targets = Vec::with_capacity(self.graph.edges.len());
        for edge in &self.graph.edges {
            sources.push(edge.source.parse().map_err(|_| "edge source is not an integer")?);
            targets.push(edge.target.parse().map_err(|_| "edge target is not an integer")?);
        }
        Ok((sources, targets))
    }

    /// Extracts the lengths of all edges (voxel units)
    pub fn link_lengths(&self) -> Vec<f64> {
        self.graph.edges.iter().map(|e| e.metadata.link_length).collect()
    }

    /// Extracts the squared radii of all edges (voxel units)
    pub fn link_squared_radii(&self) -> Vec<f64> {
        self.graph.edges.iter().map(|e| e.metadata.link_squared_radius).collect()
    }

    /// Computes the connectivity (degree) of every node
    ///
    /// The degree of node i is the number of edges having i as source or
    /// target. Fails if an edge references a node index outside the graph.
    pub fn connectivity(&self) -> Result<Vec<usize>, StrError> {
        let nnode = self.graph.nodes.len();
        let mut degree = vec![0; nnode];
        let (sources, targets) = self.edge_endpoints()?;
        for (s, t) in sources.iter().zip(targets.iter()) {
            if *s >= nnode || *t >= nnode {
                return Err("edge references an unknown node id");
            }
            degree[*s] += 1;
            degree[*t] += 1;
        }
        Ok(degree)
    }

    /// Returns the (min, max) corners of the node coordinate bounding box
    pub fn bounding_box(&self) -> Result<([f64; 3], [f64; 3]), StrError> {
        if self.graph.nodes.is_empty() {
            return Err("graph has no nodes");
        }
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for node in &self.graph.nodes {
            let c = &node.metadata.node_coordinates;
            for (i, v) in [c.x, c.y, c.z].iter().enumerate() {
                if *v < min[i] {
                    min[i] = *v;
                }
                if *v > max[i] {
                    max[i] = *v;
                }
            }
        }
        Ok((min, max))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
