pub mod params;
pub mod topology;

pub use params::TopologyParams;

use crate::error::LaunchError;
use rand::RngCore;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Dense weighted digraph, `get(i, j) != 0` means agent i listens to agent j.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjacencyMatrix {
    size: usize,
    weights: Vec<f64>,
}

impl AdjacencyMatrix {
    /// Largest `size` whose `size * size` weights stay addressable.
    pub fn max_size() -> usize {
        let cells = isize::MAX as usize / std::mem::size_of::<f64>();
        (cells as f64).sqrt() as usize
    }

    pub fn new(size: usize) -> Result<Self, LaunchError> {
        let cells = size
            .checked_mul(size)
            .filter(|_| size <= Self::max_size())
            .ok_or_else(|| LaunchError::invalid("num_agents", format!("{} agents do not fit a dense digraph", size)))?;
        Ok(Self {
            size,
            weights: vec![0.0; cells],
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.weights[i * self.size + j]
    }

    pub fn set(&mut self, i: usize, j: usize, weight: f64) {
        self.weights[i * self.size + j] = weight;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.weights[i * self.size..(i + 1) * self.size]
    }

    pub fn edges(&self) -> Vec<(usize, usize)> {
        (0..self.size)
            .flat_map(|i| (0..self.size).map(move |j| (i, j)))
            .filter(|&(i, j)| self.get(i, j) != 0.0)
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.weights.iter().filter(|w| **w != 0.0).count()
    }

    pub fn out_degree(&self, i: usize) -> usize {
        self.row(i).iter().filter(|w| **w != 0.0).count()
    }

    pub fn in_degree(&self, j: usize) -> usize {
        (0..self.size).filter(|&i| self.get(i, j) != 0.0).count()
    }

    pub fn normalise_rows(&mut self) {
        for i in 0..self.size {
            let total: f64 = self.row(i).iter().map(|w| w.abs()).sum();
            if total > 0.0 {
                for j in 0..self.size {
                    self.weights[i * self.size + j] /= total;
                }
            }
        }
    }

    /// Edge count plus in/out degree range, for `dig_prt`.
    pub fn summary(&self) -> String {
        let outs: Vec<usize> = (0..self.size).map(|i| self.out_degree(i)).collect();
        let ins: Vec<usize> = (0..self.size).map(|j| self.in_degree(j)).collect();
        let negative = self.weights.iter().filter(|w| **w < 0.0).count();
        format!(
            "{} agents, {} edges ({} negative), out-degree {}..{}, in-degree {}..{}",
            self.size,
            self.edge_count(),
            negative,
            outs.iter().min().copied().unwrap_or(0),
            outs.iter().max().copied().unwrap_or(0),
            ins.iter().min().copied().unwrap_or(0),
            ins.iter().max().copied().unwrap_or(0),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TopologyKind {
    Complete,
    Ring,
    SmallWorld,
    Random,
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TopologyKind::Complete => "complete",
            TopologyKind::Ring => "generalised ring",
            TopologyKind::SmallWorld => "small-world",
            TopologyKind::Random => "random",
        };
        write!(f, "{}", name)
    }
}

pub type TopologyBuilder = fn(usize, &TopologyParams, &mut dyn RngCore) -> Result<AdjacencyMatrix, LaunchError>;

pub fn builder(kind: TopologyKind) -> TopologyBuilder {
    match kind {
        TopologyKind::Complete => topology::complete,
        TopologyKind::Ring => topology::ring,
        TopologyKind::SmallWorld => topology::small_world,
        TopologyKind::Random => topology::random,
    }
}

/// Label → topology lookup, labels are case-insensitive.
pub struct TopologyRegistry {
    topologies: HashMap<String, TopologyKind>,
}

impl TopologyRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            topologies: HashMap::new(),
        };
        registry.register_builtin();
        registry
    }

    fn register_builtin(&mut self) {
        self.register("cd", TopologyKind::Complete);
        self.register("complete", TopologyKind::Complete);
        self.register("gr", TopologyKind::Ring);
        self.register("ring", TopologyKind::Ring);
        self.register("sw", TopologyKind::SmallWorld);
        self.register("small_world", TopologyKind::SmallWorld);
        self.register("small-world", TopologyKind::SmallWorld);
        self.register("rd", TopologyKind::Random);
        self.register("random", TopologyKind::Random);
    }

    pub fn register(&mut self, label: &str, kind: TopologyKind) {
        self.topologies.insert(label.to_lowercase(), kind);
    }

    pub fn resolve(&self, label: &str) -> Option<TopologyKind> {
        self.topologies.get(&label.trim().to_lowercase()).copied()
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .topologies
            .iter()
            .map(|(label, kind)| format!("{} ({})", label, kind))
            .collect();
        names.sort();
        names
    }

    pub fn global() -> &'static TopologyRegistry {
        use std::sync::OnceLock;
        static REGISTRY: OnceLock<TopologyRegistry> = OnceLock::new();
        REGISTRY.get_or_init(TopologyRegistry::new)
    }
}

impl Default for TopologyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
