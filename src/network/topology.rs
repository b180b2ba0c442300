// Constructors only draw random numbers when a randomised knob asks for it,
// so a plain complete/ring digraph is deterministic.

use super::AdjacencyMatrix;
use super::params::TopologyParams;
use crate::error::LaunchError;
use rand::{Rng, RngCore};

pub fn complete(
    num_agents: usize,
    params: &TopologyParams,
    rng: &mut dyn RngCore,
) -> Result<AdjacencyMatrix, LaunchError> {
    let mut m = AdjacencyMatrix::new(num_agents)?;
    for i in 0..num_agents {
        for j in 0..num_agents {
            if i != j {
                m.set(i, j, 1.0);
            }
        }
    }
    Ok(finish(m, params, rng))
}

/// Generalised ring.
pub fn ring(
    num_agents: usize,
    params: &TopologyParams,
    rng: &mut dyn RngCore,
) -> Result<AdjacencyMatrix, LaunchError> {
    Ok(finish(ring_edges(num_agents, &params.signature)?, params, rng))
}

pub fn small_world(
    num_agents: usize,
    params: &TopologyParams,
    rng: &mut dyn RngCore,
) -> Result<AdjacencyMatrix, LaunchError> {
    let base = ring_edges(num_agents, &params.signature)?;
    let mut m = AdjacencyMatrix::new(num_agents)?;

    for (i, j) in base.edges() {
        let mut target = j;
        if i != j && num_agents > 2 && params.change_probability > 0.0 && rng.gen_bool(params.change_probability) {
            // rewire to a random agent other than i
            let k = rng.gen_range(0..num_agents - 1);
            target = if k >= i { k + 1 } else { k };
        }

        let (from, to) = if params.reverse_probability > 0.0 && rng.gen_bool(params.reverse_probability) {
            (target, i)
        } else {
            (i, target)
        };
        m.set(from, to, 1.0);

        if params.bidirectional_probability > 0.0 && rng.gen_bool(params.bidirectional_probability) {
            m.set(to, from, 1.0);
        }
    }

    Ok(finish(m, params, rng))
}

pub fn random(
    num_agents: usize,
    params: &TopologyParams,
    rng: &mut dyn RngCore,
) -> Result<AdjacencyMatrix, LaunchError> {
    let mut m = AdjacencyMatrix::new(num_agents)?;
    for i in 0..num_agents {
        for j in 0..num_agents {
            if i != j && rng.gen_bool(params.edge_probability) {
                m.set(i, j, 1.0);
            }
        }
    }
    Ok(finish(m, params, rng))
}

fn ring_edges(num_agents: usize, signature: &[f64]) -> Result<AdjacencyMatrix, LaunchError> {
    let mut m = AdjacencyMatrix::new(num_agents)?;
    if num_agents == 0 {
        return Ok(m);
    }
    for (offset, weight) in signature.iter().enumerate() {
        if *weight == 0.0 {
            continue;
        }
        for i in 0..num_agents {
            m.set(i, (i + offset) % num_agents, 1.0);
        }
    }
    Ok(m)
}

/// Extra random edges, edge signs, row normalisation.
fn finish(mut m: AdjacencyMatrix, params: &TopologyParams, rng: &mut dyn RngCore) -> AdjacencyMatrix {
    let n = m.size();

    if n > 1 {
        for _ in 0..params.random_edges {
            let i = rng.gen_range(0..n);
            let k = rng.gen_range(0..n - 1);
            let j = if k >= i { k + 1 } else { k };
            m.set(i, j, 1.0);
        }
    }

    if params.positive_edge_ratio < 1.0 {
        for (i, j) in m.edges() {
            if !rng.gen_bool(params.positive_edge_ratio) {
                m.set(i, j, -1.0);
            }
        }
    }

    if params.row_stochastic {
        m.normalise_rows();
    }

    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn complete_has_every_off_diagonal_edge() {
        let mut rng = StdRng::seed_from_u64(0);
        let m = complete(5, &TopologyParams::default(), &mut rng).unwrap();
        assert_eq!(m.edge_count(), 20);
        assert_eq!(m.get(2, 2), 0.0);
    }

    #[test]
    fn ring_follows_signature() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = TopologyParams {
            signature: vec![0.0, 1.0, 0.0, 1.0],
            ..TopologyParams::default()
        };
        let m = ring(6, &params, &mut rng).unwrap();
        assert_eq!(m.edge_count(), 12);
        assert_eq!(m.get(5, 0), 1.0);
        assert_eq!(m.get(5, 2), 1.0);
        assert_eq!(m.get(5, 1), 0.0);
    }

    #[test]
    fn ring_self_loops_from_signature_head() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = TopologyParams {
            signature: vec![1.0, 1.0],
            ..TopologyParams::default()
        };
        let m = ring(4, &params, &mut rng).unwrap();
        assert_eq!(m.get(3, 3), 1.0);
        assert_eq!(m.edge_count(), 8);
    }

    #[test]
    fn deterministic_without_randomised_knobs() {
        let params = TopologyParams::default();
        let a = ring(10, &params, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = ring(10, &params, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(a, b);
        let a = small_world(10, &params, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn small_world_rewiring_keeps_out_degree() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = TopologyParams {
            signature: vec![0.0, 1.0],
            change_probability: 1.0,
            ..TopologyParams::default()
        };
        let m = small_world(20, &params, &mut rng).unwrap();
        for i in 0..20 {
            assert_eq!(m.out_degree(i), 1);
            assert_eq!(m.get(i, i), 0.0);
        }
    }

    #[test]
    fn random_edge_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(4);
        let none = TopologyParams { edge_probability: 0.0, ..TopologyParams::default() };
        let all = TopologyParams { edge_probability: 1.0, ..TopologyParams::default() };
        assert_eq!(random(8, &none, &mut rng).unwrap().edge_count(), 0);
        assert_eq!(random(8, &all, &mut rng).unwrap().edge_count(), 56);
    }

    #[test]
    fn signs_and_row_stochastic() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = TopologyParams {
            positive_edge_ratio: 0.0,
            row_stochastic: true,
            ..TopologyParams::default()
        };
        let m = complete(4, &params, &mut rng).unwrap();
        for i in 0..4 {
            let row: f64 = (0..4).map(|j| m.get(i, j)).sum();
            assert!((row + 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn oversized_population_is_an_error() {
        let mut rng = StdRng::seed_from_u64(6);
        let params = TopologyParams::default();
        assert!(ring(usize::MAX, &params, &mut rng).is_err());
        assert!(complete(1 << 40, &params, &mut rng).is_err());
    }
}
