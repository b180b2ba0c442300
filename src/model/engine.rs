use super::{ModelFunction, ModelParameters};
use crate::agent::AgentParameters;
use crate::error::LaunchError;
use crate::metrics::{MetricsCollector, OpinionSnapshot};
use crate::network::AdjacencyMatrix;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Everything the evolution step needs, already resolved and typed.
#[derive(Debug, Clone)]
pub struct EvolutionRequest {
    pub initial_opinions: Vec<f64>,
    pub adjacency: AdjacencyMatrix,
    pub agent_parameters: AgentParameters,
    pub model_parameters: ModelParameters,
    pub model: ModelFunction,
    pub num_steps: u64,
}

impl EvolutionRequest {
    fn check(&self) -> Result<(), LaunchError> {
        let n = self.initial_opinions.len();
        if self.adjacency.size() != n || self.agent_parameters.len() != n {
            return Err(LaunchError::invalid(
                "population",
                format!(
                    "{} opinions, {}x{} adjacency, {} agent parameter sets",
                    n,
                    self.adjacency.size(),
                    self.adjacency.size(),
                    self.agent_parameters.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Start and end state of a run plus per-step statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub initial_opinions: Vec<f64>,
    pub final_opinions: Vec<f64>,
    /// Opinions at every step, initial state first. Empty unless the engine
    /// was asked to keep history.
    pub history: Vec<Vec<f64>>,
    pub snapshots: Vec<OpinionSnapshot>,
}

pub trait EvolutionEngine {
    fn evolve(&mut self, request: EvolutionRequest) -> Result<Trace, LaunchError>;
}

/// Steps the model in-process.
#[derive(Debug, Clone)]
pub struct LocalEngine {
    show_progress: bool,
    keep_history: bool,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self {
            show_progress: true,
            keep_history: false,
        }
    }

    pub fn quiet() -> Self {
        Self {
            show_progress: false,
            keep_history: false,
        }
    }

    /// Keep every step's opinions in [`Trace::history`], O(agents x steps) memory.
    pub fn with_history(mut self) -> Self {
        self.keep_history = true;
        self
    }

    fn progress_bar(&self, steps: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(steps);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.orange/yellow} {pos}/{len} steps {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EvolutionEngine for LocalEngine {
    fn evolve(&mut self, request: EvolutionRequest) -> Result<Trace, LaunchError> {
        request.check()?;

        let mut metrics = MetricsCollector::new();
        let initial_opinions = request.initial_opinions;
        metrics.record(0, &initial_opinions);
        let mut history = Vec::new();
        if self.keep_history {
            history.push(initial_opinions.clone());
        }

        let mut current = initial_opinions.clone();

        let pb = self.progress_bar(request.num_steps);
        for step in 1..=request.num_steps {
            current = (request.model)(
                &current,
                &request.adjacency,
                &request.agent_parameters,
                &request.model_parameters,
            );
            let snapshot = metrics.record(step, &current);
            pb.set_message(format!("mean {:+.3} | abs {:.3}", snapshot.mean, snapshot.abs_mean));
            pb.inc(1);
            if self.keep_history {
                history.push(current.clone());
            }
        }
        pb.finish_with_message("Simulation complete");

        if let Some(last) = metrics.latest() {
            info!(
                "Final opinions: mean {:.4}, abs mean {:.4}, std {:.4}",
                last.mean, last.abs_mean, last.std_dev
            );
        }

        Ok(Trace {
            initial_opinions,
            final_opinions: current,
            history,
            snapshots: metrics.into_snapshots(),
        })
    }
}
