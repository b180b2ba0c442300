pub mod assembler;
pub mod config;

pub use assembler::{ConfigAssembler, Stage};
pub use config::SimulationConfig;

use crate::agent::AgentParameters;
use crate::error::LaunchError;
use crate::model::{EvolutionEngine, EvolutionRequest, ModelFunction, ModelParameters, ModelRegistry, Trace};
use crate::network::{self, AdjacencyMatrix, TopologyKind, TopologyParams, TopologyRegistry};
use crate::opinions::adjust::DEFAULT_TOLERANCE;
use crate::opinions::{self, AdjustMethod, MixtureSampler, OpinionSampler};
use crate::parameters::{Value, decode};
use config::flag;
use rand::{Rng, RngCore};
use tracing::{info, warn};

const HISTOGRAM_BINS: usize = 20;

/// Where the network stage points: a known topology plus its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkPlan {
    pub label: String,
    pub kind: TopologyKind,
    /// `dig_par` exactly as typed.
    pub raw_parameters: Option<String>,
    pub parameters: TopologyParams,
}

/// A fully resolved launch, ready for an engine.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub name: String,
    pub adjust_method: AdjustMethod,
    pub network: NetworkPlan,
    pub model_label: String,
    pub request: EvolutionRequest,
}

/// Turns a [`SimulationConfig`] into engine input.
///
/// All randomness comes from the generator passed in, so a seeded generator
/// gives a reproducible launch.
pub struct Simulation<R> {
    config: SimulationConfig,
    rng: R,
    sampler: Box<dyn OpinionSampler>,
}

impl<R: RngCore> Simulation<R> {
    pub fn new(config: SimulationConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            sampler: Box::new(MixtureSampler),
        }
    }

    pub fn with_sampler(mut self, sampler: impl OpinionSampler + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn num_agents(&self) -> Result<usize, LaunchError> {
        match usize::try_from(self.config.num_agents) {
            Ok(0) => Err(LaunchError::NoAgents),
            Ok(n) if n <= AdjacencyMatrix::max_size() => Ok(n),
            _ => Err(LaunchError::invalid(
                "num_agents",
                format!(
                    "{} agents is more than the {} a dense digraph can hold",
                    self.config.num_agents,
                    AdjacencyMatrix::max_size()
                ),
            )),
        }
    }

    /// `date` means "name it after the current time".
    pub fn resolve_name(&self) -> String {
        if self.config.file_name == config::DEFAULT_FILE_NAME {
            chrono::Local::now().format("sim_%Y%m%d_%H%M%S").to_string()
        } else {
            self.config.file_name.clone()
        }
    }

    /// `io_loc` as `(mean_abs, mean)`.
    pub fn resolve_location(&self) -> Result<(f64, f64), LaunchError> {
        let value = self
            .config
            .initial_opinion
            .location
            .as_ref()
            .ok_or(LaunchError::MissingParameter("io_loc"))?;

        let pair = value
            .items()
            .filter(|items| items.len() == 2)
            .and_then(|items| Some((items[0].as_f64()?, items[1].as_f64()?)))
            .ok_or_else(|| LaunchError::invalid("io_loc", format!("{} is not a (mean_abs, mean) pair", value)))?;

        let (abs_mean, mean) = pair;
        if !(0.0..=1.0).contains(&abs_mean) || mean.abs() > 1.0 {
            return Err(LaunchError::invalid("io_loc", format!("{} is outside [-1, 1]", value)));
        }
        if mean.abs() > abs_mean {
            warn!("|mean| {} exceeds mean_abs {}, the target cannot be met exactly", mean, abs_mean);
        }
        Ok(pair)
    }

    fn resolve_tolerance(&self) -> Result<f64, LaunchError> {
        match self.config.initial_opinion.tolerance.as_ref() {
            None => Ok(DEFAULT_TOLERANCE),
            Some(v) => v
                .as_f64()
                .filter(|t| t.is_finite() && *t >= 0.0)
                .ok_or_else(|| LaunchError::invalid("io_tol", format!("{} is not a finite non-negative number", v))),
        }
    }

    /// Unset picks one of the two at random. Anything other than 1 or 2 is
    /// reported and treated as 2.
    pub fn resolve_adjust_method(&mut self) -> AdjustMethod {
        match self.config.initial_opinion.method.as_ref() {
            None => {
                if self.rng.gen_bool(0.5) {
                    AdjustMethod::Global
                } else {
                    AdjustMethod::Individual
                }
            }
            Some(v) => match AdjustMethod::from_value(v) {
                Some(method) => method,
                None => {
                    warn!("The method should be a number between 1 and 2 (got {}), using method 2", v);
                    AdjustMethod::Individual
                }
            },
        }
    }

    /// Sample the initial opinions and pull them towards `io_loc`.
    pub fn initial_opinions(&mut self) -> Result<(Vec<f64>, AdjustMethod), LaunchError> {
        let num_agents = self.num_agents()?;
        let (abs_mean, mean) = self.resolve_location()?;
        let tolerance = self.resolve_tolerance()?;

        let default_distribution;
        let distribution = match self.config.initial_opinion.distribution.as_ref() {
            Some(spec) => spec,
            None => {
                default_distribution = decode(opinions::DEFAULT_DISTRIBUTION)
                    .map_err(|e| LaunchError::invalid("io_dis", e.to_string()))?;
                &default_distribution
            }
        };

        let raw = self.sampler.sample(num_agents, distribution, &mut self.rng)?;
        let method = self.resolve_adjust_method();
        info!("Adjusting initial opinions with method {}", method.code());
        let adjusted = method.adjust(raw, mean, abs_mean, tolerance, &mut self.rng);

        Ok((adjusted, method))
    }

    /// Match `dig_lab` to a topology. Unknown labels are a hard error.
    pub fn resolve_network(&self) -> Result<NetworkPlan, LaunchError> {
        let spec = &self.config.network;
        let label = match spec.label.as_ref() {
            None => return Err(LaunchError::MissingParameter("dig_lab")),
            Some(Value::Str(label)) => label.clone(),
            Some(other) => {
                return Err(LaunchError::UnrecognizedLabel {
                    kind: "network",
                    label: other.to_string(),
                });
            }
        };

        let kind = TopologyRegistry::global()
            .resolve(&label)
            .ok_or_else(|| LaunchError::UnrecognizedLabel {
                kind: "network",
                label: label.clone(),
            })?;

        let raw_parameters = spec.parameters.as_ref().and_then(Value::as_str).map(str::to_string);
        let parameters = TopologyParams::from_value(spec.parameters.as_ref())?;

        Ok(NetworkPlan {
            label,
            kind,
            raw_parameters,
            parameters,
        })
    }

    pub fn build_network(&mut self, plan: &NetworkPlan) -> Result<AdjacencyMatrix, LaunchError> {
        let num_agents = self.num_agents()?;
        info!("Building {} digraph ({}) for {} agents", plan.kind, plan.label, num_agents);
        let build = network::builder(plan.kind);
        build(num_agents, &plan.parameters, &mut self.rng)
    }

    pub fn resolve_model(&self) -> Result<(String, ModelFunction, ModelParameters), LaunchError> {
        let spec = &self.config.model;
        let label = match spec.label.as_ref() {
            None => return Err(LaunchError::MissingParameter("mod_lab")),
            Some(Value::Str(label)) => label.clone(),
            Some(other) => {
                return Err(LaunchError::UnrecognizedLabel {
                    kind: "model",
                    label: other.to_string(),
                });
            }
        };

        let function = ModelRegistry::global()
            .resolve(&label)
            .ok_or_else(|| LaunchError::UnrecognizedLabel {
                kind: "model",
                label: label.clone(),
            })?;
        let parameters = ModelParameters::from_value(spec.parameters.as_ref())?;

        Ok((label, function, parameters))
    }

    /// Resolve everything the engine needs without running it.
    pub fn prepare(&mut self) -> Result<LaunchPlan, LaunchError> {
        let name = self.resolve_name();
        info!("Preparing simulation: {}", name);

        let (initial_opinions, adjust_method) = self.initial_opinions()?;
        if flag(&self.config.initial_opinion.print) {
            println!("\nInitial opinions");
            print!("{}", opinions::histogram(&initial_opinions, HISTOGRAM_BINS));
        }

        let network = self.resolve_network()?;
        let adjacency = self.build_network(&network)?;
        if flag(&self.config.network.print) {
            println!("\nDigraph: {}", adjacency.summary());
        }

        let (model_label, model, model_parameters) = self.resolve_model()?;

        let agent_parameters =
            AgentParameters::resolve(&self.config.agent_parameters, initial_opinions.len(), &mut self.rng)?;
        if flag(&self.config.agent_parameters.print) {
            println!("\nAgent parameters: {}", agent_parameters.summary());
        }

        Ok(LaunchPlan {
            name,
            adjust_method,
            network,
            model_label,
            request: EvolutionRequest {
                initial_opinions,
                adjacency,
                agent_parameters,
                model_parameters,
                model,
                num_steps: self.config.num_steps,
            },
        })
    }

    /// Prepare, then hand off to `engine`.
    pub fn run(&mut self, engine: &mut dyn EvolutionEngine) -> Result<Trace, LaunchError> {
        let plan = self.prepare()?;
        info!(
            "Starting simulation {}: model {}, {} steps",
            plan.name, plan.model_label, plan.request.num_steps
        );
        engine.evolve(plan.request)
    }
}
