pub mod agent;
pub mod error;
pub mod metrics;
pub mod model;
pub mod network;
pub mod opinions;
pub mod parameters;
pub mod prompt;
pub mod simulation;

pub use error::{ConfigError, DecodeError, LaunchError, ParameterError};
pub use parameters::{ParameterString, Value, extract};
pub use simulation::{ConfigAssembler, Simulation, SimulationConfig};

pub mod prelude {
    pub use crate::agent::{AgentParameters, AgentWeights};
    pub use crate::error::{ConfigError, LaunchError, ParameterError};
    pub use crate::metrics::{MetricsCollector, OpinionSnapshot};
    pub use crate::model::{EvolutionEngine, LocalEngine, ModelRegistry, Trace};
    pub use crate::network::{AdjacencyMatrix, TopologyKind, TopologyRegistry};
    pub use crate::parameters::{ParameterString, Value, decode, extract};
    pub use crate::prompt::Prompter;
    pub use crate::simulation::{ConfigAssembler, LaunchPlan, Simulation, SimulationConfig};
}
