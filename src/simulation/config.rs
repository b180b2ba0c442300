use crate::error::ParameterError;
use crate::parameters::{ParameterString, Value};
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_FILE_NAME: &str = "date";
pub const DEFAULT_NUM_AGENTS: &str = "100";
pub const DEFAULT_INITIAL_OPINION: &str = "io_loc=(0.5, 0.1); io_dis=[[0, -1.0, 1.0, 1]]; io_prt=True";
pub const DEFAULT_MODEL: &str = "mod_lab=\"CB\"";
pub const DEFAULT_AGENT_PARAMETERS: &str = "par_rep=(0.2, 0.3, 0.5); par_prt=True";
pub const DEFAULT_NETWORK: &str = "dig_lab=\"sw\"; dig_par=\"sig=(0, 1, 1, 1), alp=0.5\"; dig_prt=True";
pub const DEFAULT_NUM_STEPS: &str = "50";

/// Everything needed to launch one simulation.
///
/// Sub-fields hold decoded values as typed by the user; checking their shape
/// is left to the launcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    pub file_name: String,
    pub num_agents: u64,
    pub initial_opinion: InitialOpinionSpec,
    pub model: ModelSpec,
    pub agent_parameters: AgentParameterSpec,
    pub network: NetworkSpec,
    pub num_steps: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitialOpinionSpec {
    /// `(mean_abs, mean)`
    pub location: Option<Value>,
    pub tolerance: Option<Value>,
    pub method: Option<Value>,
    pub distribution: Option<Value>,
    pub print: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelSpec {
    pub label: Option<Value>,
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentParameterSpec {
    pub representation: Option<Value>,
    pub tolerance: Option<Value>,
    pub method: Option<Value>,
    pub print: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkSpec {
    pub label: Option<Value>,
    pub parameters: Option<Value>,
    pub print: Option<Value>,
}

fn parse_known<'a>(line: &'a str, known: &[&str]) -> ParameterString<'a> {
    let params = ParameterString::parse(line);
    for key in params.unknown_keys(known) {
        warn!("Ignoring unrecognised parameter '{}'", key);
    }
    params
}

impl InitialOpinionSpec {
    pub const KEYS: [&'static str; 5] = ["io_loc", "io_tol", "io_met", "io_dis", "io_prt"];

    pub fn from_parameters(line: &str) -> Result<Self, ParameterError> {
        let params = parse_known(line, &Self::KEYS);
        Ok(Self {
            location: params.lookup("io_loc")?,
            tolerance: params.lookup("io_tol")?,
            method: params.lookup("io_met")?,
            distribution: params.lookup("io_dis")?,
            print: params.lookup("io_prt")?,
        })
    }
}

impl ModelSpec {
    pub const KEYS: [&'static str; 2] = ["mod_lab", "mod_par"];

    pub fn from_parameters(line: &str) -> Result<Self, ParameterError> {
        let params = parse_known(line, &Self::KEYS);
        Ok(Self {
            label: params.lookup("mod_lab")?,
            parameters: params.lookup("mod_par")?,
        })
    }
}

impl AgentParameterSpec {
    pub const KEYS: [&'static str; 4] = ["par_rep", "par_tol", "par_met", "par_prt"];

    pub fn from_parameters(line: &str) -> Result<Self, ParameterError> {
        let params = parse_known(line, &Self::KEYS);
        Ok(Self {
            representation: params.lookup("par_rep")?,
            tolerance: params.lookup("par_tol")?,
            method: params.lookup("par_met")?,
            print: params.lookup("par_prt")?,
        })
    }
}

impl NetworkSpec {
    pub const KEYS: [&'static str; 3] = ["dig_lab", "dig_par", "dig_prt"];

    pub fn from_parameters(line: &str) -> Result<Self, ParameterError> {
        let params = parse_known(line, &Self::KEYS);
        Ok(Self {
            label: params.lookup("dig_lab")?,
            parameters: params.lookup("dig_par")?,
            print: params.lookup("dig_prt")?,
        })
    }
}

/// `print` flags only count when they are literally `True`.
pub fn flag(value: &Option<Value>) -> bool {
    value.as_ref().and_then(Value::as_bool).unwrap_or(false)
}

impl Default for SimulationConfig {
    /// The configuration produced by accepting every default.
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            num_agents: 100,
            initial_opinion: InitialOpinionSpec::from_parameters(DEFAULT_INITIAL_OPINION)
                .unwrap_or_default(),
            model: ModelSpec::from_parameters(DEFAULT_MODEL).unwrap_or_default(),
            agent_parameters: AgentParameterSpec::from_parameters(DEFAULT_AGENT_PARAMETERS)
                .unwrap_or_default(),
            network: NetworkSpec::from_parameters(DEFAULT_NETWORK).unwrap_or_default(),
            num_steps: 50,
        }
    }
}

impl SimulationConfig {
    pub fn with_agents(mut self, num_agents: u64) -> Self {
        self.num_agents = num_agents;
        self
    }

    pub fn with_steps(mut self, num_steps: u64) -> Self {
        self.num_steps = num_steps;
        self
    }

    pub fn with_network(mut self, line: &str) -> Result<Self, ParameterError> {
        self.network = NetworkSpec::from_parameters(line)?;
        Ok(self)
    }

    pub fn with_initial_opinion(mut self, line: &str) -> Result<Self, ParameterError> {
        self.initial_opinion = InitialOpinionSpec::from_parameters(line)?;
        Ok(self)
    }

    pub fn with_model(mut self, line: &str) -> Result<Self, ParameterError> {
        self.model = ModelSpec::from_parameters(line)?;
        Ok(self)
    }

    pub fn with_agent_parameters(mut self, line: &str) -> Result<Self, ParameterError> {
        self.agent_parameters = AgentParameterSpec::from_parameters(line)?;
        Ok(self)
    }
}
