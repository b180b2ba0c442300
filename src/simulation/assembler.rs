use super::config::*;
use crate::error::{ConfigError, ParameterError};
use crate::prompt::Prompter;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

const WELCOME: &str = "Creation of a new simulation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Identity,
    InitialOpinion,
    Model,
    AgentParameters,
    Network,
    Horizon,
    Done,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::Identity => Stage::InitialOpinion,
            Stage::InitialOpinion => Stage::Model,
            Stage::Model => Stage::AgentParameters,
            Stage::AgentParameters => Stage::Network,
            Stage::Network => Stage::Horizon,
            Stage::Horizon | Stage::Done => Stage::Done,
        }
    }

    /// Prompt text and default for stages driven by a parameter string.
    fn parameter_prompt(self) -> Option<(&'static str, &'static str)> {
        match self {
            Stage::InitialOpinion => Some(("Enter initial opinion characterisation", DEFAULT_INITIAL_OPINION)),
            Stage::Model => Some(("Enter model", DEFAULT_MODEL)),
            Stage::AgentParameters => Some(("Enter agent parameter characterisation", DEFAULT_AGENT_PARAMETERS)),
            Stage::Network => Some(("Enter underlying digraph characterisation", DEFAULT_NETWORK)),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Draft {
    file_name: Option<String>,
    num_agents: Option<u64>,
    initial_opinion: Option<InitialOpinionSpec>,
    model: Option<ModelSpec>,
    agent_parameters: Option<AgentParameterSpec>,
    network: Option<NetworkSpec>,
    num_steps: Option<u64>,
}

impl Draft {
    fn finish(self) -> Result<SimulationConfig, ConfigError> {
        Ok(SimulationConfig {
            file_name: self.file_name.ok_or(ConfigError::Incomplete("file_name"))?,
            num_agents: self.num_agents.ok_or(ConfigError::Incomplete("num_agents"))?,
            initial_opinion: self.initial_opinion.ok_or(ConfigError::Incomplete("initial_opinion"))?,
            model: self.model.ok_or(ConfigError::Incomplete("model"))?,
            agent_parameters: self.agent_parameters.ok_or(ConfigError::Incomplete("agent_parameters"))?,
            network: self.network.ok_or(ConfigError::Incomplete("network"))?,
            num_steps: self.num_steps.ok_or(ConfigError::Incomplete("num_steps"))?,
        })
    }
}

/// Walks the user through the configuration stages, one pass per run.
pub struct ConfigAssembler<R, W> {
    prompter: Prompter<R, W>,
    stage: Stage,
    draft: Draft,
}

impl<R: BufRead, W: Write> ConfigAssembler<R, W> {
    pub fn new(prompter: Prompter<R, W>) -> Self {
        Self {
            prompter,
            stage: Stage::Identity,
            draft: Draft::default(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every stage and return the merged configuration.
    pub fn assemble(self) -> Result<SimulationConfig, ConfigError> {
        self.assemble_with_output().map(|(config, _)| config)
    }

    /// Same as [`assemble`](Self::assemble), handing back the writer too.
    pub fn assemble_with_output(mut self) -> Result<(SimulationConfig, W), ConfigError> {
        self.banner()?;

        while self.stage != Stage::Done {
            debug!("Configuration stage {:?}", self.stage);
            self.run_stage()?;
            self.stage = self.stage.next();
        }

        let config = self.draft.finish()?;
        let out = self.prompter.output();
        writeln!(out, "\n{}", serde_json::to_string_pretty(&config).map_err(std::io::Error::from)?)?;

        Ok((config, self.prompter.into_output()))
    }

    fn banner(&mut self) -> Result<(), ConfigError> {
        let out = self.prompter.output();
        let rule = "*".repeat(WELCOME.len() + 2);
        writeln!(out, "|{}|", rule)?;
        writeln!(out, "| {} |", WELCOME)?;
        writeln!(out, "|{}|", rule)?;
        writeln!(out)?;
        Ok(())
    }

    fn run_stage(&mut self) -> Result<(), ConfigError> {
        match self.stage {
            Stage::Identity => {
                let name = self.prompter.read_line("Enter name of the new simulation", DEFAULT_FILE_NAME)?;
                self.draft.file_name = Some(name);
                let agents = self.prompter.read_positive_integer("Enter number of agents", DEFAULT_NUM_AGENTS)?;
                self.draft.num_agents = Some(agents);
            }
            Stage::InitialOpinion => {
                self.draft.initial_opinion = Some(self.read_parameters(InitialOpinionSpec::from_parameters)?);
            }
            Stage::Model => {
                self.draft.model = Some(self.read_parameters(ModelSpec::from_parameters)?);
            }
            Stage::AgentParameters => {
                self.draft.agent_parameters = Some(self.read_parameters(AgentParameterSpec::from_parameters)?);
            }
            Stage::Network => {
                self.draft.network = Some(self.read_parameters(NetworkSpec::from_parameters)?);
            }
            Stage::Horizon => {
                let steps = self.prompter.read_positive_integer("Enter number of time-steps", DEFAULT_NUM_STEPS)?;
                self.draft.num_steps = Some(steps);
            }
            Stage::Done => {}
        }
        Ok(())
    }

    /// Read one parameter line for the current stage. A line that does not
    /// decode is reported and the stage is asked again.
    fn read_parameters<T>(
        &mut self,
        resolve: impl Fn(&str) -> Result<T, ParameterError>,
    ) -> Result<T, ConfigError> {
        let Some((prompt, default)) = self.stage.parameter_prompt() else {
            return Err(ConfigError::Incomplete("parameter prompt"));
        };

        loop {
            let line = self.prompter.read_line(prompt, default)?;
            match resolve(&line) {
                Ok(spec) => return Ok(spec),
                Err(e) => {
                    warn!("Rejected {:?} input: {}", self.stage, e);
                    writeln!(self.prompter.output(), "Invalid value, {}. Try again", e)?;
                }
            }
        }
    }
}
