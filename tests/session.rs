//! Scripted sessions from the first prompt to the finished trace.

use opinet::error::{ConfigError, LaunchError};
use opinet::model::{EvolutionEngine, EvolutionRequest, LocalEngine, Trace};
use opinet::prompt::Prompter;
use opinet::simulation::{ConfigAssembler, Simulation, SimulationConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Cursor;

fn assemble(script: &str) -> Result<(SimulationConfig, String), ConfigError> {
    let prompter = Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
    let (config, out) = ConfigAssembler::new(prompter).assemble_with_output()?;
    Ok((config, String::from_utf8(out).unwrap()))
}

#[derive(Default)]
struct CountingEngine {
    calls: usize,
}

impl EvolutionEngine for CountingEngine {
    fn evolve(&mut self, request: EvolutionRequest) -> Result<Trace, LaunchError> {
        self.calls += 1;
        LocalEngine::quiet().evolve(request)
    }
}

#[test]
fn defaults_run_to_completion() {
    let (config, _) = assemble("demo\n20\n\n\n\n\n10\n").unwrap();
    assert_eq!(config.file_name, "demo");
    assert_eq!(config.num_agents, 20);
    assert_eq!(config.num_steps, 10);

    let mut simulation = Simulation::new(config, StdRng::seed_from_u64(7));
    let trace = simulation.run(&mut LocalEngine::quiet().with_history()).unwrap();

    assert_eq!(trace.history.len(), 11);
    assert_eq!(trace.snapshots.len(), 11);
    assert!(trace.history.iter().all(|step| step.len() == 20));
    assert!(trace.final_opinions.iter().all(|x| (-1.0..=1.0).contains(x)));
}

#[test]
fn same_seed_same_trace() {
    let run = || {
        let (config, _) = assemble("demo\n15\n\n\n\n\n5\n").unwrap();
        Simulation::new(config, StdRng::seed_from_u64(11))
            .run(&mut LocalEngine::quiet())
            .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn malformed_line_is_asked_again() {
    let (config, out) = assemble("demo\n20\nio_loc=(0.5,\n\n\n\n\n5\n").unwrap();
    assert!(out.contains("Invalid value"));
    let mut expected = SimulationConfig::default().with_agents(20).with_steps(5);
    expected.file_name = "demo".into();
    assert_eq!(config, expected);
}

#[test]
fn unknown_topology_never_reaches_the_engine() {
    let (config, _) = assemble("demo\n20\n\n\n\ndig_lab=\"hypercube\"\n5\n").unwrap();
    let mut engine = CountingEngine::default();

    let err = Simulation::new(config, StdRng::seed_from_u64(1))
        .run(&mut engine)
        .unwrap_err();

    assert_eq!(
        err,
        LaunchError::UnrecognizedLabel {
            kind: "network",
            label: "hypercube".into()
        }
    );
    assert_eq!(engine.calls, 0);
}

#[test]
fn degroot_on_a_ring() {
    let script = "ring\n12\n\nmod_lab=\"DG\"\n\ndig_lab=\"gr\"; dig_prt=False\n40\n";
    let (config, _) = assemble(script).unwrap();
    let mut engine = CountingEngine::default();

    let trace = Simulation::new(config, StdRng::seed_from_u64(3)).run(&mut engine).unwrap();
    let first = &trace.snapshots[0];
    let last = &trace.snapshots[40];

    assert_eq!(engine.calls, 1);
    assert!(last.std_dev < first.std_dev);
}

#[test]
fn input_closed_mid_session() {
    assert!(matches!(assemble("demo\n20\n"), Err(ConfigError::InputClosed)));
}
