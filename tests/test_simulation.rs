use std::collections::BTreeSet;

use cloudlet_simulator::cloud::RestartPolicy;
use cloudlet_simulator::controller::{Controller, ControllerAlgorithm};
use cloudlet_simulator::distribution::Distribution;
use cloudlet_simulator::error::SimulationError;
use cloudlet_simulator::metrics::{Measure, MetricKey};
use cloudlet_simulator::server_selector::SelectionStrategy;
use cloudlet_simulator::simulation::CloudletSimulation;
use cloudlet_simulator::simulation_config::{ClassDistributions, SimulationConfig};
use cloudlet_simulator::simulation_metrics::EmptyMetricsLogger;
use cloudlet_simulator::state_space::reachable_states;
use cloudlet_simulator::task::{MetricClass, Scope, TaskClass};

fn small_config() -> SimulationConfig {
    SimulationConfig {
        servers: 3,
        threshold: 2,
        controller: ControllerAlgorithm::ThresholdPriority,
        arrival: ClassDistributions::exponential(1.0, 3.0),
        cloudlet_service: ClassDistributions::exponential(2.0, 4.0),
        cloud_service: ClassDistributions::exponential(0.5, 0.8),
        batch_size: 32,
        batch_count: 0,
        stop_time: Some(500.0),
        ..SimulationConfig::default()
    }
}

fn new_simulation(config: SimulationConfig) -> CloudletSimulation {
    CloudletSimulation::new(config, Box::new(EmptyMetricsLogger {})).unwrap()
}

#[test]
fn test_flow_conservation() {
    for selector in [SelectionStrategy::Order, SelectionStrategy::Cyclic, SelectionStrategy::Equity,
                     SelectionStrategy::Random] {
        let mut sim = new_simulation(SimulationConfig { selector, ..small_config() });
        sim.step_until_no_events().unwrap();
        let now = sim.current_time();
        let system = sim.system();

        for class in TaskClass::ALL {
            let metric_class = MetricClass::from(class);
            let total = system.counters(Scope::System, metric_class, now);
            let cloudlet = system.counters(Scope::Cloudlet, metric_class, now);
            let cloud = system.counters(Scope::Cloud, metric_class, now);
            assert_eq!(total.arrived, sim.arrivals(class));
            assert_eq!(total.arrived, cloudlet.arrived + cloud.arrived);
            assert_eq!(total.completed, cloudlet.completed + cloud.completed);
            assert_eq!(total.completed, total.arrived);
            assert_eq!(system.cloudlet().occupancy(class), 0);
            assert_eq!(system.cloud().occupancy(class), 0);
        }
        assert!(sim.arrivals(TaskClass::Class1) > 0 && sim.arrivals(TaskClass::Class2) > 0);
        assert!(system.is_empty());
        assert_eq!(sim.pending_events(), 0);
        assert!(system.cloudlet().servers().iter().all(|server| server.is_idle()));
    }
}

#[test]
fn test_preemption_conservation() {
    for restart_policy in [RestartPolicy::ScaledResample, RestartPolicy::FullResample] {
        let config = SimulationConfig {
            restart_policy,
            arrival: ClassDistributions::exponential(3.0, 3.0),
            ..small_config()
        };
        let mut sim = new_simulation(config);
        sim.step_until_no_events().unwrap();
        let now = sim.current_time();
        let system = sim.system();

        let switched = system.counters(Scope::Cloudlet, MetricClass::Class2, now).switched;
        assert!(switched > 0);
        assert_eq!(switched, system.cloud().restarted(TaskClass::Class2));
        assert_eq!(system.counters(Scope::Cloud, MetricClass::Class2, now).switched_completed, switched);
        // Class1 is never evicted
        assert_eq!(system.counters(Scope::System, MetricClass::Class1, now).switched, 0);
        assert_eq!(system.cloud().restarted(TaskClass::Class1), 0);
    }
}

#[test]
fn test_capacity_only_never_preempts() {
    let config = SimulationConfig { controller: ControllerAlgorithm::CapacityOnly, ..small_config() };
    let mut sim = new_simulation(config);
    sim.step_until_no_events().unwrap();
    let now = sim.current_time();
    assert_eq!(sim.system().counters(Scope::System, MetricClass::Global, now).switched, 0);
    assert!(sim.system().counters(Scope::Cloud, MetricClass::Global, now).arrived > 0);
}

#[test]
fn test_threshold_invariant_holds_at_every_step() {
    let config = small_config();
    let (servers, threshold) = (config.servers, config.threshold);
    let mut sim = new_simulation(config);
    while sim.step().unwrap() {
        let cloudlet = sim.system().cloudlet();
        assert!(cloudlet.total_occupancy() <= servers);
        assert!(cloudlet.occupancy(TaskClass::Class2) <= threshold);
    }
}

#[test]
fn test_zero_threshold_keeps_class2_off_the_cloudlet() {
    let config = SimulationConfig { threshold: 0, ..small_config() };
    let mut sim = new_simulation(config);
    sim.step_until_no_events().unwrap();
    let now = sim.current_time();
    let cloudlet = sim.system().counters(Scope::Cloudlet, MetricClass::Class2, now);
    assert_eq!(cloudlet.arrived, 0);
    assert!(sim.system().counters(Scope::Cloudlet, MetricClass::Class1, now).arrived > 0);
}

#[test]
fn test_reachable_cloudlet_states() {
    let config = SimulationConfig {
        servers: 3,
        threshold: 3,
        controller: ControllerAlgorithm::ThresholdPriority,
        arrival: ClassDistributions::exponential(1.0, 3.0),
        cloudlet_service: ClassDistributions::exponential(2.0, 4.0),
        stop_time: None,
        batch_count: 10,
        ..SimulationConfig::default()
    };
    let controller = Controller::new(config.controller, config.servers, config.threshold).unwrap();
    let expected = reachable_states(&controller);
    let mut sim = new_simulation(config);

    let mut observed = BTreeSet::new();
    observed.insert((0, 0));
    for _ in 0..200_000 {
        assert!(sim.step().unwrap());
        let occupancy = sim.system().cloudlet().occupancies();
        assert!(occupancy[0] + occupancy[1] <= 3);
        observed.insert((occupancy[0], occupancy[1]));
    }
    assert!(observed.is_subset(&expected));
    assert_eq!(observed, expected);
}

#[test]
fn test_run_collects_configured_batches() {
    let config = SimulationConfig {
        batch_size: 64,
        batch_count: 12,
        stop_time: None,
        ..small_config()
    };
    let mut sim = new_simulation(config);
    sim.run().unwrap();
    assert!(sim.metrics().is_complete());
    assert_eq!(sim.metrics().closed_batches(), 12);
    assert_eq!(sim.metrics().samples(), 64 * 12);

    let summary = sim.summary();
    assert_eq!(summary.len(), Scope::ALL.len() * MetricClass::ALL.len() * Measure::ALL.len());
    for record in summary.iter() {
        assert_eq!(record.batches, 12);
        assert!(record.mean.is_finite() && record.mean >= 0.0);
        assert!(record.half_width.is_finite() && record.half_width >= 0.0);
    }
    let response = sim.statistic(MetricKey::new(Scope::System, MetricClass::Global, Measure::Response));
    assert!(response.mean > 0.0);
    let population = sim.statistic(MetricKey::new(Scope::Cloudlet, MetricClass::Global, Measure::Population));
    assert!(population.mean > 0.0 && population.mean <= 3.0);
}

#[test]
fn test_runs_are_reproducible() {
    let config = SimulationConfig { batch_size: 16, batch_count: 4, stop_time: None, ..small_config() };
    let mut first = new_simulation(config.clone());
    let mut second = new_simulation(config.clone());
    first.run().unwrap();
    second.run().unwrap();
    assert_eq!(first.summary(), second.summary());
    assert_eq!(first.current_time(), second.current_time());

    let mut other = new_simulation(SimulationConfig { seed: config.seed + 1, ..config });
    other.run().unwrap();
    assert_ne!(first.current_time(), other.current_time());
}

#[test]
fn test_step_until_time() {
    let mut sim = new_simulation(small_config());
    sim.step_until_time(50.0).unwrap();
    assert!(sim.current_time() <= 50.0);
    assert!(sim.current_time() > 0.0);
    assert!(sim.steps(10).unwrap());
    assert!(sim.current_time() > 0.0);
}

#[test]
fn test_invalid_config_fails_before_running() {
    let config = SimulationConfig { threshold: 4, ..small_config() };
    assert!(CloudletSimulation::new(config, Box::new(EmptyMetricsLogger {})).is_err());

    // zero inter-arrival times would keep the clock at 0 forever
    let config = SimulationConfig {
        arrival: ClassDistributions::new(Distribution::deterministic(0.0), Distribution::exponential(3.0)),
        stop_time: None,
        batch_count: 4,
        ..small_config()
    };
    assert!(matches!(CloudletSimulation::new(config, Box::new(EmptyMetricsLogger {})),
                     Err(SimulationError::Configuration(_))));
}
