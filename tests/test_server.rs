use cloudlet_simulator::error::SimulationError;
use cloudlet_simulator::random::RandomStreams;
use cloudlet_simulator::server::{Server, ServerState};
use cloudlet_simulator::server_selector::{SelectionStrategy, ServerSelector};
use cloudlet_simulator::task::TaskClass;

fn pool(size: usize) -> Vec<Server> {
    (0..size).map(Server::new).collect()
}

#[test]
fn test_server_lifecycle() {
    let mut server = Server::new(0);
    assert_eq!(server.submit_arrival(TaskClass::Class1, 1.0, 2.5).unwrap(), 3.5);
    assert_eq!(server.state, ServerState::Busy);
    assert!(matches!(server.submit_arrival(TaskClass::Class2, 2.0, 1.0),
                     Err(SimulationError::InvariantViolation { .. })));

    assert_eq!(server.submit_completion(3.5).unwrap(), 2.5);
    assert!(server.is_idle());
    assert_eq!(server.served(TaskClass::Class1), 1);
    assert_eq!(server.busy_time(TaskClass::Class1), 2.5);
    assert_eq!(server.idle_time(5.0), 1.0 + 1.5);
    assert!(server.submit_completion(6.0).is_err());
}

#[test]
fn test_server_interruption() {
    let mut server = Server::new(3);
    server.submit_arrival(TaskClass::Class2, 1.0, 4.0).unwrap();
    assert!(server.submit_interruption(TaskClass::Class1, 2.0).is_err());

    let interruption = server.submit_interruption(TaskClass::Class2, 2.0).unwrap();
    assert_eq!(interruption.server, 3);
    assert_eq!(interruption.arrival_time, 1.0);
    assert_eq!(interruption.completion_time, 5.0);
    assert_eq!(interruption.remaining_ratio(2.0), 0.75);
    assert!(server.is_idle());
    assert_eq!(server.interrupted(TaskClass::Class2), 1);
    assert_eq!(server.interrupted_time(TaskClass::Class2), 1.0);
    assert_eq!(server.interruption_time, 2.0);
    assert!(server.submit_interruption(TaskClass::Class2, 2.5).is_err());
}

#[test]
fn test_server_cannot_be_interrupted_after_completion_time() {
    let mut server = Server::new(0);
    server.submit_arrival(TaskClass::Class2, 0.0, 1.0).unwrap();
    assert!(server.submit_interruption(TaskClass::Class2, 1.5).is_err());
}

#[test]
fn test_order_selector() {
    let mut streams = RandomStreams::new(1);
    let mut servers = pool(3);
    let mut selector = ServerSelector::new(SelectionStrategy::Order);
    assert_eq!(selector.select_idle(&servers, 0.0, &mut streams), Some(0));
    servers[0].submit_arrival(TaskClass::Class1, 0.0, 1.0).unwrap();
    assert_eq!(selector.select_idle(&servers, 0.0, &mut streams), Some(1));
    assert_eq!(selector.select_interruptible(&servers, TaskClass::Class2, 0.0, &mut streams), None);
    assert_eq!(selector.select_interruptible(&servers, TaskClass::Class1, 0.5, &mut streams), Some(0));
}

#[test]
fn test_cyclic_selector_wraps() {
    let mut streams = RandomStreams::new(1);
    let servers = pool(3);
    let mut selector = ServerSelector::new(SelectionStrategy::Cyclic);
    let picks: Vec<Option<usize>> = (0..5).map(|_| selector.select_idle(&servers, 0.0, &mut streams)).collect();
    assert_eq!(picks, vec![Some(0), Some(1), Some(2), Some(0), Some(1)]);
}

#[test]
fn test_cyclic_selector_skips_busy_servers() {
    let mut streams = RandomStreams::new(1);
    let mut servers = pool(4);
    let mut selector = ServerSelector::new(SelectionStrategy::Cyclic);
    assert_eq!(selector.select_idle(&servers, 0.0, &mut streams), Some(0));
    servers[1].submit_arrival(TaskClass::Class1, 0.0, 1.0).unwrap();
    servers[2].submit_arrival(TaskClass::Class1, 0.0, 1.0).unwrap();
    assert_eq!(selector.select_idle(&servers, 0.0, &mut streams), Some(3));
    assert_eq!(selector.select_idle(&servers, 0.0, &mut streams), Some(0));
}

#[test]
fn test_equity_interrupts_least_progressed_task() {
    let mut streams = RandomStreams::new(1);
    let mut servers = pool(3);
    servers[0].submit_arrival(TaskClass::Class2, 0.0, 10.0).unwrap();
    servers[1].submit_arrival(TaskClass::Class2, 2.0, 10.0).unwrap();
    servers[2].submit_arrival(TaskClass::Class1, 3.0, 10.0).unwrap();
    let mut selector = ServerSelector::new(SelectionStrategy::Equity);
    assert_eq!(selector.select_interruptible(&servers, TaskClass::Class2, 4.0, &mut streams), Some(1));
}

#[test]
fn test_equity_selector_fairness() {
    let mut streams = RandomStreams::new(7);
    let mut servers = pool(5);
    let mut selector = ServerSelector::new(SelectionStrategy::Equity);
    let mut now = 0.0;

    for step in 0..500 {
        now += 0.1 + (step % 7) as f64 * 0.05;
        // release every server whose task is over
        for server in servers.iter_mut() {
            if !server.is_idle() && server.completion_time <= now {
                let completion_time = server.completion_time;
                server.submit_completion(completion_time).unwrap();
            }
        }
        if let Some(chosen) = selector.select_idle(&servers, now, &mut streams) {
            let chosen_idle = servers[chosen].idle_time(now);
            for server in servers.iter().filter(|s| s.is_idle()) {
                assert!(chosen_idle >= server.idle_time(now));
            }
            let service = 0.3 + (step % 5) as f64 * 0.4;
            servers[chosen].submit_arrival(TaskClass::Class1, now, service).unwrap();
        }
    }
}

#[test]
fn test_random_selector_picks_matching_servers() {
    let mut streams = RandomStreams::new(99);
    let mut servers = pool(6);
    for i in [0, 2, 4] {
        servers[i].submit_arrival(TaskClass::Class2, 0.0, 100.0).unwrap();
    }
    let mut selector = ServerSelector::new(SelectionStrategy::Random);
    let mut seen = [false; 6];
    for _ in 0..200 {
        let idle = selector.select_idle(&servers, 1.0, &mut streams).unwrap();
        assert!(servers[idle].is_idle());
        seen[idle] = true;
        let busy = selector.select_interruptible(&servers, TaskClass::Class2, 1.0, &mut streams).unwrap();
        assert!(!servers[busy].is_idle());
    }
    assert!(seen[1] && seen[3] && seen[5]);
}
