mod common;

use common::{distinct_prefix_chain, fixed_start};
use ripng_sim::network::LinkStatus;
use ripng_sim::{Prefix, Settings, Simulation, INFINITY_METRIC};

fn converged(settings: Settings, seed: u64) -> Simulation {
    let mut sim = Simulation::new(distinct_prefix_chain(), settings, Some(seed)).unwrap();
    for _ in 0..60 {
        sim.tick();
    }
    sim
}

fn metric(sim: &Simulation, router: &str, prefix: &str) -> Option<u8> {
    sim.router(router)?.route(&Prefix::from(prefix)).map(|r| r.metric)
}

#[test]
fn chain_converges_to_hop_counts() {
    let sim = converged(Settings::default(), 7);

    let r1 = sim.routing_table("R1").unwrap();
    assert_eq!(r1.len(), 6);

    let to_r4 = r1.iter().find(|r| r.prefix.as_str() == "2000:4::/64").unwrap();
    assert_eq!(to_r4.metric, 3);
    assert_eq!(to_r4.next_hop.to_string(), "fe80::R2:eth1");
    assert_eq!(to_r4.via_interface, "eth0");

    let to_r3 = r1.iter().find(|r| r.prefix.as_str() == "2000:6::/64").unwrap();
    assert_eq!(to_r3.metric, 4);
    assert_eq!(to_r3.next_hop.to_string(), "fe80::R2:eth1");

    assert_eq!(metric(&sim, "R3", "2000:1::/64"), Some(4));
    assert_eq!(metric(&sim, "R4", "2000:2::/64"), Some(2));
    for router in ["R1", "R2", "R3", "R4"] {
        assert_eq!(sim.routing_table(router).unwrap().len(), 6, "{} table incomplete", router);
    }
}

#[test]
fn one_tick_carries_routes_down_the_chain_in_router_order() {
    let mut sim = Simulation::new(distinct_prefix_chain(), fixed_start(1), Some(1)).unwrap();
    let summary = sim.tick();

    let order: Vec<_> = summary.sent.iter().map(|r| r.router_id.as_str()).collect();
    assert_eq!(order, vec!["R1", "R2", "R3", "R4"]);
    assert_eq!(metric(&sim, "R2", "2000:1::/64"), Some(2));
    assert_eq!(metric(&sim, "R4", "2000:1::/64"), Some(3));
    assert_eq!(metric(&sim, "R3", "2000:1::/64"), Some(4));
    assert_eq!(metric(&sim, "R1", "2000:6::/64"), None);
}

#[test]
fn link_down_poisons_neighbor_route_immediately() {
    let mut sim = converged(Settings::default(), 7);

    assert_eq!(sim.toggle_link("L1"), Some(LinkStatus::Down));

    let r1 = sim.router("R1").unwrap();
    assert!(r1.route(&Prefix::from("2000:1::/64")).is_none());
    assert!(r1
        .routing_table()
        .iter()
        .all(|r| r.metric == INFINITY_METRIC && r.marked_for_deletion()));

    let learned = sim.router("R2").unwrap().route(&Prefix::from("2000:1::/64")).unwrap();
    assert_eq!(learned.metric, INFINITY_METRIC);
    assert!(learned.marked_for_deletion());
    assert!(sim.router("R2").unwrap().pending_triggered_update());
}

#[test]
fn poison_spreads_along_the_chain() {
    let mut sim = converged(Settings::default(), 7);
    sim.toggle_link("L1");
    for _ in 0..5 {
        sim.tick();
    }
    assert_eq!(metric(&sim, "R4", "2000:1::/64"), Some(INFINITY_METRIC));
    assert_eq!(metric(&sim, "R3", "2000:1::/64"), Some(INFINITY_METRIC));
    assert_eq!(metric(&sim, "R3", "2000:2::/64"), Some(INFINITY_METRIC));
    assert_eq!(metric(&sim, "R3", "2000:3::/64"), Some(3));
}

#[test]
fn link_up_sends_triggered_update_next_tick() {
    let mut sim = converged(Settings::default(), 7);
    sim.toggle_link("L1");
    for _ in 0..5 {
        sim.tick();
    }

    assert_eq!(sim.toggle_link("L1"), Some(LinkStatus::Up));
    let direct = sim.router("R1").unwrap().route(&Prefix::from("2000:1::/64")).unwrap();
    assert!(direct.is_directly_connected());
    assert_eq!(direct.metric, 1);

    let summary = sim.tick();
    assert!(summary.sent.iter().any(|r| r.router_id == "R1" && r.triggered));
    assert!(summary.sent.iter().any(|r| r.router_id == "R2" && r.triggered));
    assert!(summary.log.iter().any(|l| l.contains("R1 sending TRIGGERED update.")));
}

#[test]
fn recovers_after_link_restored() {
    let mut sim = converged(Settings::default(), 11);
    sim.toggle_link("L2");
    for _ in 0..200 {
        sim.tick();
    }
    assert_eq!(metric(&sim, "R1", "2000:6::/64"), None);
    assert_eq!(sim.routing_table("R1").unwrap().len(), 2);

    sim.toggle_link("L2");
    for _ in 0..30 {
        sim.tick();
    }
    assert_eq!(metric(&sim, "R1", "2000:6::/64"), Some(4));
    assert_eq!(metric(&sim, "R3", "2000:1::/64"), Some(4));
}

#[test]
fn silent_neighbor_routes_time_out_then_flush() {
    let settings = Settings {
        update_period: 100,
        invalid_timeout: 5,
        flush_timeout: 3,
        triggered_updates: false,
        ..fixed_start(1)
    };
    let mut sim = Simulation::new(distinct_prefix_chain(), settings, Some(1)).unwrap();
    let prefix = Prefix::from("2000:3::/64");

    sim.tick();
    assert_eq!(metric(&sim, "R1", "2000:3::/64"), Some(2));

    for _ in 0..4 {
        sim.tick();
    }
    let entry = sim.router("R1").unwrap().route(&prefix).unwrap();
    assert_eq!(sim.time(), 5);
    assert_eq!(entry.invalid_countdown(), Some(1));

    sim.tick();
    let entry = sim.router("R1").unwrap().route(&prefix).unwrap();
    assert!(entry.marked_for_deletion());
    assert_eq!(entry.metric, INFINITY_METRIC);
    assert_eq!(entry.flush_countdown(), Some(3));

    sim.tick();
    sim.tick();
    assert!(sim.router("R1").unwrap().route(&prefix).is_some());
    let summary = sim.tick();
    assert!(sim.router("R1").unwrap().route(&prefix).is_none());
    assert!(summary.sent.is_empty());
    assert!(summary.log.iter().any(|l| l.contains("R1: route 2000:3::/64 via fe80::R2:eth1 removed")));
}

#[test]
fn poison_reverse_echoes_infinity_to_next_hop() {
    let settings = Settings {
        poison_reverse: true,
        ..Settings::default()
    };
    let sim = converged(settings.clone(), 3);

    let r2 = sim.router("R2").unwrap();
    let towards_r1 = r2.build_update_packet("eth1", &settings);
    let poisoned = towards_r1.iter().find(|a| a.prefix.as_str() == "2000:1::/64").unwrap();
    assert_eq!(poisoned.metric, INFINITY_METRIC);
    let reachable = towards_r1.iter().find(|a| a.prefix.as_str() == "2000:6::/64").unwrap();
    assert_eq!(reachable.metric, 3);
    assert_eq!(reachable.source_router_id, "R2");

    let split_only = Settings::default();
    let towards_r1 = r2.build_update_packet("eth1", &split_only);
    assert!(towards_r1.iter().all(|a| a.prefix.as_str() != "2000:1::/64"));
}

#[test]
fn same_seed_same_run() {
    let run = |seed| {
        let mut sim = Simulation::new(distinct_prefix_chain(), Settings::default(), Some(seed)).unwrap();
        for t in 0..90 {
            if t == 40 {
                sim.toggle_link("L2");
            }
            sim.tick();
        }
        (sim.event_log(), sim.routing_table("R1"))
    };
    assert_eq!(run(2024), run(2024));
}

#[test]
fn unknown_link_is_reported_without_state_change() {
    let mut sim = converged(Settings::default(), 7);
    let before: Vec<_> = ["R1", "R2", "R3", "R4"].iter().map(|r| sim.routing_table(r)).collect();

    assert_eq!(sim.toggle_link("L42"), None);

    let after: Vec<_> = ["R1", "R2", "R3", "R4"].iter().map(|r| sim.routing_table(r)).collect();
    assert_eq!(before, after);
    assert!(sim.links().iter().all(|l| l.status == LinkStatus::Up));
    assert!(sim.event_log()[0].ends_with("ERROR: unknown link L42."));
}
