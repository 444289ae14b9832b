use std::fmt::{self, Write};

use crate::router::Router;
use crate::routing_table::{RouteEntry, RouteTimer};
use crate::simulation::Simulation;

fn timer_cell(entry: &RouteEntry) -> String {
    match entry.timer() {
        RouteTimer::Permanent => "N/A".to_string(),
        RouteTimer::Active { invalid_countdown } => format!("{}s", invalid_countdown),
        RouteTimer::Invalid { flush_countdown } => format!("FLUSH {}s", flush_countdown),
    }
}

pub fn routing_table(router: &Router) -> Result<String, fmt::Error> {
    let mut output = String::new();
    writeln!(output, "Routing Table of {} ({}):", router.id, router.name)?;
    writeln!(output, "{:<16} {:<18} {:<8} {:<10} {:<8} {:<10}",
             "Prefix", "Next Hop", "Metric", "Interface", "Source", "Timer")?;
    writeln!(output, "{}", "-".repeat(75))?;

    if router.routing_table().is_empty() {
        writeln!(output, "No routes found")?;
    } else {
        for entry in router.routing_table().iter() {
            writeln!(output, "{:<16} {:<18} {:<8} {:<10} {:<8} {:<10}",
                     entry.prefix.as_str(),
                     entry.next_hop.to_string(),
                     entry.metric,
                     entry.via_interface,
                     entry.source_router_id,
                     timer_cell(entry))?;
        }
    }

    Ok(output)
}

pub fn links(sim: &Simulation) -> Result<String, fmt::Error> {
    let mut output = String::new();
    writeln!(output, "Links:")?;
    writeln!(output, "{:<6} {:<12} {:<6} {:<24}", "ID", "Name", "Status", "Endpoints")?;
    writeln!(output, "{}", "-".repeat(50))?;
    for link in sim.links() {
        let [a, b] = &link.peers;
        writeln!(output, "{:<6} {:<12} {:<6} {}/{} <-> {}/{}",
                 link.id, link.name, link.status.to_string(),
                 a.router_id, a.interface, b.router_id, b.interface)?;
    }
    Ok(output)
}
