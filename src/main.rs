use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use ripng_sim::config::{
    parse_seconds, DEFAULT_FLUSH_TIMEOUT, DEFAULT_INVALID_TIMEOUT, DEFAULT_UPDATE_PERIOD,
};
use ripng_sim::{report, Settings, Simulation, TopologySpec};

/// A link flip scheduled for the moment the clock shows `at`.
#[derive(Debug, Clone, PartialEq)]
struct ScheduledToggle {
    link: String,
    at: u64,
}

impl FromStr for ScheduledToggle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (link, at) = s
            .split_once('@')
            .ok_or_else(|| format!("expected LINK@TICK, got {:?}", s))?;
        let at = at
            .trim()
            .parse()
            .map_err(|_| format!("invalid tick in {:?}", s))?;
        Ok(Self {
            link: link.trim().to_string(),
            at,
        })
    }
}

#[derive(Parser)]
#[command(name = "ripng-sim", about = "Simulate a simplified RIPng network tick by tick")]
struct Cli {
    /// Topology description (JSON). Defaults to the built-in four-router network.
    #[arg(long)]
    topology: Option<String>,

    /// Protocol settings (JSON).
    #[arg(long)]
    settings: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// Flip LINK when the clock reads TICK, before the next second runs.
    #[arg(long = "toggle", value_name = "LINK@TICK")]
    toggles: Vec<ScheduledToggle>,

    #[arg(long)]
    update_period: Option<String>,

    #[arg(long)]
    invalid_timeout: Option<String>,

    #[arg(long)]
    flush_timeout: Option<String>,

    #[arg(long)]
    no_split_horizon: bool,

    #[arg(long)]
    poison_reverse: bool,

    #[arg(long)]
    no_triggered_updates: bool,

    /// Number of most recent event log lines to print.
    #[arg(long, default_value_t = 20)]
    log_entries: usize,

    #[arg(long)]
    dump_topology: bool,

    /// Write the topology in use to FILE before running.
    #[arg(long, value_name = "FILE")]
    save_topology: Option<String>,

    /// Write the effective settings, overrides applied, to FILE before running.
    #[arg(long, value_name = "FILE")]
    save_settings: Option<String>,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(raw) = &self.update_period {
            settings.update_period = parse_seconds("update_period", raw, DEFAULT_UPDATE_PERIOD);
        }
        if let Some(raw) = &self.invalid_timeout {
            settings.invalid_timeout = parse_seconds("invalid_timeout", raw, DEFAULT_INVALID_TIMEOUT);
        }
        if let Some(raw) = &self.flush_timeout {
            settings.flush_timeout = parse_seconds("flush_timeout", raw, DEFAULT_FLUSH_TIMEOUT);
        }
        if self.no_split_horizon {
            settings.split_horizon = false;
        }
        if self.poison_reverse {
            settings.poison_reverse = true;
        }
        if self.no_triggered_updates {
            settings.triggered_updates = false;
        }

        Ok(settings.normalized())
    }

    fn topology(&self) -> Result<TopologySpec> {
        match &self.topology {
            Some(path) => TopologySpec::load_from_file(path),
            None => Ok(TopologySpec::reference()),
        }
    }

    fn save_inputs(&self, spec: &TopologySpec, settings: &Settings) -> Result<()> {
        if let Some(path) = &self.save_topology {
            spec.save_to_file(path)?;
            info!("Topology written to {}", path);
        }
        if let Some(path) = &self.save_settings {
            settings.save(path)?;
            info!("Settings written to {}", path);
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let spec = cli.topology()?;

    if cli.dump_topology {
        println!("{}", serde_json::to_string_pretty(&spec)?);
        return Ok(());
    }

    let settings = cli.settings()?;
    cli.save_inputs(&spec, &settings)?;
    let mut sim = Simulation::new(spec, settings, cli.seed).context("invalid topology")?;
    info!("Running {} ticks with seed {}", cli.ticks, sim.seed());

    for _ in 0..cli.ticks {
        let now = sim.time();
        for toggle in cli.toggles.iter().filter(|t| t.at == now) {
            if sim.toggle_link(&toggle.link).is_none() {
                warn!("Scheduled toggle of unknown link {} ignored", toggle.link);
            }
        }

        let summary = sim.tick();
        for line in &summary.log {
            log::debug!("{}", line);
        }
    }

    println!("=== T={}s (seed {}) ===\n", sim.time(), sim.seed());
    print!("{}", report::links(&sim)?);
    for router in sim.routers() {
        println!();
        print!("{}", report::routing_table(router)?);
    }

    if cli.log_entries > 0 {
        println!("\nEvent log (newest first):");
        for line in sim.event_log().iter().take(cli.log_entries) {
            println!("{}", line);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheduled_toggle() {
        let toggle: ScheduledToggle = "L1@45".parse().unwrap();
        assert_eq!(toggle, ScheduledToggle { link: "L1".into(), at: 45 });
        assert!("L1".parse::<ScheduledToggle>().is_err());
        assert!("L1@soon".parse::<ScheduledToggle>().is_err());
    }

    #[test]
    fn textual_overrides_are_lenient() {
        let cli = Cli::parse_from([
            "ripng-sim",
            "--update-period",
            "x",
            "--flush-timeout",
            "15",
            "--no-split-horizon",
            "--poison-reverse",
        ]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.update_period, DEFAULT_UPDATE_PERIOD);
        assert_eq!(settings.flush_timeout, 15);
        assert!(!settings.split_horizon);
        assert!(!settings.poison_reverse);
    }

    #[test]
    fn saved_inputs_reload_as_effective_run() {
        let dir = std::env::temp_dir();
        let topology = dir.join(format!("ripng-sim-cli-topology-{}.json", std::process::id()));
        let settings = dir.join(format!("ripng-sim-cli-settings-{}.json", std::process::id()));
        let topology = topology.to_str().unwrap();
        let settings = settings.to_str().unwrap();

        let cli = Cli::parse_from([
            "ripng-sim",
            "--update-period",
            "9",
            "--no-triggered-updates",
            "--save-topology",
            topology,
            "--save-settings",
            settings,
        ]);
        let effective = cli.settings().unwrap();
        cli.save_inputs(&cli.topology().unwrap(), &effective).unwrap();

        let reloaded = Cli::parse_from(["ripng-sim", "--topology", topology, "--settings", settings]);
        assert_eq!(reloaded.topology().unwrap(), TopologySpec::reference());
        let again = reloaded.settings().unwrap();
        std::fs::remove_file(topology).unwrap();
        std::fs::remove_file(settings).unwrap();
        assert_eq!(again, effective);
        assert_eq!(again.update_period, 9);
        assert!(!again.triggered_updates);
    }
}
