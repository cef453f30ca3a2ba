// FaultSim: Estimating Link Reliability and Routing over Randomly Failing Network Topologies
// Copyright (C) 2025 The FaultSim Developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
use std::{
    io,
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;

use faultsim::{
    driver::{run_once, simulate, Session},
    records::Dataset,
    report::ReportFormat,
    simulator::{parse_trial_count, RngDraw, Simulator},
    util::{self, TrialProgress},
};

#[derive(Parser, Debug)]
#[command(author, version, about)] // get author/version information from Cargo.toml
struct Args {
    /// CSV file describing the nodes.
    #[arg(short, long, default_value = "nodes.csv")]
    nodes: PathBuf,
    /// CSV file describing the (undirected) edges.
    #[arg(short, long, default_value = "edges.csv")]
    edges: PathBuf,
    /// Only read the first N data rows of each file. By default, all rows are read.
    #[arg(short = 'l', long)]
    max_rows: Option<usize>,
    /// Seed for the random failures. If not given, the seed is taken from the OS.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Simulate this many trials once instead of asking interactively.
    #[arg(short, long, allow_hyphen_values = true)]
    trials: Option<String>,
    /// Stop a run after this many seconds, reporting the trials completed so far.
    #[arg(long)]
    max_duration: Option<f64>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
    /// Do not show a progress bar.
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let multi = util::init_logging()?;

    let dataset = Dataset::new(&args.nodes, &args.edges, args.max_rows.into());
    let draws = match args.seed {
        Some(seed) => {
            log::info!("Using seed {seed}");
            RngDraw::seeded(seed)
        }
        None => RngDraw::from_entropy(),
    };
    let mut simulator = Simulator::new(draws);

    let format = if args.json {
        ReportFormat::Json
    } else if termion::is_tty(&io::stdout()) {
        ReportFormat::Colored
    } else {
        ReportFormat::Text
    };
    let budget = args
        .max_duration
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("Invalid maximum duration")?;
    let show_progress = !args.no_progress;

    // single, non-interactive run
    if let Some(trials) = args.trials.as_ref() {
        let trials = parse_trial_count(trials)?;
        let mut topo = dataset
            .load()
            .with_context(|| format!("Cannot load the dataset from {dataset:?}"))?;
        let mut progress = TrialProgress::new(&multi, show_progress, budget);
        let report = simulate(&mut simulator, &mut topo, trials, |t, n| {
            progress.after_trial(t, n)
        });
        progress.finish();
        match report {
            Some(report) => report.write_to(&mut io::stdout().lock(), format)?,
            None => log::info!("Nothing to simulate for {trials} trials."),
        }
        return Ok(());
    }

    // interactive session
    let mut input = io::stdin().lock();
    loop {
        let mut progress = TrialProgress::new(&multi, show_progress, budget);
        let session = run_once(
            &dataset,
            &mut simulator,
            &mut input,
            &mut io::stdout().lock(),
            format,
            |t, n| progress.after_trial(t, n),
        )
        .with_context(|| format!("Cannot run the simulation on {dataset:?}"))?;
        progress.finish();
        if session == Session::Exit {
            break;
        }
    }

    Ok(())
}
