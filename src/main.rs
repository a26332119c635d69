//! Kirchhoff - branch current solver for resistive networks
//!
//! # Usage
//!
//! ```bash
//! kirchhoff divider.net --reduce --matrices --precision 4
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kirchhoff_core::{
    circuit::{reduce_series, validate_circuit, Circuit},
    dsl::{self, Netlist},
    error::Result,
    Analyzer, NodeId, Solution,
};

/// Solve a resistive netlist for its branch currents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "NETLIST")]
    netlist: PathBuf,

    /// Merge series branches before solving
    #[arg(short, long)]
    reduce: bool,

    /// Print the assembled KCL/KVL system
    #[arg(short, long)]
    matrices: bool,

    /// Digits after the decimal point
    #[arg(short, long, default_value_t = 6)]
    precision: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let Netlist { mut circuit, mut config } = dsl::load_file(&args.netlist)?;
    validate_circuit(&circuit)?;

    if args.reduce || config.reduce_series {
        let protect: Vec<NodeId> = config.reference_node.into_iter().collect();
        let merges = reduce_series(&mut circuit, &protect)?;
        println!("series reduction: {} merges", merges);
        config = config.with_series_reduction(false);
    }

    let analyzer = Analyzer::with_config(config);
    if args.matrices {
        let system = analyzer.assemble(&circuit)?;
        println!("system ({} x {}):", system.len(), system.columns);
        print!("{:.*}", args.precision, system);
    }

    let solution = analyzer.solve(&mut circuit)?;
    print_solution(&circuit, &solution, args.precision);

    Ok(())
}

fn print_solution(circuit: &Circuit, solution: &Solution, precision: usize) {
    println!("branch currents:");
    for (branch, current) in circuit.branches().iter().zip(solution.currents()) {
        println!(
            "  {:<4} {:>6} -> {:<6} I = {:.*} A",
            branch.id.to_string(),
            circuit.node_name(branch.first()),
            circuit.node_name(branch.second()),
            precision,
            current
        );
    }

    println!("node voltages (reference {}):", circuit.node_name(solution.reference()));
    for (name, v) in circuit.node_voltages(solution) {
        println!("  {:<8} {:.*} V", name, precision, v);
    }

    if !circuit.instruments().is_empty() {
        println!("instruments:");
        for inst in circuit.instruments() {
            match inst.reading(solution) {
                Some(value) => println!("  {:<8} {:.*} {}", inst.name, precision, value, inst.kind.unit()),
                None => println!("  {:<8} n/a", inst.name),
            }
        }
    }
}
