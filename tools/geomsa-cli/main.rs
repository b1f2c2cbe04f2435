use clap::Parser;
use geomsa::prelude::*;
use std::fs;
use std::time::Instant;

/// A staged validation engine for declarative flow definitions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow definition JSON file
    flow_path: String,

    /// Print the full validation report as JSON instead of a summary
    #[arg(short, long)]
    json: bool,

    /// Suppress warnings in the summary output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let raw = fs::read_to_string(&cli.flow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read flow file '{}': {}",
            &cli.flow_path, e
        ))
    });

    let pipeline = Pipeline::new();
    let start = Instant::now();
    let report = pipeline.validate(&raw);
    let duration = start.elapsed();

    if cli.json {
        let body = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize report: {}", e)));
        println!("{}", body);
    } else {
        print_summary(&report, &cli, duration);
    }

    if !report.is_valid {
        std::process::exit(1);
    }
}

fn print_summary(report: &ValidationReport, cli: &Cli, duration: std::time::Duration) {
    println!("Validating '{}'", cli.flow_path);
    println!(
        "Stages run: {}",
        report
            .stages_run
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    for error in &report.errors {
        println!("  error [{}] {} at {}", error.code, error.message, error.location);
    }
    if !cli.quiet {
        for warning in &report.warnings {
            println!(
                "  warning [{}] {} at {}",
                warning.code, warning.message, warning.location
            );
        }
    }

    println!("\n--- Validation Summary ---");
    for stage in &report.stages_run {
        println!(
            "{:<10} {} error(s)",
            format!("{}:", stage),
            report.errors_for_stage(*stage)
        );
    }
    println!("Warnings:   {}", report.warnings.len());
    println!("Elapsed:    {:?}", duration);

    if report.is_valid {
        println!("\nResult: VALID");
    } else {
        println!("\nResult: INVALID ({} error(s))", report.errors.len());
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
