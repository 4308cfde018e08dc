use clap::Parser;
use senryaku::compiler::CompilerOptions;
use senryaku::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Compiles a strategy graph JSON export into trading-script source
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the strategy graph JSON file
    graph_path: String,

    /// Path to a JSON file with compiler options
    #[arg(long)]
    options: Option<String>,

    /// Strategy name written into the declaration (overrides the options file)
    #[arg(short, long)]
    name: Option<String>,

    /// Write the generated script to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Print the complete generation result as JSON
    #[arg(long)]
    json: bool,

    /// Treat warnings as failures
    #[arg(long)]
    strict: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    let mut options = match &cli.options {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read options file '{}': {}", path, e))
            });
            CompilerOptions::from_json(&json).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to parse options file '{}': {}", path, e))
            })
        }
        None => CompilerOptions::default(),
    };
    if let Some(name) = cli.name {
        options.strategy_name = name;
    }

    let graph_json = fs::read_to_string(&cli.graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read graph file '{}': {}",
            &cli.graph_path, e
        ))
    });
    let document = GraphDocument::from_json(&graph_json)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    let compiler = Compiler::builder().with_options(options).build();
    let result = compiler
        .compile_from(document)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert graph: {}", e)));
    let elapsed = start.elapsed();

    if cli.json {
        let json = result
            .to_json()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize result: {}", e)));
        println!("{}", json);
    } else {
        match &cli.output {
            Some(path) => {
                fs::write(path, &result.code).unwrap_or_else(|e| {
                    exit_with_error(&format!("Failed to write '{}': {}", path, e))
                });
                eprintln!("Wrote {} lines to '{}'", result.metadata.line_count, path);
            }
            None => print!("{}", result.code),
        }

        for message in result.error_messages() {
            eprintln!("error: {}", message);
        }
        for message in result.warning_messages() {
            eprintln!("warning: {}", message);
        }
        eprintln!(
            "\n{} nodes, {} edges, {} inputs compiled in {:?}",
            result.metadata.node_count,
            result.metadata.edge_count,
            result.metadata.input_count,
            elapsed
        );
    }

    if !result.success || (cli.strict && !result.warnings.is_empty()) {
        std::process::exit(1);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
