use clap::{Parser, ValueEnum};
use rulegraph::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// The connection rules to check the rule against.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ValidatorCli {
    Linking,
    Permissive,
}

/// The format of the input file.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatCli {
    /// Operator nodes and sticky notes as saved by the editor
    Document,
    /// A linkage rule tree
    Linkage,
}

/// Loads a rule, lays it out and prints the validated result
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the rule JSON file
    rule_path: String,

    /// Optional path to the operator catalog JSON file
    #[arg(short, long)]
    catalog: Option<String>,

    /// The format of the rule file
    #[arg(short, long, value_enum, default_value = "document")]
    format: FormatCli,

    /// The connection rules of the session
    #[arg(short, long, value_enum, default_value = "linking")]
    validator: ValidatorCli,

    /// Lay out all nodes, not only rules with unplaced nodes
    #[arg(short, long)]
    layout: bool,

    /// Write the saved rule to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let catalog = match &cli.catalog {
        Some(path) => {
            let json = read_file(path, "catalog");
            OperatorCatalog::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse catalog JSON: {}", e)))
        }
        None => OperatorCatalog::default(),
    };
    let rule_json = read_file(&cli.rule_path, "rule");

    let linkage_rule = match cli.format {
        FormatCli::Linkage => Some(
            serde_json::from_str::<LinkageRule>(&rule_json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse linkage rule JSON: {}", e))),
        ),
        FormatCli::Document => None,
    };
    let document = match &linkage_rule {
        Some(rule) => rule.to_document(&catalog),
        None => RuleDocument::from_json(&rule_json).unwrap_or_else(|e| exit_with_error(&e.to_string())),
    };

    // --- 2. Model Setup ---
    let validator: Box<dyn ConnectionValidator> = match cli.validator {
        ValidatorCli::Linking => Box::new(LinkingValidator),
        ValidatorCli::Permissive => Box::new(PermissiveValidator),
    };
    let mut model = RuleEditorModel::builder(catalog).with_validator(validator).build();

    // --- 3. Loading and Layout ---
    let layout_start = Instant::now();
    let engine = LayeredLayout;
    let sizes = MeasuredSizes::default();
    if cli.layout {
        model
            .load(&document)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load rule: {}", e)));
        model
            .auto_layout(&engine, &sizes)
            .await
            .unwrap_or_else(|e| exit_with_error(&format!("Layout failed: {}", e)));
    } else {
        model
            .load_with_layout(&document, &engine, &sizes)
            .await
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load rule: {}", e)));
    }
    let layout_duration = layout_start.elapsed();

    // --- 4. Validation and Output ---
    let saved = model.save_rule().unwrap_or_else(|e| {
        for node_error in &e.node_errors {
            eprintln!(
                "  -> {}: {}",
                node_error.node_id,
                node_error.message.as_deref().unwrap_or("involved")
            );
        }
        exit_with_error(&e.to_string())
    });
    let output = match &linkage_rule {
        Some(rule) => {
            let rule = rule
                .with_document(&saved)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to build linkage rule: {}", e)));
            serde_json::to_string_pretty(&rule)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize linkage rule: {}", e)))
        }
        None => saved.to_json().unwrap_or_else(|e| exit_with_error(&e.to_string())),
    };

    match &cli.output {
        Some(path) => fs::write(path, &output)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e))),
        None => println!("{}", output),
    }

    eprintln!("\n--- Summary ---");
    eprintln!("Operators:            {}", saved.operator_nodes.len());
    eprintln!("Sticky notes:         {}", saved.sticky_notes.len());
    eprintln!("Layout:               {:?}", layout_duration);
    eprintln!("Total Execution:      {:?}", total_start.elapsed());
}

fn read_file(path: &str, what: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
