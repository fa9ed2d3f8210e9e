//! IPL natural language query CLI
//!
//! Loads the ball-by-ball CSV files into DuckDB, then turns each question
//! into a DuckDB query with OpenAI and prints the result table.

use clap::Parser;
use iplql_agent::{Analyst, OpenAiModel};
use iplql_duck::{describe, ensure_table, LoadMode};
use iplql_schema::match_data;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};

mod config;
mod logging;

use config::Config;

const EXIT_COMMANDS: [&str; 4] = ["/exit", "exit", "quit", "/quit"];

#[derive(Debug, Parser)]
#[command(name = "iplql", version, about = "Ask questions about IPL ball-by-ball data")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, env = "IPLQL_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Drop and rebuild the table from the source CSV files
    #[arg(long)]
    rebuild: bool,

    /// Ask a single question and exit
    #[arg(long, short)]
    question: Option<String>,

    /// Print the schema context document and exit
    #[arg(long)]
    describe: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::load_or_default(&args.config)?;
    config.apply_logging_env();
    logging::init();

    if let Some(parent) = config.store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let store = ensure_table(
        &config.store.table,
        &config.store.path,
        &config.store.source_dir,
        LoadMode::from_flag(args.rebuild),
    )?;
    let schema = match_data();

    if args.describe {
        println!("{}", describe(&schema, &store)?);
        return Ok(());
    }

    let api_key = Config::get_openai_api_key()?;
    info!(model = %config.llm.model, "Using OpenAI model");
    let model = OpenAiModel::new(api_key, config.llm.model.clone());

    let analyst = Analyst::new(store, schema, Box::new(model), config.llm.output_mode)?;

    match args.question {
        Some(question) => {
            if !answer(&analyst, &question).await {
                std::process::exit(1);
            }
        }
        None => repl(&analyst).await?,
    }

    Ok(())
}

/// Ask one question and print the outcome. Returns false on failure.
async fn answer(analyst: &Analyst, question: &str) -> bool {
    match analyst.ask(question).await {
        Ok(answer) => {
            println!("Generated DuckDB Query:\n{}\n", answer.sql);
            if let Some(reasoning) = &answer.rationale {
                println!("Reasoning:\n{}\n", reasoning);
            }
            println!("{}", answer.result);
            println!("({} rows)", answer.result.row_count);
            true
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Question failed");
            eprintln!("{}: {}", e.kind(), e);
            false
        }
    }
}

async fn repl(analyst: &Analyst) -> io::Result<()> {
    println!("Ask a question about the '{}' table.", analyst.store().table());
    println!("Type {} to leave.\n", EXIT_COMMANDS.join(", "));

    let stdin = io::stdin();
    loop {
        print!("iplql> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit_command(input) {
            println!("Goodbye!");
            break;
        }

        answer(analyst, input).await;
        println!();
    }

    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|command| command.eq_ignore_ascii_case(input.trim()))
}
