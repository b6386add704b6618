//! A thin command line driver over the JSONPath engine.
//!
//! Exit status: 0 when the query matched at least one node, 1 when it
//! matched nothing, 2 on a compile error or I/O failure.

use std::{
    fs::File,
    io::BufReader,
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use log::debug;
use serde_json::Value;

use jsonpath_query::jsonpath;

#[derive(Parser)]
#[command(
    name = "jsonpath-query",
    version,
    about = "Find values in a JSON document with an RFC 9535 JSONPath expression."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a JSONPath expression to a JSON file and print the
    /// matched values as a JSON array.
    Query {
        /// The JSONPath expression.
        expr: String,

        /// Path to the JSON document to query.
        file: PathBuf,

        /// Pretty-print the output JSON.
        #[arg(long)]
        pretty: bool,

        /// Print normalized paths instead of values.
        #[arg(long)]
        paths: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(msg) => {
            eprintln!("{}", msg);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the query matched at least one node.
fn run(cli: Cli) -> Result<bool, String> {
    match cli.command {
        Command::Query {
            expr,
            file,
            pretty,
            paths,
        } => {
            let query = jsonpath::compile(&expr).map_err(|err| err.to_string())?;
            debug!("compiled query {}", query);

            let file = File::open(&file)
                .map_err(|err| format!("error opening {}: {}", file.display(), err))?;
            let document: Value = serde_json::from_reader(BufReader::new(file))
                .map_err(|err| format!("error reading target document: {}", err))?;

            let nodes = query.find(&document);

            let results = if paths {
                Value::Array(
                    nodes
                        .iter()
                        .map(|node| Value::String(node.path()))
                        .collect(),
                )
            } else {
                Value::Array(nodes.values().into_iter().cloned().collect())
            };

            let output = if pretty {
                serde_json::to_string_pretty(&results)
            } else {
                serde_json::to_string(&results)
            }
            .map_err(|err| format!("error serializing results: {}", err))?;

            println!("{}", output);
            Ok(!nodes.is_empty())
        }
    }
}
