use clap::{Parser as ClapParser, Subcommand};
use sqlprune::cli::{
    self, CliError, CommandResult, InspectOptions, PruneHiveOptions, PruneStatsOptions, SplitsOptions,
};
use sqlprune::hive::{escape_path_name, unescape_path_name};
use sqlprune::output::{to_json, to_json_pretty};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "sqlprune")]
#[command(about = "sqlprune - Partition pruning, fingerprinting and split planning for serialized SQL trees")]
#[command(version)]
struct Cli {
    /// Pretty-print the output
    #[arg(short, long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a query with its literals normalized away
    Fingerprint {
        /// Serialized parse result (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Print a query with its literals replaced by placeholders
    Canonicalize {
        /// Serialized parse result (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Remove predicates on non-partition columns
    PruneHive {
        /// Serialized parse result (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Partition column as NAME or NAME:TYPE (repeatable)
        #[arg(long = "partition", required = true)]
        partitions: Vec<String>,
    },

    /// Rewrite a query into a query over min/max statistics
    PruneStats {
        /// Serialized parse result (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// JSON file describing the statistics columns
        #[arg(long, conflicts_with = "columns")]
        config: Option<String>,

        /// Column as NAME:TYPE, with statistics in min_NAME/max_NAME (repeatable)
        #[arg(long = "column")]
        columns: Vec<String>,

        /// Statistics table name
        #[arg(long)]
        stats_table: Option<String>,
    },

    /// Infer the column types a query expects
    Schema {
        /// Serialized parse result (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Pack a JSON file listing into size-bounded splits
    Splits {
        /// JSON array of {path, size, last_modified} (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Split size threshold in bytes
        #[arg(long)]
        max_split_size: u64,
    },

    /// Decode a Hive partition directory value
    Unescape {
        value: String,
    },

    /// Encode a value as a Hive partition directory value
    Escape {
        value: String,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let pretty = cli.pretty;

    let result = match cli.command {
        Commands::Fingerprint { input } => read_input(input)
            .and_then(|input| cli::execute_fingerprint(&InspectOptions { input })),
        Commands::Canonicalize { input } => read_input(input)
            .and_then(|input| cli::execute_canonicalize(&InspectOptions { input })),
        Commands::Schema { input } => {
            read_input(input).and_then(|input| cli::execute_schema(&InspectOptions { input }))
        }
        Commands::PruneHive { input, partitions } => read_input(input)
            .and_then(|input| cli::execute_prune_hive(&PruneHiveOptions { input, partitions })),
        Commands::PruneStats {
            input,
            config,
            columns,
            stats_table,
        } => read_config(config).and_then(|config| {
            let input = read_input(input)?;
            cli::execute_prune_stats(&PruneStatsOptions {
                input,
                config,
                columns,
                stats_table,
            })
        }),
        Commands::Splits {
            input,
            max_split_size,
        } => read_input(input).and_then(|input| {
            cli::execute_splits(&SplitsOptions {
                input,
                max_split_size,
            })
        }),
        Commands::Unescape { value } => Ok(CommandResult::Json(unescape_path_name(&value).into())),
        Commands::Escape { value } => Ok(CommandResult::Json(escape_path_name(&value).into())),
    };

    let printed = result.and_then(|output| print_result(output, pretty));
    if let Err(e) = printed {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr, filtered by `SQLPRUNE_LOG` (default `warn`).
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SQLPRUNE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn read_config(path: Option<String>) -> Result<Option<String>, CliError> {
    path.map(std::fs::read_to_string)
        .transpose()
        .map_err(CliError::Io)
}

fn print_result(output: CommandResult, pretty: bool) -> Result<(), CliError> {
    let text = match output {
        CommandResult::Tree(tree) if pretty => to_json_pretty(&tree),
        CommandResult::Tree(tree) => to_json(&tree),
        CommandResult::Json(value) if pretty => serde_json::to_string_pretty(&value)?,
        CommandResult::Json(value) => serde_json::to_string(&value)?,
    };
    println!("{}", text);
    Ok(())
}
