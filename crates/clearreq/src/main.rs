use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use clearreq::commands::{self, analyze::AnalyzeOptions};
use clearreq::config::{self, AppConfig, ClientConfig};
use clearreq::model::{ResultsQuery, SortKey, TypeFilter};
use clearreq::{boundary, output};

#[derive(Parser)]
#[command(name = "clearreq")]
#[command(about = "Requirements analysis client - classify a .txt or .pdf document and review past analyses")]
#[command(version)]
struct Cli {
  /// Base URL of the analysis service
  #[arg(long, global = true, env = "CLEARREQ_API_URL", default_value = config::DEFAULT_BASE_URL)]
  api_url: String,

  /// Directory holding the analysis history (default: ~/.clearreq)
  #[arg(long, global = true, env = "CLEARREQ_DIR")]
  data_dir: Option<PathBuf>,

  /// Request timeout in seconds (default: none)
  #[arg(long, global = true)]
  timeout: Option<u64>,

  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Show error details in the failure panel
  #[arg(long, global = true, env = "CLEARREQ_DEV")]
  dev: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Args, Debug, Default)]
struct QueryArgs {
  /// Only show requirements whose text or id contains this
  #[arg(long)]
  search: Option<String>,
  /// Sort the requirements table
  #[arg(long, value_enum)]
  sort: Option<SortKey>,
  /// Only show requirements of this type
  #[arg(long = "type", value_enum, default_value_t = TypeFilter::All)]
  kind: TypeFilter,
}

impl From<QueryArgs> for ResultsQuery {
  fn from(args: QueryArgs) -> Self {
    ResultsQuery { search: args.search.unwrap_or_default(), sort: args.sort, filter: args.kind }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Analyze a requirements document
  Analyze {
    /// Path to a .txt or .pdf file
    file: PathBuf,
    /// Declared content type, instead of guessing from the extension
    #[arg(long)]
    mime: Option<String>,
    #[command(flatten)]
    query: QueryArgs,
  },
  /// Browse past analyses
  History {
    #[command(subcommand)]
    command: HistoryCommands,
  },
  /// Check that the analysis service is up
  Health,
  /// Interactive session: select, analyze and browse in one place
  Shell,
}

#[derive(Subcommand)]
enum HistoryCommands {
  /// List past analyses, newest first
  List,
  /// Show the result of a past analysis
  Show {
    id: i64,
    #[command(flatten)]
    query: QueryArgs,
  },
  /// Copy a past result to the clipboard
  Copy {
    id: i64,
    /// Print the text instead of using the clipboard
    #[arg(long)]
    print: bool,
  },
  /// Save a past result as JSON
  Export {
    id: i64,
    /// Destination file (default: <document>-<id>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Delete all past analyses
  Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);
  boundary::install_panic_hook(cli.dev);

  let dev_mode = cli.dev;
  match run(cli).await {
    Ok(code) => code,
    Err(err) => {
      eprintln!("{}", boundary::report(&err, dev_mode));
      ExitCode::from(boundary::FAILURE_EXIT_CODE)
    }
  }
}

fn init_logging(verbose: bool) {
  let default = if verbose { "clearreq=debug" } else { "clearreq=warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
  let client = match ClientConfig::new(&cli.api_url) {
    Ok(client) => client.with_timeout(cli.timeout.map(Duration::from_secs)),
    Err(err) => {
      output::error(&err.to_string());
      return Ok(ExitCode::FAILURE);
    }
  };

  let config = AppConfig {
    client,
    data_dir: cli.data_dir.unwrap_or_else(config::default_data_dir),
    dev_mode: cli.dev,
  };

  match cli.command {
    Commands::Analyze { file, mime, query } => {
      commands::analyze::handle(&config, AnalyzeOptions { path: file, mime, query: query.into() }).await
    }
    Commands::History { command } => match command {
      HistoryCommands::List => commands::history::list(&config),
      HistoryCommands::Show { id, query } => commands::history::show(&config, id, query.into()),
      HistoryCommands::Copy { id, print } => commands::history::copy(&config, id, print),
      HistoryCommands::Export { id, output } => commands::history::export(&config, id, output),
      HistoryCommands::Clear => commands::history::clear(&config),
    },
    Commands::Health => commands::health::handle(&config).await,
    Commands::Shell => commands::shell::handle(&config).await,
  }
}
