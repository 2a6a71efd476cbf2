mod commands;
mod output;

use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use output::{OutputConfig, OutputFormat};
use revisit::Synchronizer;
use revisit::clock::SystemClock;
use revisit::config::{self, ConfigArgs};
use revisit::logging;
use revisit::scheduling::ScheduleGenerator;
use revisit::service::HttpItemService;

/// CLI for the revisit review scheduler
#[derive(Parser, Debug)]
#[clap(name = "revisit-cli", about = "CLI for pattern-based review schedules")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Review patterns
    #[command(subcommand)]
    Pattern(commands::pattern::PatternCommands),
    /// Categories
    #[command(subcommand)]
    Category(commands::category::CategoryCommands),
    /// Boxes inside a category
    #[command(subcommand, name = "box")]
    Boxes(commands::boxes::BoxCommands),
    /// Manage items
    #[command(subcommand)]
    Item(commands::item::ItemCommands),
    /// Complete or reschedule review dates
    #[command(subcommand)]
    Review(commands::review::ReviewCommands),
    /// Show today's due reviews
    Today(commands::today::TodayArgs),
}

/// Formats an error for human-readable stderr output
fn format_error(err: &anyhow::Error) -> String {
    let err_string = format!("{:#}", err);

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!("Could not connect to server. Is it running?\n  {}", err_string);
    }

    err_string
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // The subscriber needs the resolved log directory; until then, stderr only
    let config = tracing::subscriber::with_default(logging::stderr_subscriber(cli.config.debug), || {
        config::get_config(&cli.config)
    });
    let _guard = logging::init_logging(cli.config.debug, config.log_dir.as_deref())?;

    let service = HttpItemService::from_config(&config)?;
    let client = Synchronizer::new(
        service,
        ScheduleGenerator::new(config.offset_basis),
        Arc::new(SystemClock),
    );
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Pattern(cmd) => commands::pattern::execute(&client, cmd, &output_config).await,
        Commands::Category(cmd) => commands::category::execute(&client, cmd, &output_config).await,
        Commands::Boxes(cmd) => commands::boxes::execute(&client, cmd, &output_config).await,
        Commands::Item(cmd) => commands::item::execute(&client, cmd, &output_config).await,
        Commands::Review(cmd) => commands::review::execute(&client, cmd, &output_config).await,
        Commands::Today(args) => commands::today::execute(&client, args, &output_config).await,
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", format_error(&e));
        process::exit(1);
    }
}
