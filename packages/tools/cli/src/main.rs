//! Reservation visibility CLI (`rsv`)
//!
//! 공개 범위 필터와 편집 권한을 로컬 데이터로 확인하는 운영 도구입니다.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod context;

use commands::QueryArgs;
use config::CliConfig;
use context::CallerArgs;

#[derive(Parser)]
#[command(name = "rsv")]
#[command(author, version, about = "Reservation visibility policy tool", long_about = None)]
struct Cli {
    #[command(flatten)]
    caller: CallerArgs,

    /// Model alias (overrides config)
    #[arg(long, global = true)]
    alias: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Query rows visible to the caller
    Visible {
        /// Rows file (JSON or YAML array)
        #[arg(long)]
        rows: PathBuf,

        /// Column used as the display value of `list` queries
        #[arg(long, default_value = "title")]
        display_field: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Render the visibility-filtered SELECT statement
    Sql {
        /// Table name
        #[arg(long)]
        table: String,

        /// Model columns (comma-separated), used to detect language columns
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Check whether the caller may edit a record
    CanEdit {
        /// Record as JSON (flat or grouped by alias)
        #[arg(long)]
        row: String,
    },

    /// Show capabilities resolved from a permissions file
    Permissions {
        /// Permissions file (YAML or JSON, overrides --permissions)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsv=info,rsv_core=info,rsv_sql=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // 설정 로드
    let config = CliConfig::load()?;
    let alias = config.alias(cli.alias.as_deref());

    // 명령 실행
    match cli.command {
        Commands::Visible {
            rows,
            display_field,
            query,
        } => {
            let caller = context::resolve_caller(&cli.caller, &config)?;
            commands::visible::run(&caller, &alias, &rows, &display_field, &query, cli.format)
        }
        Commands::Sql {
            table,
            columns,
            query,
        } => {
            let caller = context::resolve_caller(&cli.caller, &config)?;
            commands::sql::run(&caller, &alias, &table, &columns, &query)
        }
        Commands::CanEdit { row } => {
            let caller = context::resolve_caller(&cli.caller, &config)?;
            commands::can_edit::run(&caller, &alias, &row, cli.format)
        }
        Commands::Permissions { file } => {
            let path = file.or_else(|| config.permissions_file(cli.caller.permissions.as_deref()));
            commands::permissions::show(path.as_deref(), cli.caller.room.as_deref(), cli.format)
        }
    }
}
