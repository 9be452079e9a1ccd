use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dramadb::config::{self, DramaConfig};
use dramadb::db::{Database, DbPool};
use dramadb::ingest;
use dramadb::output::{print_json, table};
use dramadb::search::filters::Filters;
use dramadb::search::Page;
use dramadb::server::{self, AppState};

#[derive(Parser)]
#[command(
    name = "dramadb",
    version,
    about = "K-drama catalog: CSV import, search and stats over SQLite"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to database file (default: ~/.dramadb/dramadb.db)
    #[arg(long, global = true, env = "DRAMADB_DB")]
    db: Option<PathBuf>,

    /// Path to config file (default: ~/.dramadb/config.toml)
    #[arg(long, global = true, env = "DRAMADB_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API and static frontend
    Serve {
        /// Bind address
        #[arg(long, env = "DRAMADB_HOST")]
        host: Option<String>,

        /// Bind port
        #[arg(long, env = "DRAMADB_PORT")]
        port: Option<u16>,

        /// Directory holding index.html and static assets
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// CSV source used by POST /convert
        #[arg(long, env = "DRAMADB_CSV")]
        csv: Option<PathBuf>,

        /// Import the CSV before serving if the catalog is empty
        #[arg(long)]
        convert_on_start: bool,
    },

    /// Import a CSV file, replacing the whole catalog
    Convert {
        /// CSV source (default: kdramas.csv)
        #[arg(long, env = "DRAMADB_CSV")]
        csv: Option<PathBuf>,

        /// Parse and count without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Search dramas
    Search {
        /// Text matched against title, original title, overview and cast
        query: Option<String>,

        /// Genre substring (e.g. Romance)
        #[arg(long)]
        genre: Option<String>,

        /// Exact status (see `dramadb stats` for the list)
        #[arg(long)]
        status: Option<String>,

        /// Minimum rating; 0 disables the filter
        #[arg(long, default_value = "0")]
        min_rating: f64,

        /// Maximum results
        #[arg(long, default_value = "20")]
        limit: u32,

        /// Results to skip
        #[arg(long, default_value = "0")]
        offset: u64,
    },

    /// Show every field of one drama
    Show {
        /// TMDB ID
        id: i64,
    },

    /// Show catalog statistics
    Stats,

    /// Show database info
    Info,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented config template if none exists
    Init,
    /// Print the effective config
    Show,
}

fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let json_output = cli.json;

    if matches!(cli.command, Commands::Serve { .. }) {
        init_tracing("dramadb=info,tower_http=info");
    } else {
        init_tracing("warn");
    }

    let config_file = match cli.config {
        Some(path) => path,
        None => config::config_path()?,
    };
    let mut cfg = DramaConfig::load_from(&config_file)?;

    let db_path = match cli.db.or_else(|| cfg.data.db_path.clone()) {
        Some(path) => path,
        None => Database::default_db_path()?,
    };

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
            csv,
            convert_on_start,
        } => {
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if let Some(dir) = static_dir {
                cfg.server.static_dir = dir;
            }
            cfg.server.convert_on_start |= convert_on_start;
            let csv_path = csv.unwrap_or_else(|| cfg.csv_path());

            let pool = DbPool::open(&db_path, cfg.server.pool_size)
                .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

            if cfg.server.convert_on_start {
                let db = pool.get()?;
                if db.count()? == 0 {
                    match ingest::convert_csv(&db, &csv_path, false) {
                        Ok(report) => tracing::info!(
                            "Imported {} dramas from {}",
                            report.records_converted,
                            csv_path.display()
                        ),
                        Err(e) => tracing::warn!("Startup import skipped: {e}"),
                    }
                }
            }

            let state = AppState::new(pool, cfg.server, csv_path);
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?
                .block_on(server::serve(state))?;
        }

        Commands::Convert { csv, dry_run } => {
            let csv_path = csv.unwrap_or_else(|| cfg.csv_path());
            let db = Database::open(&db_path)
                .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
            let report = ingest::convert_csv(&db, &csv_path, dry_run)?;

            if json_output {
                print_json(&report)?;
            } else {
                let action = if dry_run { "Would convert" } else { "Converted" };
                println!(
                    "{action} {} record{} from {} into {}",
                    report.records_converted,
                    if report.records_converted == 1 { "" } else { "s" },
                    report.source.display(),
                    report.database.display()
                );
                if report.skipped > 0 {
                    println!("Skipped {} invalid rows", report.skipped);
                }
            }
        }

        Commands::Search {
            query,
            genre,
            status,
            min_rating,
            limit,
            offset,
        } => {
            let db = Database::open(&db_path)?;
            let filters = Filters {
                query,
                genre,
                status,
                min_rating: Some(min_rating),
            };
            let page = Page::clamped(limit, offset, cfg.server.max_page_size);
            let results = db.search(&filters, page)?;

            if json_output {
                print_json(&results)?;
            } else {
                table::print_search_results(&results);
            }
        }

        Commands::Show { id } => {
            let db = Database::open(&db_path)?;
            let drama = db.get_drama(id)?;
            if json_output {
                print_json(&drama)?;
            } else {
                table::print_drama_detail(&drama);
            }
        }

        Commands::Stats => {
            let db = Database::open(&db_path)?;
            let stats = db.stats()?;
            if json_output {
                print_json(&stats)?;
            } else {
                table::print_stats(&stats);
            }
        }

        Commands::Info => {
            let db = Database::open(&db_path)?;
            let count = db.count()?;
            let schema_ver = db
                .meta("schema_version")?
                .unwrap_or_else(|| "unknown".to_string());
            let last_import = db.meta("last_import_at")?;

            if json_output {
                print_json(&serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "schema_version": schema_ver,
                    "db_path": db.path.display().to_string(),
                    "db_size_bytes": db.size_bytes(),
                    "dramas": count,
                    "last_import_at": last_import,
                }))?;
            } else {
                println!("dramadb v{}", env!("CARGO_PKG_VERSION"));
                println!("  Schema:      v{schema_ver}");
                println!("  Database:    {}", db.path.display());
                println!("  Size:        {}", table::format_bytes(db.size_bytes()));
                println!("  Dramas:      {count}");
                println!(
                    "  Last import: {}",
                    last_import.as_deref().unwrap_or("never")
                );
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Init => {
                if config::init_config(&config_file)? {
                    println!("Wrote {}", config_file.display());
                } else {
                    println!("Config already exists: {}", config_file.display());
                }
            }
            ConfigAction::Show => {
                println!("# {}", config_file.display());
                print!("{}", cfg.display()?);
            }
        },
    }

    Ok(())
}
