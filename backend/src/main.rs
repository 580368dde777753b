//! Bindload CLI - Load a Bind ERP export into Supabase
//!
//! ```bash
//! bindload                                  # default export, tenant from env
//! bindload --input export.json --company-id <uuid>
//! bindload --dry-run --output tables.json   # in-memory store, no credentials
//! bindload --dry-run --output -             # dump tables to stdout
//! ```

use bindload::{
    load_snapshot, print_summary, LoadOptions, MemoryStore, PipelineResult, StoreConfig,
    SupabaseStore,
};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bindload")]
#[command(about = "Load a sample of a Bind ERP export into Supabase", long_about = None)]
struct Cli {
    /// Bind export JSON file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Tenant UUID (default: BIND_COMPANY_ID, then the built-in tenant)
    #[arg(short, long)]
    company_id: Option<String>,

    /// Load into an in-memory store instead of Supabase
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, write the resulting tables as JSON ("-" for stdout)
    #[arg(short, long, requires = "dry_run")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        // Display already embeds every source message.
        println!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> PipelineResult<()> {
    println!("🚀 Starting Bind data load...");

    let options = LoadOptions::resolve(cli.company_id, cli.input)?;

    if cli.dry_run {
        println!("🧪 Dry run: nothing is written to Supabase");
        let store = MemoryStore::new();
        let summary = load_snapshot(&store, &options).await?;
        print_summary(&summary);
        if let Some(path) = cli.output.as_deref() {
            let json = serde_json::to_string_pretty(&store.snapshot())?;
            write_output(&json, path)?;
        }
        return Ok(());
    }

    // Credentials are checked before any data is read.
    let config = StoreConfig::from_env()?;
    let store = SupabaseStore::new(&config);
    let summary = load_snapshot(&store, &options).await?;
    print_summary(&summary);
    Ok(())
}

fn write_output(content: &str, path: &Path) -> PipelineResult<()> {
    if path == Path::new("-") {
        println!("{}", content);
    } else {
        fs::write(path, content)?;
        println!("💾 Tables written to: {}", path.display());
    }
    Ok(())
}
