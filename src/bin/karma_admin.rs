//! Karma Hub admin tooling
//!
//! Bulk user import, admin bootstrap and email confirmation.

use std::path::PathBuf;
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

use KarmaHub::{
    config::Settings,
    database::{connection::{create_pool, run_migrations}, DatabaseService},
    import::{latest_results_file, read_sheet, AdminAccount, ImportResults, UserImporter},
    utils::logging,
};

#[derive(Debug, Parser)]
#[command(name = "karma-admin", version, about = "Campus Karma Hub admin tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import students from a .csv, .xlsx or .xls file
    ImportUsers {
        file: PathBuf,
        /// Directory for the results and credentials files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Create an admin account or reset its password
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long, env = "KARMAHUB_ADMIN_PASSWORD")]
        password: String,
        #[arg(long, default_value = "System Admin")]
        name: String,
        #[arg(long)]
        college: Option<String>,
    },
    /// Confirm every account created by an import run
    ConfirmEmails {
        /// Results file; defaults to the newest import-results-*.json in the current directory
        #[arg(long)]
        results: Option<PathBuf>,
    },
}

fn print_summary(results: &ImportResults) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("IMPORT SUMMARY");
    println!("{}", rule);
    println!("Successfully created: {}", results.success.len());
    println!("Skipped: {}", results.skipped.len());
    println!("Failed: {}", results.failed.len());
    println!("Total processed: {}", results.total());
    println!("{}", rule);

    if !results.failed.is_empty() {
        println!("\nFailed records:");
        for f in &results.failed {
            println!("   Row {}: {} - {}", f.row, f.email.as_deref().unwrap_or("NO EMAIL"), f.error);
        }
    }
    if !results.skipped.is_empty() {
        println!("\nSkipped records:");
        for s in &results.skipped {
            println!("   Row {}: {} - {}", s.row, s.email.as_deref().unwrap_or("NO EMAIL"), s.reason);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::new().context("Failed to load configuration")?;
    let _log_guard = logging::init_logging(&settings.logging)?;

    let pool = create_pool(&settings.database).await?;
    run_migrations(&pool).await?;
    let importer = UserImporter::new(&DatabaseService::new(pool));

    match cli.command {
        Command::ImportUsers { file, output_dir } => {
            anyhow::ensure!(file.exists(), "File not found: {}", file.display());

            let sheet = read_sheet(&file).with_context(|| format!("Error reading {}", file.display()))?;
            println!("Found {} records", sheet.rows.len());
            println!("Column headers detected: {}", sheet.headers.join(", "));

            let results = importer.import_sheet(&sheet).await;
            print_summary(&results);

            let report = results.write(&output_dir, Utc::now())?;
            println!("\nDetailed results saved to: {}", report.results_file.display());
            if let Some(credentials) = report.credentials_file {
                println!("User credentials saved to: {}", credentials.display());
            }
        }
        Command::CreateAdmin { email, password, name, college } => {
            let profile = importer
                .create_admin(AdminAccount { email, password, name, college })
                .await?;
            println!("Admin ready: {} ({})", profile.email, profile.id);
        }
        Command::ConfirmEmails { results } => {
            let path = match results {
                Some(path) => path,
                None => latest_results_file(&PathBuf::from("."))?,
            };
            println!("Using results file: {}", path.display());

            let summary = importer.confirm_emails(&path).await?;
            println!("Confirmed: {}", summary.confirmed);
            println!("Failed: {}", summary.failed);
        }
    }

    Ok(())
}
