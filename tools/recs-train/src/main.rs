use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dotenvy::dotenv;
use std::env;

mod commands;

#[derive(Parser)]
#[command(name = "recs-train")]
#[command(about = "Offline similarity training CLI for grocery recommendations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Preview changes without applying them")]
    dry_run: bool,

    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        help = "Database connection URL"
    )]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create the database schema")]
    Init {
        #[arg(long, help = "Load demo shops, products and events")]
        seed: bool,
    },

    #[command(about = "Train the item-item similarity table")]
    Items(TrainArgs),

    #[command(about = "Train the user-user similarity table")]
    Users(TrainArgs),

    #[command(about = "Train both similarity tables")]
    All(TrainArgs),

    #[command(about = "Print offline recommendations for a user")]
    Preview {
        #[arg(help = "User to preview")]
        user_id: i64,

        #[arg(
            short,
            long,
            default_value = "5",
            help = "Number of products to show"
        )]
        limit: usize,
    },
}

#[derive(Args)]
struct TrainArgs {
    #[arg(long, default_value = "10", help = "Neighbours kept per row")]
    top_k: usize,

    #[arg(long, help = "Replace the table in a single transaction")]
    atomic: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = cli
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .context(
            "DATABASE_URL must be set either as environment variable or --database-url flag",
        )?;

    match cli.command {
        Commands::Init { seed } => {
            commands::init(&database_url, seed, cli.dry_run).await?;
        }
        Commands::Items(args) => {
            commands::train(
                &database_url,
                commands::TrainTarget::Items,
                args.top_k,
                args.atomic,
                cli.dry_run,
            )
            .await?;
        }
        Commands::Users(args) => {
            commands::train(
                &database_url,
                commands::TrainTarget::Users,
                args.top_k,
                args.atomic,
                cli.dry_run,
            )
            .await?;
        }
        Commands::All(args) => {
            commands::train(
                &database_url,
                commands::TrainTarget::All,
                args.top_k,
                args.atomic,
                cli.dry_run,
            )
            .await?;
        }
        Commands::Preview { user_id, limit } => {
            commands::preview(&database_url, user_id, limit).await?;
        }
    }

    Ok(())
}
