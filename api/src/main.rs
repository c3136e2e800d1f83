use clap::{Parser, Subcommand};

mod cmd;

#[derive(Debug, Parser)]
#[clap(name = "dms-perm", about = "Operation permission queries for the DMS platform")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(dms_api::config::Config),
    /// Print the permissions of a user as JSON
    Permissions(cmd::permissions::PermissionsArgs),
    /// Create an object ID
    ///
    /// This is useful for generating fixtures or seeding the grant model by hand.
    MakeId(cmd::admin::MakeId),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    color_eyre::install()?;
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(config) => cmd::server::run(config).await?,
        Commands::Permissions(args) => cmd::permissions::run(args).await?,
        Commands::MakeId(args) => cmd::admin::make_id(args),
    }

    Ok(())
}
