use crate::offer::{run_offer_view, OfferViewArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fare_lens::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fare Lens",
    about = "Normalize flight offers and serve display-ready fare breakdowns",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with raw offer documents from the command line
    Offer {
        #[command(subcommand)]
        command: OfferCommand,
    },
}

#[derive(Subcommand, Debug)]
enum OfferCommand {
    /// Print the view model of a raw offer JSON file
    View(OfferViewArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Offer {
            command: OfferCommand::View(args),
        } => run_offer_view(args),
    }
}
