mod cli;
mod infra;
mod offer;
mod routes;
mod server;

use fare_lens::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
