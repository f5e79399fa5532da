mod cli;
mod demo;
mod infra;
mod jobs;
mod routes;
mod server;

use inspekta::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
