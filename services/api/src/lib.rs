mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use admit_tree::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
