use clap::Parser;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    // a missing .env is fine, the environment may already be set
    let _ = dotenvy::dotenv();
    let args = discogs_reconcile::config::Args::parse();

    match discogs_reconcile::run(args).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("discogs-reconcile: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
