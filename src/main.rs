use clap::Parser as _;
use provider_ci::cli::Args;
use provider_ci::error::MigrateError;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    fmt().with_target(false).with_env_filter(filter).init();

    match provider_ci::run(&args) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<MigrateError>()
                    .map_or(1, MigrateError::exit_code),
            );
        }
    }
}
