mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pydoctree=debug"
    } else {
        "pydoctree=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Summary { build } => cli::summary(build),
        Commands::Modules { build, depth } => cli::list_modules(build, depth),
        Commands::Classes { build, depth } => cli::list_classes(build, depth),
        Commands::Functions { build, depth } => cli::list_functions(build, depth),
        Commands::Json { build, pretty } => cli::dump_json(build, pretty),
    };

    if let Err(err) = &result {
        if let Some(detail) = err
            .downcast_ref::<pydoctree::DocError>()
            .and_then(|e| e.detail())
        {
            tracing::error!("{}", detail);
        }
    }

    result
}
