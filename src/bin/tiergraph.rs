use clap::Parser;
use tiergraph_core::cli::{self, Cli};
use tiergraph_core::exit::TierGraphExit;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn main() -> TierGraphExit {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(cmd) = cli.command else {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        return TierGraphExit::Success;
    };

    TierGraphExit::from(cli::dispatch::execute(cmd, cli.config))
}
