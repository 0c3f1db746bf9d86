use std::process::ExitCode;
use std::time::Duration;

use watchvisor::Watch;
use watchvisor::WatchError;
use watchvisor::cli::Cli;
use watchvisor::logging;

fn main() -> ExitCode {
    let cli = match Cli::try_parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        // Prints usage; exit code 2 for errors, 0 for --help/--version.
        Err(err) => err.exit(),
    };
    logging::init_subscriber(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("watch: {err:#}");
            let code = err
                .downcast_ref::<WatchError>()
                .map_or(1, WatchError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = cli.into_config()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(async { Watch::new(cfg)?.run().await });
    // Stdin and pipe reads sit on blocking threads that may never return.
    runtime.shutdown_timeout(Duration::from_millis(100));
    Ok(result?)
}
