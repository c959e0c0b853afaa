//! Shell-bridge binary entry point.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use shell_bridge::cli::{self, Args};
use shell_bridge::config::Config;
use shell_bridge::{logging, DiscardOutputLog, DriverReport, ScriptDriver, ShellSession};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'shell-bridge --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    let _ = logging::try_init_with_filter(config.log_filter());
    info!("shell-bridge v{}", env!("CARGO_PKG_VERSION"));

    match run(&config, &args).await {
        Ok(report) => {
            info!(
                commands = report.commands_sent(),
                lines = report.lines_read(),
                "script finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, args: &Args) -> shell_bridge::Result<DriverReport> {
    let options = config.to_session_options()?;
    // Output is echoed to stdout by the driver; logging it as well would
    // print every line twice.
    let session = ShellSession::open_with_log(options, Arc::new(DiscardOutputLog))?;

    let script: Option<PathBuf> = args.script.clone();
    let result = session
        .run_driver(move |bridge| {
            let mut driver = ScriptDriver::new(bridge).echo_to(std::io::stdout());
            match script {
                Some(path) => driver.run_script(BufReader::new(File::open(path)?)),
                None => driver.run_script(std::io::stdin().lock()),
            }
        })
        .await;

    session.close().await;
    result
}
