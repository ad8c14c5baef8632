use occi_cli::descriptor::{Environment, LogLevel, LogTarget};
use occi_cli::output::OutputFormat;
use occi_cli::report::Interactive;
use occi_cli::RequestDescriptor;
use std::process::ExitCode;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

fn main() -> ExitCode {
    // flags are not known yet, so resolution logs to stderr at the default level
    let resolving = tracing_subscriber::fmt()
        .with_env_filter(env_filter(LogLevel::default()))
        .with_writer(std::io::stderr)
        .finish();

    let env = Environment::from_process();
    let resolved = tracing::subscriber::with_default(resolving, || {
        occi_cli::run(std::env::args_os().skip(1), &env, &Interactive::terminal())
    });

    let descriptor = match resolved {
        Ok(descriptor) => descriptor,
        Err(exit) => return exit.into(),
    };

    init_logging(&descriptor);
    tracing::info!(endpoint = %descriptor.endpoint, media_type = descriptor.media_type.as_str(), "request resolved");

    if let Err(e) = output(&descriptor) {
        for error in e.chain() {
            eprintln!("{error}")
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level.into()).into())
        .with_env_var("OCCI_LOG")
        .from_env_lossy()
}

fn init_logging(descriptor: &RequestDescriptor) {
    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter(descriptor.log.level));

    match descriptor.log.target {
        LogTarget::Stdout => subscriber.with_writer(std::io::stdout).init(),
        LogTarget::Stderr => subscriber.with_writer(std::io::stderr).init(),
    }
}

/// Prints the resolved request, the transport picks it up from here
fn output(descriptor: &RequestDescriptor) -> anyhow::Result<()> {
    match descriptor.output_format {
        OutputFormat::Json => {
            serde_json::to_writer(std::io::stdout(), descriptor)?;
            println!();
        }
        OutputFormat::JsonPretty => {
            serde_json::to_writer_pretty(std::io::stdout(), descriptor)?;
            println!();
        }
        OutputFormat::Plain => serde_yaml::to_writer(std::io::stdout(), descriptor)?,
    };

    Ok(())
}
