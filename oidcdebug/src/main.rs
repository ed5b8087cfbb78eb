use clap::{Parser, Subcommand};
use dotenv::dotenv;
use oidcdebug::{Browser, Config, Flow, RedirectFollower, Stdout, SystemBrowser};
use setup::tracing::init_tracer;
use std::{
    error::Error,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};
use testmock::MockProvider;

const SERVICE_NAME: &str = "oidcdebug";

#[derive(Debug, Parser)]
#[command(
    name = "oidcdebug",
    about = "Debug issues with OIDC",
    long_about = "Tools to help diagnose issues with OIDC."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Test JWT issued by OIDC server
    ///
    /// Handles a simple OIDC authentication flow and displays the JWT that was issued.
    Test {
        /// Path of the YAML config file
        #[arg(short, long)]
        config: PathBuf,

        /// Follow the provider's redirects with an HTTP client instead of
        /// opening a browser. Only works with providers that do not ask for
        /// credentials, e.g. the mock provider.
        #[arg(long)]
        headless: bool,
    },

    /// Run a mock OIDC provider that replies with pre-canned responses
    Mock {
        #[arg(short, long, default_value_t = 4444)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    dotenv().ok();
    let cli = Cli::parse();
    let tracer = init_tracer(SERVICE_NAME)?;

    let code = match cli.command {
        Command::Test { config, headless } => {
            if headless {
                test(&config, RedirectFollower).await
            } else {
                test(&config, SystemBrowser).await
            }
        }
        Command::Mock { port } => mock(port).await?,
    };

    tracer.shutdown()?;
    Ok(code)
}

async fn test(path: &Path, browser: impl Browser) -> ExitCode {
    let config = match Config::load(path) {
        Ok(config) => config,
        Err(err) => {
            println!("Error reading config: {err}");
            return ExitCode::FAILURE;
        }
    };

    let flow: Flow<_> = Flow::new(browser, Arc::new(Stdout));
    match flow.start(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn mock(port: u16) -> Result<ExitCode, Box<dyn Error>> {
    let server = MockProvider::spawn_on(("127.0.0.1", port)).await?;
    println!("mock provider listening on {}", server.base_url());
    println!("issuer is {}", server.issuer());

    tokio::signal::ctrl_c().await?;
    server.shutdown().await?;
    Ok(ExitCode::SUCCESS)
}
