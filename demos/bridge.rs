use clap::{Parser, Subcommand};
use crossbar_http_rs::{error::Result, CallOptions, Config, Dispatcher, Kwargs};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Simple program to exercise a Crossbar HTTP bridge: call or publish.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The base URL of the bridge (e.g., http://localhost:8080/)
    #[arg(short, long)]
    url: String,

    /// Key for signed requests
    #[arg(long, requires = "secret")]
    key: Option<String>,

    /// Secret for signed requests
    #[arg(long, requires = "key")]
    secret: Option<String>,

    /// Override the path suffix ("call" / "publish")
    #[arg(long)]
    path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::SetTrue, default_value_t = false)]
    verbose: bool,

    /// Dispatch on the worker pool
    #[arg(long, action = clap::ArgAction::SetTrue, default_value_t = false)]
    concurrent: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Call a procedure
    Call {
        procedure: String,
        /// Positional arguments, each parsed as JSON
        args: Vec<String>,
        /// Keyword arguments as a JSON object
        #[arg(long)]
        kwargs: Option<String>,
    },
    /// Publish to a topic
    Publish {
        topic: String,
        args: Vec<String>,
        #[arg(long)]
        kwargs: Option<String>,
    },
}

fn parse_args(raw: &[String]) -> Vec<Value> {
    raw.iter()
        .map(|arg| serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.clone())))
        .collect()
}

fn parse_kwargs(raw: Option<&str>) -> Result<Kwargs> {
    match raw {
        Some(raw) => Ok(serde_json::from_str(raw)?),
        None => Ok(Kwargs::new()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let mut config = Config::new(&args.url)
        .verbose(args.verbose)
        .concurrent(args.concurrent);
    if let (Some(key), Some(secret)) = (&args.key, &args.secret) {
        config = config.with_credentials(key, secret);
    }
    let mut options = CallOptions::default();
    options.transport_path = args.path.clone();
    // hooks only fire on the worker pool
    if args.concurrent {
        options = options.response_hook(|response| {
            println!("Hook saw status {}", response.status);
        });
    }

    let dispatcher = Dispatcher::from_config(config)?;
    match (&args.command, &dispatcher) {
        (Command::Call { procedure, args, kwargs }, Dispatcher::Blocking(client)) => {
            let kwargs = parse_kwargs(kwargs.as_deref())?;
            let result = client.call_with(procedure, parse_args(args), kwargs, &options)?;
            println!("Call result: {:?}", result);
        }
        (Command::Call { procedure, args, kwargs }, Dispatcher::Concurrent(client)) => {
            let kwargs = parse_kwargs(kwargs.as_deref())?;
            let pending = client.call_with(procedure, parse_args(args), kwargs, &options);
            let result = pending.wait()?.into_call_result()?;
            println!("Call result: {:?}", result);
        }
        (Command::Publish { topic, args, kwargs }, Dispatcher::Blocking(client)) => {
            let kwargs = parse_kwargs(kwargs.as_deref())?;
            let id = client.publish_with(topic, parse_args(args), kwargs, &options)?;
            println!("Published with id: {}", id);
        }
        (Command::Publish { topic, args, kwargs }, Dispatcher::Concurrent(client)) => {
            let kwargs = parse_kwargs(kwargs.as_deref())?;
            let pending = client.publish_with(topic, parse_args(args), kwargs, &options);
            let id = pending.wait()?.into_publish_id()?;
            println!("Published with id: {}", id);
        }
    }

    Ok(())
}
