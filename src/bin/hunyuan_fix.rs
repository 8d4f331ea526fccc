//! hunyuan-fix: 单次运行适配器流水线的命令行工具
//!
//! Usage:
//!   hunyuan-fix process [--config <path>] [--offline] [<file>|-]   Rewrite one request body
//!   hunyuan-fix key <image-url> [--context <text>]                  Print the cache key for images
//!   hunyuan-fix config [--config <path>]                            Print the effective configuration

use anyhow::{bail, Context};
use hunyuan_adapter::cache::key;
use hunyuan_adapter::cascade::NullVisionClient;
use hunyuan_adapter::types::ContentPart;
use hunyuan_adapter::{AdapterConfig, AdapterHandler};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "process" => cmd_process(&args[2..]).await,
        "key" => cmd_key(&args[2..]),
        "config" => cmd_config(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("hunyuan-fix {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"hunyuan-fix: 混元适配器命令行工具

USAGE:
    hunyuan-fix <COMMAND> [OPTIONS]

COMMANDS:
    process [--config <path>] [--offline] [<file>|-]
                                Rewrite a chat-completion request body (stdin by default)
    key <image-url>... [--context <text>]
                                Print the cache key for one or more images
    config [--config <path>]    Print the effective configuration (API key omitted)
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    API_KEY                     Credential for the vision model
    HUNYUAN_API_BASE            Override the API base URL
    HUNYUAN_VISION_MODEL        Override the vision model id
    HUNYUAN_TEXT_MODEL          Override the text model id
    RUST_LOG                    Log filter (default: info)"#
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Positional arguments, skipping flags and their values.
fn positionals<'a>(args: &'a [String], flags_with_values: &[&str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if flags_with_values.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

fn load_config(args: &[String]) -> anyhow::Result<AdapterConfig> {
    let config = match flag_value(args, "--config") {
        Some(path) => AdapterConfig::from_yaml_file(PathBuf::from(path))
            .with_context(|| format!("loading config from {path}"))?,
        None => AdapterConfig::default(),
    };
    let config = config.apply_env();
    config.validate()?;
    Ok(config)
}

async fn cmd_process(args: &[String]) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let offline = args.iter().any(|a| a == "--offline");

    let input = match positionals(args, &["--config"]).first() {
        Some(&"-") | None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        }
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?,
    };
    let body: serde_json::Value = serde_json::from_str(&input).context("request is not valid JSON")?;

    let handler = if offline {
        AdapterHandler::new(config, Arc::new(NullVisionClient::new()))?
    } else {
        AdapterHandler::from_config(config)?
    };
    handler.initialize()?;

    match handler.process_request(body).await {
        Ok(rewritten) => {
            println!("{}", serde_json::to_string_pretty(&rewritten)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err)?);
            bail!("request rejected with HTTP {}", err.code())
        }
    }
}

fn cmd_key(args: &[String]) -> anyhow::Result<()> {
    let urls = positionals(args, &["--context"]);
    if urls.is_empty() {
        bail!("key: at least one image URL is required");
    }
    let parts: Vec<ContentPart> = urls.iter().map(|u| ContentPart::image_url(*u)).collect();

    let derived = match flag_value(args, "--context") {
        Some(context) => key::cascade_key(&parts, context),
        None => key::batch_key(&parts),
    };
    match derived {
        Some(k) => println!("{k}"),
        None => bail!("no cache key could be derived"),
    }
    Ok(())
}

fn cmd_config(args: &[String]) -> anyhow::Result<()> {
    let config = load_config(args)?;
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
