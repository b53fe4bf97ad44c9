use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use rulecast::{FieldMap, FilterCompiler, ParseOptions};

/// Compile a filter expression and print its rule notation as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON schema file; the built-in HTTP/IP schema when absent
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Render field SRC as DST, ahead of the schema's mapping
    #[arg(short, long = "map", value_name = "SRC=DST", value_parser = parse_mapping)]
    map: Vec<(String, String)>,

    /// Wrap the notation with the DNF flag
    #[arg(long)]
    meta: bool,

    /// Print the lexed tokens instead of compiling
    #[arg(long)]
    tokens: bool,

    /// Filter expression
    expr: String,
}

fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((src, dst)) if !src.is_empty() && !dst.is_empty() => {
            Ok((src.to_owned(), dst.to_owned()))
        }
        _ => Err(format!("expected SRC=DST, got '{raw}'")),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();

    let compiler = match &args.schema {
        Some(path) => FilterCompiler::from_file(path)
            .with_context(|| format!("loading schema {}", path.display()))?,
        None => FilterCompiler::default(),
    };

    if args.tokens {
        for spanned in rulecast::parse::tokenize(&args.expr, compiler.schema())? {
            println!("{:>4}  {}", spanned.offset, spanned.token);
        }
        return Ok(());
    }

    let overrides: FieldMap = args.map.into_iter().collect();
    let options = ParseOptions::new().field_overrides(overrides);
    let filter = compiler.parse_with(&args.expr, &options)?;
    log::debug!("compiled {filter}");

    let output = if args.meta {
        json!({
            "notation": filter.to_json(),
            "original_was_dnf": filter.original_was_dnf(),
        })
    } else {
        filter.to_json()
    };
    println!("{output}");
    Ok(())
}
