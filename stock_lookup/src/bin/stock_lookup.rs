use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stock_lookup::{
    AssetResolver, CatalogStore, ItemReport, Lookup, LookupOutcome, SubstituteFilter,
    catalog::dump, load_config_path, lookup::format_price,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Stock lookup over reconciled catalog exports")]
struct Cli {
    /// Engine config (TOML).
    #[arg(long, value_name = "FILE", env = "STOCK_LOOKUP_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Look up one or more items.
    Query {
        #[arg(value_name = "ITEM", required = true)]
        items: Vec<String>,
        /// Print one JSON document per item instead of text.
        #[arg(long)]
        json: bool,
        /// Show every substitute, out-of-stock and unknown ones included.
        #[arg(long)]
        all_substitutes: bool,
    },
    /// Write the merged catalog as CSV.
    Dump {
        /// Target file; defaults to `dump_path` from the config, then stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config_path(&cli.config)?;

    // No background dump: the `dump` command writes synchronously.
    let store = CatalogStore::new(cfg.sources.clone(), cfg.layout.clone(), cfg.merge.clone());
    let snapshot = store.rebuild().context("build catalog")?;

    match cli.cmd {
        Cmd::Query {
            items,
            json,
            all_substitutes,
        } => {
            let resolver = AssetResolver::from_config(&cfg.assets);
            let lookup = Lookup::new(&snapshot.catalog, &resolver);
            let filter = if all_substitutes {
                SubstituteFilter::All
            } else {
                cfg.lookup.substitute_filter
            };

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for raw in &items {
                let outcome = lookup.query(raw);
                if json {
                    serde_json::to_writer(&mut out, &outcome)?;
                    writeln!(out)?;
                } else {
                    print_outcome(&mut out, raw, &outcome, filter)?;
                }
            }
        }
        Cmd::Dump { out } => match out.or(cfg.dump_path) {
            Some(path) => {
                dump::write_dump(&snapshot.catalog, &path)
                    .with_context(|| format!("write dump {}", path.display()))?;
                tracing::info!(path = %path.display(), records = snapshot.catalog.len(), "wrote dump");
            }
            None => dump::write_catalog(std::io::stdout().lock(), &snapshot.catalog)?,
        },
    }

    Ok(())
}

fn print_outcome(
    out: &mut impl Write,
    raw: &str,
    outcome: &LookupOutcome,
    filter: SubstituteFilter,
) -> std::io::Result<()> {
    match outcome {
        LookupOutcome::InvalidQuery => writeln!(out, "{raw:?}: no item number found"),
        LookupOutcome::NotFound { key } => writeln!(out, "{key}: not in catalog"),
        LookupOutcome::Found(report) => print_report(out, report, filter),
    }
}

fn print_report(
    out: &mut impl Write,
    report: &ItemReport,
    filter: SubstituteFilter,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{}: {} (price {})",
        report.key,
        report.status,
        format_price(report.price)
    )?;
    if let Some(img) = &report.image {
        writeln!(out, "  image: {}", img.display())?;
    }
    for sub in report.visible_substitutes(filter) {
        write!(
            out,
            "  alt {}: {} (price {})",
            sub.key,
            sub.status,
            format_price(sub.price)
        )?;
        match &sub.image {
            Some(img) => writeln!(out, " {}", img.display())?,
            None => writeln!(out)?,
        }
    }
    Ok(())
}
