use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use portal_query::{Criteria, QueryConfig, QueryEngine, SortDirection};
use portal_records::{Collection, RecordKind};

#[derive(Parser, Debug)]
#[command(
    name = "portal-cli",
    about = "Search, filter and sort a portal record collection stored as JSON."
)]
struct Args {
    /// Path to the JSON array of records.
    #[arg(short, long)]
    input: PathBuf,

    /// Collection type: patients, doctors, appointments or journal.
    #[arg(short, long)]
    kind: RecordKind,

    /// Case-insensitive search term.
    #[arg(short, long, default_value = "")]
    search: String,

    /// Field the search term is matched against (repeatable).
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Equality filter as field=value; `all` leaves the field unconstrained.
    #[arg(short, long = "filter")]
    filters: Vec<String>,

    /// Field to sort by.
    #[arg(long)]
    sort: Option<String>,

    /// Sort in descending order.
    #[arg(long)]
    desc: bool,

    /// Optional JSON file with query settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print value counts for this field instead of records.
    #[arg(long)]
    facet: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("warn")
        .context("Invalid log specification")?
        .start()
        .context("Could not start logger")?;

    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Could not read file {:?}", args.input))?;

    let config = load_config(args.config.as_ref())?;
    let engine = QueryEngine::new(config);
    let collection = Collection::from_json(args.kind, &data)
        .with_context(|| format!("Could not load {} from {:?}", args.kind, args.input))?;

    info!(
        "event=collection_loaded kind={} size={}",
        collection.kind(),
        collection.len()
    );

    if let Some(field) = args.facet.as_deref() {
        let facets = collection.facets(&engine, field);
        println!("{}", serde_json::to_string_pretty(&facets)?);
        return Ok(());
    }

    let criteria = build_criteria(&args)?;
    let projection = collection.query_value(&engine, &criteria)?;
    println!("{}", serde_json::to_string_pretty(&projection)?);

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<QueryConfig> {
    let Some(path) = path else {
        return Ok(QueryConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read config {:?}", path))?;
    let config: QueryConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid config {:?}", path))?;
    config.validate()?;
    Ok(config)
}

fn build_criteria(args: &Args) -> anyhow::Result<Criteria> {
    let mut criteria = Criteria::new()
        .search(args.search.clone())
        .in_fields(args.fields.iter().cloned());

    for raw in &args.filters {
        let (field, value) = Criteria::parse_filter(raw)?;
        if criteria.filters.contains_key(&field) {
            bail!("Filter for `{field}` given more than once");
        }
        criteria = criteria.filter(field, value);
    }

    if let Some(key) = &args.sort {
        criteria = criteria.sort_by(key.clone());
    }
    if args.desc {
        criteria.sort_direction = SortDirection::Descending;
    }

    Ok(criteria)
}
