use clap::{Parser, Subcommand};
use pokedex_engine::{
    source::source_for_location, EngineConfig, FuzzyRanker, InvalidRecordPolicy, Language,
    PokedexEngine, Record, SortCriterion, SqliteStore, Theme,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pokedex-cli")]
#[command(about = "Pokedex ranking and ordering engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Dataset file path or http(s) URL [env: POKEDEX_DATA]
    #[arg(long)]
    data: Option<String>,

    /// Database path [env: POKEDEX_DB_PATH]
    #[arg(short, long)]
    db: Option<String>,

    /// Keep malformed records with defaults instead of dropping them
    #[arg(long)]
    coerce: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    Search {
        /// Search query
        query: String,

        /// Language (en, jp); defaults to the saved preference
        #[arg(short, long)]
        lang: Option<String>,

        /// Sort criterion (id-asc, id-desc, name-asc, name-desc, total-desc);
        /// defaults to the saved preference
        #[arg(short, long)]
        sort: Option<String>,

        /// Maximum results shown
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Show per-field scores
        #[arg(long)]
        explain: bool,
    },

    /// Show one record
    Show {
        /// Record id
        id: u32,
    },

    /// List the catalog with the saved preferences
    List {
        /// Sort criterion; defaults to the saved preference
        #[arg(short, long)]
        sort: Option<String>,
    },

    /// Get cache statistics
    Stats,

    /// Drop the persisted dataset and every cached ranking
    Clear,

    /// Show or change saved preferences
    Prefs {
        #[arg(long)]
        lang: Option<String>,

        #[arg(long)]
        sort: Option<String>,

        #[arg(long)]
        theme: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pokedex_engine=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = EngineConfig::from_env();
    if let Some(data) = cli.data {
        config.data_location = data;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if cli.coerce {
        config.invalid_records = InvalidRecordPolicy::Coerce;
    }

    let store = Arc::new(SqliteStore::new(&config.db_path)?);
    let source = source_for_location(&config.data_location, config.http_timeout())?;
    let engine = PokedexEngine::new(Arc::from(source), store.clone(), &config);

    match cli.command {
        Commands::Search {
            query,
            lang,
            sort,
            limit,
            explain,
        } => {
            let session = engine.session();
            let language = parse_language(lang.as_deref()).unwrap_or(session.language);

            println!("🔍 Searching for: {} [{}]", query, language);

            let criterion = sort
                .as_deref()
                .map(SortCriterion::from_code)
                .unwrap_or(session.criterion);

            let outcome = engine.search_sorted(&query, language, criterion).await?;
            let records = &outcome.records;

            println!(
                "\n✅ {} matches ({:?}, {:.2}ms, sorted {})",
                records.len(),
                outcome.source,
                outcome.latency_ms,
                criterion
            );

            let ranker = FuzzyRanker::new();
            for (i, record) in records.iter().take(limit).enumerate() {
                println!("   {}. {}", i + 1, record.display_name(language));

                if explain {
                    for field in ranker.explain(&query, language, record) {
                        if field.score > 0.0 {
                            println!(
                                "        {:?} '{}': {:.2}",
                                field.kind, field.text, field.score
                            );
                        }
                    }
                }
            }

            if records.len() > limit {
                println!("   ... {} more", records.len() - limit);
            }
        }

        Commands::Show { id } => {
            let language = engine.session().language;

            match engine.get_by_id(id).await? {
                Some(record) => print_record(&record, language),
                None => println!("❌ No record with id {}", id),
            }
        }

        Commands::List { sort } => {
            if let Some(code) = sort.as_deref() {
                engine.set_sort_criterion(SortCriterion::from_code(code));
            }
            let session = engine.session();

            println!("📋 Catalog ({}, {})", session.language, session.criterion);
            for record in engine.view("").await? {
                println!("   {}", record.display_name(session.language));
            }
        }

        Commands::Stats => {
            let catalog = engine.load().await?;
            let stats = engine.cache_stats();

            println!("📊 Engine Statistics:");
            println!("   Records: {}", catalog.len());
            println!("   Store entries: {}", store.len()?);
            println!("   Memory entries: {}", stats.memory_entries);
            println!("   Hit ratio: {:.2}", stats.hit_ratio());
            println!("   Store failures: {}", stats.store_failures);
        }

        Commands::Clear => {
            println!("🧹 Clearing dataset and ranking cache...");
            engine.clear();
            println!("✅ Done ({} store entries left)", store.len()?);
        }

        Commands::Prefs { lang, sort, theme } => {
            if let Some(language) = parse_language(lang.as_deref()) {
                engine.set_language(language);
            }
            if let Some(code) = sort.as_deref() {
                engine.set_sort_criterion(SortCriterion::from_code(code));
            }
            if let Some(theme) = theme.as_deref().and_then(Theme::from_code) {
                engine.set_theme(theme);
            }

            let session = engine.session();
            println!("⚙️ Preferences:");
            println!("   Language: {}", session.language);
            println!("   Sort: {}", session.criterion);
            println!("   Theme: {}", session.theme);
        }
    }

    Ok(())
}

fn parse_language(code: Option<&str>) -> Option<Language> {
    let code = code?;
    let language = Language::from_code(code);
    if language.is_none() {
        eprintln!("⚠️ Unknown language '{}', ignoring", code);
    }
    language
}

fn print_record(record: &Record, language: Language) {
    println!("{}", record.display_name(language));
    if let Some(other) = record.localized_name(language.other()) {
        println!("   {}: {}", language.other(), other);
    }
    if let Some(romaji) = &record.name_romaji {
        println!("   Romaji: {}", romaji);
    }
    if !record.labels(language).is_empty() {
        println!("   Types: {}", record.labels(language).join(" / "));
    }
    if !record.abilities(language).is_empty() {
        println!("   Abilities: {}", record.abilities(language).join(", "));
    }
    if let Some(stats) = &record.stats {
        let parts: Vec<String> = stats.iter().map(|(k, v)| format!("{} {}", k, v)).collect();
        println!("   Stats: {} (total {})", parts.join(", "), record.stat_total());
    }
    if let Some(bio) = record.bio(language) {
        println!("   {}", bio);
    }
}
