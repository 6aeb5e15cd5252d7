use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colloc_core::{
    corpus::{
        CorrectionLexicon, Corrector, JsonlCorpus, LexiconTagger, Normalizer, PersianNormalizer,
        Tagger, Tokenizer, UniformTagger, WordTokenizer,
    },
    export, persistence,
    pipeline::CorpusBuildPipeline,
    search::{
        CollocationEngine, Condition, CorpusIndex, Mode, Query, Ranker, SearchKind, SearchOutcome,
        SortColumn,
    },
    CollocConfig, CollocError, PosCategory, SourceRef,
};

#[derive(Parser, Debug)]
#[command(name = "colloc", about = "Collocation search over a tagged text corpus")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a corpus index and persist it.
    Build {
        /// Directory holding the corpus documents
        #[arg(long, required_unless_present = "jsonl", conflicts_with = "jsonl")]
        root: Option<PathBuf>,
        /// JSONL corpus ({"id", "text"} per line) instead of a directory
        #[arg(long)]
        jsonl: Option<PathBuf>,
        /// Correction lexicon (CSV, or TSV by extension); may be repeated
        #[arg(long)]
        corrections: Vec<PathBuf>,
        /// Tag lexicon: JSON object mapping words to tags
        #[arg(long)]
        tag_lexicon: Option<PathBuf>,
        /// Path to config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output cache file
        #[arg(long)]
        cache: Option<PathBuf>,
        /// Override the maximum words per segment
        #[arg(long)]
        max_words: Option<usize>,
        /// Override the preferred split position
        #[arg(long)]
        ideal_words: Option<usize>,
    },

    /// Run a single query against a cached index.
    Search {
        /// Cache file
        #[arg(long)]
        cache: PathBuf,
        #[command(flatten)]
        query: QueryArgs,
        /// Re-sort by column; repeat to toggle direction
        #[arg(long)]
        sort: Vec<SortColumn>,
        /// Export the rows as CSV
        #[arg(long)]
        export: Option<PathBuf>,
        /// Show the source sentences of this row (1-based)
        #[arg(long)]
        sources_of: Option<usize>,
        /// Export the sources of `--sources-of` as CSV
        #[arg(long, requires = "sources_of")]
        export_sources: Option<PathBuf>,
    },

    /// Interactive query REPL against a cached index.
    Repl {
        /// Cache file
        #[arg(long)]
        cache: PathBuf,
    },

    /// Show index statistics.
    Info {
        /// Cache file
        #[arg(long)]
        cache: PathBuf,
    },

    /// Start HTTP API server.
    Serve {
        /// Cache file
        #[arg(long)]
        cache: PathBuf,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Search phrase
    #[arg(long)]
    phrase: String,
    /// exact or collocation
    #[arg(long, default_value = "collocation")]
    kind: SearchKind,
    /// before, after or both
    #[arg(long, default_value = "both")]
    mode: Mode,
    /// Neighbor must contain this text
    #[arg(long, conflicts_with = "starts_with")]
    contains: Option<String>,
    /// Neighbor must start with this text
    #[arg(long)]
    starts_with: Option<String>,
    /// Neighbor grammatical category, e.g. noun
    #[arg(long)]
    pos: Option<PosCategory>,
}

impl QueryArgs {
    fn to_query(&self) -> Query {
        let condition = match (&self.contains, &self.starts_with) {
            (Some(v), _) => Condition::Contains(v.clone()),
            (None, Some(v)) => Condition::StartsWith(v.clone()),
            (None, None) => Condition::None,
        };
        Query {
            phrase: self.phrase.clone(),
            kind: self.kind,
            mode: self.mode,
            condition,
            pos_filter: self.pos,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            root,
            jsonl,
            corrections,
            tag_lexicon,
            config,
            cache,
            max_words,
            ideal_words,
        } => {
            let mut config = CollocConfig::load(config.as_deref())?;
            if let Some(n) = max_words {
                config.max_words = n;
            }
            if let Some(n) = ideal_words {
                config.ideal_words = n;
            }
            config.validate()?;
            let cache = cache.unwrap_or_else(|| PathBuf::from(&config.cache_file));
            cmd_build(config, root, jsonl, &corrections, tag_lexicon, &cache)?;
        }
        Commands::Search {
            cache,
            query,
            sort,
            export,
            sources_of,
            export_sources,
        } => {
            cmd_search(&cache, &query.to_query(), &sort, export, sources_of, export_sources)?;
        }
        Commands::Repl { cache } => {
            cmd_repl(&cache)?;
        }
        Commands::Info { cache } => {
            cmd_info(&cache)?;
        }
        Commands::Serve { cache, port } => {
            colloc_core::server::start_server(cache, port).await?;
        }
    }

    Ok(())
}

fn linguistics() -> (Arc<dyn Normalizer>, Arc<dyn Tokenizer>) {
    (Arc::new(PersianNormalizer), Arc::new(WordTokenizer))
}

fn cmd_build(
    config: CollocConfig,
    root: Option<PathBuf>,
    jsonl: Option<PathBuf>,
    corrections: &[PathBuf],
    tag_lexicon: Option<PathBuf>,
    cache: &Path,
) -> anyhow::Result<()> {
    println!("Using config: {:?}", config);

    let lexicon = CorrectionLexicon::load_many(corrections);
    println!("Loaded {} corrections.", lexicon.len());
    let corrector = Corrector::new(lexicon)?;

    let tagger: Arc<dyn Tagger> = match tag_lexicon {
        Some(path) => Arc::new(LexiconTagger::from_path(&path, config.default_tag.clone())?),
        None => Arc::new(UniformTagger::new(config.default_tag.clone())),
    };

    let (normalizer, tokenizer) = linguistics();
    let pipeline = CorpusBuildPipeline::new(config.clone(), corrector, normalizer, tokenizer, tagger)?;

    let index = match (root, jsonl) {
        (Some(root), _) => {
            println!("Building corpus from {}...", root.display());
            pipeline.build_from_root(&root)?
        }
        (None, Some(path)) => {
            println!("Building corpus from {}...", path.display());
            pipeline.build_from_jsonl(&JsonlCorpus::new(path))?
        }
        (None, None) => anyhow::bail!("either --root or --jsonl is required"),
    };
    println!(
        "Indexed {} segments from {} documents.",
        index.len(),
        index.document_count()
    );

    println!("Saving corpus to {}...", cache.display());
    persistence::save_corpus(cache, &index, &config)
        .with_context(|| format!("failed to write {}", cache.display()))?;

    println!("Corpus built and saved successfully.");
    Ok(())
}

/// Load a cache, pointing at a rebuild when it cannot be decoded.
fn load_index(cache: &Path) -> anyhow::Result<(CorpusIndex, CollocConfig)> {
    let loaded = match persistence::load_corpus(cache) {
        Ok(loaded) => loaded,
        Err(e @ CollocError::CorruptCache { .. }) => {
            anyhow::bail!("{e}\nrun `colloc build` again to recreate the cache")
        }
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", cache.display())),
    };
    if loaded.legacy {
        println!("Note: legacy cache, source file paths are unavailable.");
    }
    let config = persistence::load_metadata(cache)?
        .map(|m| m.config)
        .unwrap_or_default();
    Ok((loaded.index, config))
}

fn run_query(index: &CorpusIndex, query: &Query) -> anyhow::Result<SearchOutcome> {
    query.validate()?;
    if index.is_empty() {
        return Err(CollocError::EmptyCorpus.into());
    }
    let (normalizer, tokenizer) = linguistics();
    Ok(CollocationEngine::new(index, normalizer, tokenizer).search(query))
}

fn print_outcome(query: &Query, outcome: &SearchOutcome) {
    println!("Query: '{}'", query.phrase.trim());
    if outcome.is_empty() {
        println!("  No results found.");
        return;
    }
    println!("  {:>4}  {:<30} {:<20} {:<14} {:>9}  position", "#", "sample", "term", "role", "frequency");
    for (i, row) in outcome.rows.iter().enumerate() {
        println!(
            "  {:>4}  {:<30} {:<20} {:<14} {:>9}  {}",
            i + 1,
            row.sample,
            row.term,
            row.role,
            row.frequency,
            row.position
        );
    }
}

fn print_sources(
    index: &CorpusIndex,
    outcome: &SearchOutcome,
    row_number: usize,
    extension: &str,
) -> Option<Vec<SourceRef>> {
    let Some(row) = row_number.checked_sub(1).and_then(|i| outcome.rows.get(i)) else {
        println!("  No row {row_number}.");
        return None;
    };
    let sources = outcome.sources_for(row);
    println!("Sources of '{}' ({} sentences):", row.sample, sources.len());
    for source in &sources {
        let location = source
            .source_id
            .as_deref()
            .map(|id| match index.resolve_source(id, extension) {
                Some(path) => path.display().to_string(),
                None => id.to_string(),
            })
            .unwrap_or_else(|| "unknown source".to_string());
        println!("  [{location}]\n    {}", source.sentence);
    }
    Some(sources)
}

fn cmd_search(
    cache: &Path,
    query: &Query,
    sort: &[SortColumn],
    export_path: Option<PathBuf>,
    sources_of: Option<usize>,
    export_sources: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (index, config) = load_index(cache)?;
    let mut outcome = run_query(&index, query)?;

    let mut ranker = Ranker::new();
    for column in sort {
        ranker.sort_by(&mut outcome.rows, *column);
    }
    print_outcome(query, &outcome);

    if let Some(path) = export_path {
        export::export_results(&path, &outcome.rows)?;
        println!("Results written to {}", path.display());
    }

    if let Some(row_number) = sources_of {
        let sources = print_sources(&index, &outcome, row_number, config.extension());
        if let (Some(sources), Some(path)) = (sources, export_sources) {
            export::export_sources(&path, &sources, config.extension())?;
            println!("Sources written to {}", path.display());
        }
    }

    Ok(())
}

const REPL_HELP: &str = "\
Type a phrase to search, or a command:
  :kind exact|collocation     :mode before|after|both
  :pos CATEGORY|none          :contains TEXT | :starts TEXT | :nocond
  :sort COLUMN                :sources N
  :export [FILE]              :export-sources N [FILE]
  :help                       :quit (or an empty line)";

fn cmd_repl(cache: &Path) -> anyhow::Result<()> {
    println!("Loading corpus from {}...", cache.display());
    let (index, config) = load_index(cache)?;
    println!("Corpus loaded. {} segments, {} documents.", index.len(), index.document_count());
    println!("{REPL_HELP}");

    let mut query = Query::collocation("");
    let mut outcome = SearchOutcome::default();
    let mut ranker = Ranker::new();

    let stdin = io::stdin();
    loop {
        print!("colloc> ");
        io::stdout().flush()?;

        let mut buf = String::new();
        let n = stdin.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        let line = buf.trim();
        if line.is_empty() || line == ":quit" {
            break;
        }

        let Some(command) = line.strip_prefix(':') else {
            query.phrase = line.to_string();
            match run_query(&index, &query) {
                Ok(found) => {
                    outcome = found;
                    ranker.rank(&mut outcome.rows);
                    print_outcome(&query, &outcome);
                }
                Err(e) => println!("  {e}"),
            }
            continue;
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map(|(n, a)| (n, a.trim()))
            .unwrap_or((command, ""));
        let result: anyhow::Result<()> = (|| {
            match name {
                "help" => println!("{REPL_HELP}"),
                "kind" => query.kind = arg.parse().map_err(anyhow::Error::msg)?,
                "mode" => query.mode = arg.parse().map_err(anyhow::Error::msg)?,
                "pos" if arg == "none" || arg.is_empty() => query.pos_filter = None,
                "pos" => query.pos_filter = Some(arg.parse().map_err(anyhow::Error::msg)?),
                "contains" => query.condition = Condition::Contains(arg.to_string()),
                "starts" => query.condition = Condition::StartsWith(arg.to_string()),
                "nocond" => query.condition = Condition::None,
                "sort" => {
                    let column: SortColumn = arg.parse().map_err(anyhow::Error::msg)?;
                    ranker.sort_by(&mut outcome.rows, column);
                    print_outcome(&query, &outcome);
                }
                "sources" => {
                    let n: usize = arg.parse().context("expected a row number")?;
                    print_sources(&index, &outcome, n, config.extension());
                }
                "export" => {
                    let path = if arg.is_empty() {
                        PathBuf::from(export::default_file_name(&query.phrase, "results"))
                    } else {
                        PathBuf::from(arg)
                    };
                    export::export_results(&path, &outcome.rows)?;
                    println!("  Results written to {}", path.display());
                }
                "export-sources" => {
                    let (n, file) = arg.split_once(char::is_whitespace).unwrap_or((arg, ""));
                    let n: usize = n.parse().context("expected a row number")?;
                    let Some(row) = n.checked_sub(1).and_then(|i| outcome.rows.get(i)) else {
                        anyhow::bail!("no row {n}");
                    };
                    let path = if file.trim().is_empty() {
                        PathBuf::from(export::default_file_name(&query.phrase, "sources"))
                    } else {
                        PathBuf::from(file.trim())
                    };
                    export::export_sources(&path, &outcome.sources_for(row), config.extension())?;
                    println!("  Sources written to {}", path.display());
                }
                other => anyhow::bail!("unknown command ':{other}' (try :help)"),
            }
            Ok(())
        })();
        if let Err(e) = result {
            println!("  {e}");
        }
    }

    Ok(())
}

fn cmd_info(cache: &Path) -> anyhow::Result<()> {
    let loaded = persistence::load_corpus(cache)?;
    let index = &loaded.index;

    println!("Cache: {}", cache.display());
    println!("  segments:  {}", index.len());
    println!("  documents: {}", index.document_count());
    match &index.root {
        Some(root) => println!("  root:      {}", root.display()),
        None => println!("  root:      unknown{}", if loaded.legacy { " (legacy cache)" } else { "" }),
    }
    if let Some(meta) = persistence::load_metadata(cache)? {
        println!("  version:   {}", meta.version);
        println!("  created:   {}", meta.created_at);
        println!("  config:    {:?}", meta.config);
    }
    Ok(())
}
