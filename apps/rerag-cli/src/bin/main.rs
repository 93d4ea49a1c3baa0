use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use rerag_core::config::{expand_path, Config};
use rerag_core::ingest::{load_records, RecordChunker};
use rerag_embed::default_embedder;
use rerag_hybrid::{classify, RetrievalEngine};

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ingest|query|classify> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn data_path(config: &Config, args: &[String]) -> PathBuf {
    let raw = args.first().cloned().unwrap_or_else(|| {
        config.get("data.jsonl_path").unwrap_or_else(|_| "data/projects.jsonl".to_string())
    });
    expand_path(raw)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ingest" => {
            let path = data_path(&config, &args);
            println!("Ingesting from {}", path.display());
            let records = load_records(&path)?;
            let chunks = RecordChunker::new().chunk_records(&records);

            let mut per_category: BTreeMap<&str, usize> = BTreeMap::new();
            for chunk in &chunks {
                *per_category.entry(chunk.category.as_str()).or_insert(0) += 1;
            }
            for (category, count) in &per_category {
                println!("  {:<14} {}", category, count);
            }
            println!("✅ {} projects -> {} chunks", records.len(), chunks.len());
        }
        "query" => {
            let path = data_path(&config, &args);
            let question = args.get(1).cloned().unwrap_or_else(|| {
                eprintln!("Usage: rerag query <jsonl-path> \"<question>\"");
                std::process::exit(1)
            });

            let records = load_records(&path)?;
            let chunks = RecordChunker::new().chunk_records(&records);
            let engine = RetrievalEngine::new(default_embedder()?, config.retrieval()?)?;
            engine.build_corpus(chunks)?;

            let result = engine.route(&question)?;
            println!(
                "Strategy: {} (dense {:.2} / sparse {:.2})",
                result.strategy, result.dense_weight, result.sparse_weight
            );
            println!("Reasoning: {}", result.reasoning);
            if result.is_empty() {
                println!("No matching documents.");
                return Ok(());
            }
            let badges: Vec<&str> =
                result.categories().iter().map(|c| c.as_str()).collect();
            println!("Categories: {}", badges.join(", "));
            for (rank, scored) in result.results.iter().enumerate() {
                let tags: Vec<String> =
                    scored.retrieval_types.iter().map(|t| t.to_string()).collect();
                println!(
                    "\n#{} [{}] score {:.3} ({}) {}",
                    rank + 1,
                    scored.chunk.category,
                    scored.score,
                    tags.join("+"),
                    scored.chunk.id
                );
                println!("{}", scored.chunk.text);
            }
        }
        "classify" => {
            let question = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: rerag classify \"<question>\"");
                std::process::exit(1)
            });
            let profile = classify(&question);
            println!("Intent:     {}", profile.intent);
            println!("Confidence: {:.2}", profile.confidence);
            if profile.entities.is_empty() {
                println!("Entities:   (none)");
            } else {
                for (key, value) in &profile.entities {
                    println!("Entity:     {} = {}", key, value);
                }
            }
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
