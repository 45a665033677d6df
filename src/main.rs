use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use docsift::{
    Chunk, DecodedDocument, Domain, EmbeddingModel, HybridIndex, Outline,
    RetrievalConfig, SearchRequest, StructureConfig,
    chunking::segment_chunks,
    cli::{Cli, Command, ChunksArgs, HeadingsArgs, OutlineArgs, SearchArgs},
    embedder::Embedder,
    error::{Error, Result},
    outline::{extract_headings, extract_outline},
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCSIFT_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Outline(args) => cmd_outline(&args),
        Command::Headings(args) => cmd_headings(&args),
        Command::Chunks(args) => cmd_chunks(&args),
        Command::Search(args) => cmd_search(&args),
        Command::Completions(args) => {
            args.generate();
            Ok(())
        }
    }
}

fn document_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_outline(args: &OutlineArgs) -> Result<()> {
    let config = StructureConfig::default();
    let mut outlines: Vec<Outline> = Vec::new();

    for path in &args.documents {
        // Unreadable dumps still produce a schema-shaped outline.
        let outline = match DecodedDocument::from_json_file(path) {
            Ok(doc) => extract_outline(&doc, &config),
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot decode document");
                Outline::degraded(&document_name(path))
            }
        };
        outlines.push(outline);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outlines)?);
    } else {
        for (path, outline) in args.documents.iter().zip(&outlines) {
            println!("{}", path.display());
            println!("  title: {}", outline.title);
            for entry in &outline.outline {
                println!(
                    "  {} p{:<4} {}",
                    entry.level, entry.page, entry.text
                );
            }
        }
    }
    Ok(())
}

fn cmd_headings(args: &HeadingsArgs) -> Result<()> {
    let doc = DecodedDocument::from_json_file(&args.document)?;
    let headings = extract_headings(&doc, &StructureConfig::default());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&headings)?);
    } else {
        for heading in &headings {
            println!("{heading}");
        }
    }
    Ok(())
}

fn cmd_chunks(args: &ChunksArgs) -> Result<()> {
    let chunks = collect_chunks(&args.documents)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
    } else {
        for chunk in &chunks {
            println!(
                "{} p{} :: {} ({} chars)",
                chunk.pdf_name,
                chunk.page_number,
                chunk.heading,
                chunk.content.len()
            );
        }
    }
    Ok(())
}

fn cmd_search(args: &SearchArgs) -> Result<()> {
    let chunks = collect_chunks(&args.documents)?;

    let domain = match &args.domain {
        Some(name) => name.parse::<Domain>().map_err(Error::Config)?,
        None => Domain::detect(&args.persona, &args.task),
    };

    // One lazily-loaded model serves both index build and query encoding.
    let mut model = (!args.lexical_only).then(EmbeddingModel::new);

    let index = HybridIndex::build(
        chunks,
        domain,
        model.as_mut().map(|m| m as &mut dyn Embedder),
        &RetrievalConfig::default(),
    )?;

    let request = SearchRequest {
        persona: args.persona.clone(),
        task: args.task.clone(),
        k: args.count,
    };
    let results = index
        .search(&request, model.as_mut().map(|m| m as &mut dyn Embedder))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No results found.");
    } else {
        println!("domain: {domain}");
        for r in &results {
            println!(
                "{:>3}. [{:.3}] {} p{} :: {}",
                r.rank, r.hybrid_score, r.document, r.page_number,
                r.section_title
            );
        }
        println!("\n{} result(s)", results.len());
    }
    Ok(())
}

fn collect_chunks(paths: &[std::path::PathBuf]) -> Result<Vec<Chunk>> {
    let config = StructureConfig::default();
    let mut chunks = Vec::new();

    for path in paths {
        let doc = match DecodedDocument::from_json_file(path) {
            Ok(doc) => doc,
            Err(e) => {
                error!(path = %path.display(), error = %e, "skipping document");
                continue;
            }
        };
        let headings = extract_headings(&doc, &config);
        chunks.extend(segment_chunks(&doc, &headings));
    }

    Ok(chunks)
}
