//! Walkthrough of the full pipeline: ingest a couple of essays, ask
//! questions against them, and print the grounding text the assistant
//! would receive.
//!
//! Runs fully offline by default (bundled sample text, deterministic mock
//! embeddings). Set `ESSAY_URL` to fetch and ingest a real page instead:
//!
//! ```text
//! ESSAY_URL=https://www.paulgraham.com/greatwork.html cargo run --example essay_pipeline
//! ```

use std::env;
use std::sync::Arc;

use reqwest::Client;
use tracing_subscriber::FmtSubscriber;
use url::Url;

use essaysmith::{
    AddNoteArgs, DensestBlockExtractor, IngestionPipeline, MockEmbedder, RagConfig, RagToolset,
    Retriever, SearchArgs, SqliteRagStore, SummarizeArgs,
};

const DIMS: usize = 32;

const SAMPLE_ESSAYS: &[(&str, &str, &str)] = &[
    (
        "demo:startup-growth",
        "Growth",
        "A startup is a company designed to grow fast. Being newly founded does \
not in itself make a company a startup.\n\nThe only essential thing is \
growth. Everything else we associate with startups follows from growth.",
    ),
    (
        "demo:good-work",
        "Doing Great Work",
        "The first step is to decide what to work on. The work you choose needs \
to have three qualities: it has to be something you have a natural aptitude \
for, that you have a deep interest in, and that offers scope to do great \
work.\n\nIn practice you don't have to worry much about the third \
criterion. Ambitious people are if anything already too conservative about \
it.",
    ),
];

#[tokio::main]
async fn main() -> Result<(), essaysmith::RagError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let db_path = env::var("ESSAY_DB").unwrap_or_else(|_| "./essays.sqlite".to_string());
    let store = Arc::new(SqliteRagStore::open(&db_path, DIMS).await?);
    let embedder = Arc::new(MockEmbedder::new(DIMS));
    let config = RagConfig::builder().dims(DIMS).build()?;

    let client = Client::builder()
        .user_agent("essaysmith-demo/0.1")
        .use_rustls_tls()
        .build()?;

    let pipeline = IngestionPipeline::new(
        client,
        Box::new(DensestBlockExtractor),
        embedder.clone(),
        store.clone(),
        &config,
    )?;
    let retriever = Retriever::new(embedder, store, config)?;

    if let Ok(essay_url) = env::var("ESSAY_URL") {
        let url = Url::parse(&essay_url)
            .map_err(|err| essaysmith::RagError::InvalidDocument(err.to_string()))?;
        println!("→ Fetching {url}");
        let outcome = pipeline.ingest_url(&url, "Fetched essay").await?;
        println!("   stored {} chunks", outcome.chunk_count());
    } else {
        for (url, title, text) in SAMPLE_ESSAYS {
            let outcome = pipeline.ingest_text(url, title, text).await?;
            println!("→ Ingested '{title}' ({} chunks)", outcome.chunk_count());
        }
    }

    let tools = RagToolset::new(retriever, pipeline);

    println!("\nDocuments:\n{}", tools.list_documents().await);

    let note = tools
        .add_note(AddNoteArgs {
            content: "The reader is most interested in essays about ambition.".into(),
        })
        .await;
    println!("\nNote: {note}");

    // Mock embeddings only match on identical text, so the first question
    // repeats a stored chunk verbatim to show a hit; the second shows the
    // fallback path.
    for question in [
        "The only essential thing is growth. Everything else we associate \
with startups follows from growth.",
        "what color is the sky?",
    ] {
        println!("\nQ: {question}");
        let answer = tools
            .search(SearchArgs {
                question: question.to_string(),
                document_id: None,
            })
            .await;
        println!("A: {answer}");
    }

    let summary = tools.summarize(SummarizeArgs { document_id: None }).await;
    println!("\nSummary without a selected document: {summary}");

    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_env_filter("info").finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
