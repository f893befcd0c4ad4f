use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ragline::domain::models::{ChunkMetadata, StoreConfig};
use ragline::infrastructure::vector::{cosine_similarity, Chunker, HashEmbedder, TfIdfVectorizer};
use ragline::{DocumentInput, EmbeddingProvider, InMemoryDocumentStore, RagConfig, RagPipeline};

fn corpus(documents: usize) -> Vec<DocumentInput> {
    (0..documents)
        .map(|i| {
            let content = format!(
                "Document {i} describes vector search over chunked text. \
                 Each chunk is embedded and ranked by cosine similarity. \
                 Lexical search is the fallback when embeddings are unavailable. "
            )
            .repeat(20);
            DocumentInput::new(format!("Doc {i}"), content).with_source(format!("source-{}", i % 5))
        })
        .collect()
}

fn bench_chunking(c: &mut Criterion) {
    let text = corpus(1).remove(0).content;
    let metadata = ChunkMetadata::for_document("Bench", "bench", text.len());

    let mut group = c.benchmark_group("chunking");
    for (size, overlap) in [(200, 20), (1000, 100)] {
        let chunker = Chunker::new(&RagConfig::with_chunking(size, overlap).unwrap());
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| chunker.chunk(black_box(text), &metadata))
        });
    }
    group.finish();
}

fn bench_embedding(c: &mut Criterion) {
    let texts: Vec<String> = corpus(50).into_iter().map(|d| d.content).collect();

    c.bench_function("hash_embed_384", |b| {
        let embedder = HashEmbedder::new(384);
        b.iter(|| embedder.embed(black_box(&texts[0])))
    });

    c.bench_function("tfidf_fit_50_docs", |b| {
        b.iter(|| TfIdfVectorizer::fit(black_box(&texts), 512))
    });

    let a = HashEmbedder::new(1536).embed("first");
    let other = HashEmbedder::new(1536).embed("second");
    c.bench_function("cosine_1536", |b| {
        b.iter(|| cosine_similarity(black_box(&a), black_box(&other)))
    });
}

fn bench_search(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let pipeline = runtime.block_on(async {
        let pipeline = RagPipeline::new(
            RagConfig::default(),
            StoreConfig::default(),
            Arc::new(EmbeddingProvider::statistical(512, 384)),
            Arc::new(InMemoryDocumentStore::new()),
            None,
        );
        pipeline.ingest_batch(corpus(100)).await;
        pipeline
    });

    c.bench_function("search_100_docs", |b| {
        b.to_async(&runtime)
            .iter(|| pipeline.search(black_box("how does vector search rank chunks"), Some(5)))
    });

    c.bench_function("ask_100_docs_extractive", |b| {
        b.to_async(&runtime)
            .iter(|| pipeline.ask(black_box("what is the fallback for embeddings")))
    });
}

criterion_group!(benches, bench_chunking, bench_embedding, bench_search);
criterion_main!(benches);
