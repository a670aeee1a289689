//! Benchmarks for relation building and path generation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand::rngs::StdRng;

use kgpath::extract::Extractor;
use kgpath::graph::{dependency_order, mark_key_nodes};
use kgpath::model::{KnowledgeGraph, KnowledgeNode};
use kgpath::paths::{PathMode, PathOptions, generate_learning_paths};
use kgpath::relations::{build_relations, build_relations_from_resources};
use kgpath::resource::{Resource, ResourceType};

fn resources(count: usize) -> Vec<Resource> {
    let types = [
        ResourceType::Document,
        ResourceType::Video,
        ResourceType::Audio,
        ResourceType::Image,
        ResourceType::Quiz,
    ];
    (0..count)
        .map(|i| Resource::new(format!("res{i}"), format!("Resource number {i}"), types[i % types.len()]))
        .collect()
}

fn nodes(count: usize) -> Vec<KnowledgeNode> {
    let mut rng = StdRng::seed_from_u64(0);
    let mut nodes = Extractor::new().extract_all(&resources(count), &mut rng);
    nodes.truncate(count);
    nodes
}

fn graph(count: usize) -> KnowledgeGraph {
    let mut rng = StdRng::seed_from_u64(0);
    let nodes = nodes(count);
    let relations = build_relations(&nodes, &mut rng);
    let kg = KnowledgeGraph::new("bench", "Bench")
        .with_nodes(nodes)
        .with_relations(relations);
    mark_key_nodes(&kg, 0.3)
}

fn bench_grade_sequencing(c: &mut Criterion) {
    let nodes = nodes(200);
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("grade_sequencing_200", |bench| {
        bench.iter(|| black_box(build_relations(&nodes, &mut rng)))
    });
}

fn bench_random_linking(c: &mut Criterion) {
    let nodes = nodes(200);
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("random_linking_200", |bench| {
        bench.iter(|| black_box(build_relations_from_resources(&nodes, &mut rng)))
    });
}

fn bench_paths(c: &mut Criterion) {
    let kg = graph(200);
    let mut rng = StdRng::seed_from_u64(2);

    for mode in [PathMode::Diversified, PathMode::Canonical, PathMode::Dependency] {
        let options = PathOptions::new(mode);
        c.bench_function(&format!("paths_{mode:?}_200").to_lowercase(), |bench| {
            bench.iter(|| black_box(generate_learning_paths(&kg, &options, &mut rng)))
        });
    }
}

fn bench_dependency_order(c: &mut Criterion) {
    let kg = graph(500);
    c.bench_function("dependency_order_500", |bench| {
        bench.iter(|| black_box(dependency_order(&kg)))
    });
}

criterion_group!(
    benches,
    bench_grade_sequencing,
    bench_random_linking,
    bench_paths,
    bench_dependency_order
);
criterion_main!(benches);
