//! Naming and Instance Builder Benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;

use fit_nacos_registry::instances::build_instances;
use fit_nacos_registry::naming::{group_name, service_name, subscription_key};
use fit_nacos_registry::{
    Address, Application, Endpoint, Fitable, FitableMeta, Protocol, RegistryConfig, Worker,
};

fn bench_naming(c: &mut Criterion) {
    let fitable = Fitable::new(
        "modelengine.fit.demo.genericable",
        "1.0.0",
        "demo-implementation",
        "1.0.0",
    );

    c.bench_function("service_name", |b| {
        b.iter(|| service_name(black_box(&fitable)))
    });

    c.bench_function("subscription_key", |b| {
        b.iter(|| {
            subscription_key(
                black_box(&group_name(&fitable)),
                black_box(&service_name(&fitable)),
            )
        })
    });
}

fn bench_instance_builder(c: &mut Criterion) {
    let worker = Worker::new(
        (0..4)
            .map(|i| {
                Address::new(
                    format!("10.0.0.{i}"),
                    vec![
                        Endpoint::new(8080, Protocol::Http),
                        Endpoint::new(9090, Protocol::Grpc),
                    ],
                )
            })
            .collect(),
        "bench-worker",
        "prod",
        BTreeMap::new(),
    );
    let application = Application::new("bench-app", "1.0");
    let meta = FitableMeta::new(
        Fitable::new("g1", "1.0", "f1", "1.0"),
        vec!["alias".to_string()],
        vec![0, 1],
    );
    let config = RegistryConfig::default();

    c.bench_function("build_instances_4x2", |b| {
        b.iter(|| {
            build_instances(
                black_box(&worker),
                black_box(&application),
                black_box(&meta),
                black_box(&config),
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_naming, bench_instance_builder);
criterion_main!(benches);
