// Benchmarks for the two in-memory filters over gateway-sized inputs.

use carpool_scout::{classify_groups, filter_group_messages, CarpoolKeywords, Group, Message};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::json;

const SUBJECTS: &[&str] = &[
    "Carona Zona Sul",
    "Rota Solidária Centro",
    "Futebol de Quinta",
    "Vagas UFRJ ⇄ Barra",
    "Carona LDO",
    "Família",
];

fn groups(n: usize) -> Vec<Group> {
    (0..n)
        .map(|i| {
            serde_json::from_value(json!({
                "id": format!("{}@g.us", i),
                "subject": SUBJECTS[i % SUBJECTS.len()],
            }))
            .unwrap()
        })
        .collect()
}

/// One in three messages carries a distribution payload for the target group.
fn messages(n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| {
            let content = match i % 3 {
                0 => json!({"senderKeyDistributionMessage": {"groupId": "120363@g.us"}}),
                1 => json!({"senderKeyDistributionMessage": {"groupId": "999@g.us"}}),
                _ => json!({"extendedTextMessage": {"text": "alguém indo?"}}),
            };
            serde_json::from_value(json!({
                "key": {"remoteJid": "120363@g.us", "id": format!("m{}", i)},
                "message": content,
                "messageTimestamp": 1700000000 + i as i64,
            }))
            .unwrap()
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let keywords = CarpoolKeywords::default();
    let input = groups(1_000);
    c.bench_function("classify_groups_1k", |b| {
        b.iter_batched(
            || input.clone(),
            |groups| black_box(classify_groups(groups, &keywords)),
            BatchSize::SmallInput,
        )
    });
}

fn bench_filter(c: &mut Criterion) {
    let input = messages(10_000);
    c.bench_function("filter_group_messages_10k", |b| {
        b.iter_batched(
            || input.clone(),
            |messages| black_box(filter_group_messages(messages, "120363@g.us")),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_classify, bench_filter);
criterion_main!(benches);
