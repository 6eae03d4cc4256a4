use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use slowpitch_baserunning::{
    AtBatTransition, BaserunnerAdvancementService, BaserunnerState, BattingResult,
    GameRuleEngine, ManualOverrides, RunnerDestination,
};
use slowpitch_core::PlayerId;

fn player(id: &str) -> PlayerId {
    PlayerId::new(id).expect("static id")
}

fn loaded_bases() -> BaserunnerState {
    BaserunnerState::new(Some(player("R1")), Some(player("R2")), Some(player("R3")))
        .expect("distinct runners")
}

fn bench_standard_advancement(c: &mut Criterion) {
    let service = BaserunnerAdvancementService::new();
    let before = loaded_bases();
    let batter = player("B1");

    let mut group = c.benchmark_group("standard_advancement");
    for result in BattingResult::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(result.code()), &result, |b, r| {
            b.iter(|| service.calculate_standard_advancement(black_box(&before), *r, &batter))
        });
    }
    group.finish();
}

fn bench_override_and_validate(c: &mut Criterion) {
    let service = BaserunnerAdvancementService::new();
    let engine = GameRuleEngine::default();
    let before = loaded_bases();
    let batter = player("B1");

    let mut overrides = ManualOverrides::new();
    overrides.insert(player("R2"), RunnerDestination::Home);
    overrides.insert(player("R1"), RunnerDestination::Third);

    c.bench_function("override_then_validate", |b| {
        b.iter(|| {
            let outcome = service
                .apply_manual_overrides(black_box(&before), BattingResult::Single, &batter, &overrides)
                .expect("legal overrides");
            let transition = AtBatTransition::from_outcome(
                &before,
                BattingResult::Single,
                &batter,
                &outcome,
                outcome.outs_recorded(),
                0,
            );
            engine.validate_at_bat(&transition)
        })
    });
}

criterion_group!(benches, bench_standard_advancement, bench_override_and_validate);
criterion_main!(benches);
