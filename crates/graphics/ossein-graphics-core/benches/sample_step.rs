use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ossein_graphics_core::AnimationPlayer;
use ossein_test_fixtures::{nod_clip, slide_clip, three_bone_chain};

fn bench_player_update(c: &mut Criterion) {
    let skeleton = three_bone_chain();
    let mut player =
        AnimationPlayer::new(Arc::new(slide_clip(None)), Some(&skeleton)).expect("player binds");
    player.add_layer("nod", Arc::new(nod_clip(None)));

    let mut frame = 0.0f32;
    c.bench_function("player_update", |b| {
        b.iter(|| {
            frame = (frame + 0.25) % 10.0;
            black_box(player.update(black_box(frame)));
        })
    });
}

criterion_group!(benches, bench_player_update);
criterion_main!(benches);
