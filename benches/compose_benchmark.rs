//! Compositor benchmark: Measure frame composition over a plane stack.
//!
//! Target: < 200µs for a full 200×50 frame with 8 overlapping planes

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stratum::{Attrs, Buffer, Color, Compositor, PlaneId, PlaneTree, Position, Renderer, RendererConfig, Size};

const SIZE: Size = Size::new(200, 50);

/// A root filled with text and a cascade of overlapping windows.
fn create_scene() -> (PlaneTree, PlaneId, Vec<PlaneId>) {
    let mut tree = PlaneTree::new();
    let root = tree.create_root(Position::ORIGIN, SIZE).expect("root");
    if let Some(plane) = tree.get_mut(root) {
        for y in 0..SIZE.height {
            plane.print(0, y, "background text with 日本語 glyphs ".repeat(8), Color::Indexed(250), Color::Default, Attrs::empty());
        }
    }

    let mut windows = Vec::new();
    for i in 0..8u8 {
        let offset = i32::from(i) * 12;
        let id = tree
            .create_child(root, Position::new(offset, i32::from(i) * 4), Size::new(60, 16))
            .expect("window");
        if let Some(plane) = tree.get_mut(id) {
            for y in 0..16 {
                plane.print(1, y, format!("window {i} line {y}"), Color::rgb(255, 32 * i, 0), Color::Indexed(i), Attrs::BOLD);
            }
        }
        windows.push(id);
    }
    (tree, root, windows)
}

fn compose_full(c: &mut Criterion) {
    let (mut tree, root, _) = create_scene();
    let mut compositor = Compositor::new(SIZE);
    let mut target = Buffer::new(SIZE.width, SIZE.height).expect("target");

    c.bench_function("compose_200x50_full", |b| {
        b.iter(|| {
            compositor.invalidate_all();
            compositor.compose(&mut tree, root, black_box(&mut target)).expect("compose")
        })
    });
}

fn compose_single_print(c: &mut Criterion) {
    let (mut tree, root, windows) = create_scene();
    let mut compositor = Compositor::new(SIZE);
    let mut target = Buffer::new(SIZE.width, SIZE.height).expect("target");
    compositor.compose(&mut tree, root, &mut target).expect("compose");
    let top = windows[windows.len() - 1];

    let mut tick = 0u32;
    c.bench_function("compose_200x50_single_print", |b| {
        b.iter(|| {
            tick = tick.wrapping_add(1);
            if let Some(plane) = tree.get_mut(top) {
                plane.print(2, 3, format!("{tick:>8}"), Color::Default, Color::Default, Attrs::empty());
            }
            compositor.compose(&mut tree, root, black_box(&mut target)).expect("compose")
        })
    });
}

fn compose_and_flush_move(c: &mut Criterion) {
    let (mut tree, root, windows) = create_scene();
    let mut compositor = Compositor::new(SIZE);
    let mut renderer = Renderer::new(SIZE, RendererConfig::default()).expect("renderer");
    let mut sink = Vec::with_capacity(1 << 16);
    let window = windows[0];

    let mut x = 0i32;
    c.bench_function("compose_flush_200x50_window_move", |b| {
        b.iter(|| {
            x = (x + 1) % 100;
            tree.move_to(window, Position::new(x, 2)).expect("move");
            compositor.compose(&mut tree, root, renderer.back_mut()).expect("compose");
            sink.clear();
            renderer.flush(&mut sink).expect("flush")
        })
    });
}

criterion_group!(benches, compose_full, compose_single_print, compose_and_flush_move);
criterion_main!(benches);
