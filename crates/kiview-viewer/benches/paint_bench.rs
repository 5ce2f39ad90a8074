use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uuid::Uuid;

use kiview_core::math::Vec2;
use kiview_core::theme::Theme;
use kiview_document::{BoardDocument, BoardItem, TrackSegment, Via, ViaKind};
use kiview_render::{BatchRenderer, BoxShaper};
use kiview_viewer::board_layers::board_layer_set;
use kiview_viewer::{BoardTable, DocumentPainter};

fn synthetic_board(tracks: usize, vias: usize) -> BoardDocument {
    let mut board = BoardDocument::two_layer("bench");
    for i in 0..tracks {
        let y = i as f64 * 0.5;
        board.items.push(BoardItem::Segment(TrackSegment {
            uuid: Uuid::new_v4(),
            start: Vec2::new(0.0, y),
            end: Vec2::new(50.0, y),
            width: 0.25,
            layer: if i % 2 == 0 { "F.Cu" } else { "B.Cu" }.to_string(),
            net: None,
        }));
    }
    for i in 0..vias {
        board.items.push(BoardItem::Via(Via {
            uuid: Uuid::new_v4(),
            at: Vec2::new(i as f64 * 2.0, 25.0),
            size: 0.8,
            drill: 0.4,
            kind: ViaKind::Through,
            layers: None,
            net: None,
        }));
    }
    board
}

fn bench_full_paint(c: &mut Criterion) {
    let theme = Theme::board_default();
    let mut group = c.benchmark_group("paint");
    for &(tracks, vias) in &[(100, 20), (1000, 200)] {
        let board = synthetic_board(tracks, vias);
        group.bench_function(format!("{tracks}_tracks_{vias}_vias"), |b| {
            b.iter(|| {
                let mut gfx = BatchRenderer::new();
                let mut layers = board_layer_set(&board, &theme);
                let painter = DocumentPainter::new(BoardTable::new(&board));
                painter
                    .paint(&mut gfx, &mut layers, &BoxShaper, black_box(&board.items))
                    .unwrap();
                black_box(layers.bbox())
            })
        });
    }
    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    use kiview_viewer::PainterTable;
    let board = synthetic_board(1000, 200);
    let table = BoardTable::new(&board);
    c.bench_function("layers_for_1200_items", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for item in &board.items {
                total += table.layers_for(black_box(item)).len();
            }
            black_box(total)
        })
    });
}

criterion_group!(benches, bench_full_paint, bench_classification);
criterion_main!(benches);
