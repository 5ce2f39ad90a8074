//! End-to-end paint pipeline scenarios: classification, virtual-layer
//! fan-out, transform balance under failing painters, and determinism
//! against document order.

use proptest::prelude::*;
use uuid::Uuid;

use kiview_core::math::{Angle, Vec2};
use kiview_core::theme::Theme;
use kiview_document::{
    BoardDocument, BoardItem, Footprint, Pad, PadShape, Side, TrackSegment, Via, ViaKind,
};
use kiview_render::{BatchRenderer, BoxShaper, Renderer};
use kiview_viewer::board_layers::{
    bb_via_hole_walls_layer, bb_via_holes_layer, board_layer_set,
};
use kiview_viewer::{BoardTable, DocumentPainter};

fn segment(layer: &str, x: f64) -> BoardItem {
    BoardItem::Segment(TrackSegment {
        uuid: Uuid::new_v4(),
        start: Vec2::new(x, 0.0),
        end: Vec2::new(x + 5.0, 0.0),
        width: 0.25,
        layer: layer.to_string(),
        net: None,
    })
}

fn via(kind: ViaKind, layers: Option<(&str, &str)>) -> BoardItem {
    BoardItem::Via(Via {
        uuid: Uuid::new_v4(),
        at: Vec2::ZERO,
        size: 0.8,
        drill: 0.4,
        kind,
        layers: layers.map(|(a, b)| (a.to_string(), b.to_string())),
        net: None,
    })
}

fn six_copper_board() -> BoardDocument {
    BoardDocument::new(
        "six",
        ["F.Cu", "In1.Cu", "In2.Cu", "In3.Cu", "In4.Cu", "B.Cu"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )
}

fn paint(board: &BoardDocument) -> (BatchRenderer, kiview_viewer::LayerSet) {
    let mut gfx = BatchRenderer::new();
    let mut layers = board_layer_set(board, &Theme::board_default());
    let painter = DocumentPainter::new(BoardTable::new(board));
    painter
        .paint(&mut gfx, &mut layers, &BoxShaper, &board.items)
        .unwrap();
    (gfx, layers)
}

#[test]
fn blind_via_lands_on_every_spanned_copper() {
    let mut board = six_copper_board();
    let item = via(ViaKind::BlindBuried, Some(("In1.Cu", "In4.Cu")));
    let uuid = item.uuid();
    board.items.push(item);

    let (_, layers) = paint(&board);
    for copper in ["In1.Cu", "In2.Cu", "In3.Cu", "In4.Cu"] {
        let holes = layers.by_name(&bb_via_holes_layer(copper)).unwrap();
        let walls = layers.by_name(&bb_via_hole_walls_layer(copper)).unwrap();
        assert_eq!(holes.items, vec![uuid], "missing hole on {copper}");
        assert_eq!(walls.items, vec![uuid], "missing wall on {copper}");
        assert!(holes.batch.as_ref().is_some_and(|b| !b.is_empty()));
    }
    assert!(layers
        .by_name(&bb_via_holes_layer("F.Cu"))
        .unwrap()
        .items
        .is_empty());
}

#[test]
fn deeper_layers_get_larger_depth() {
    let mut board = BoardDocument::two_layer("depths");
    board.items.push(segment("F.Cu", 0.0));
    board.items.push(segment("B.Cu", 0.0));
    let (_, layers) = paint(&board);

    let front = layers.by_name("F.Cu").unwrap().batch.as_ref().unwrap().depth;
    let back = layers.by_name("B.Cu").unwrap().batch.as_ref().unwrap().depth;
    assert!(back > front, "B.Cu paints earlier so it sits deeper");
    assert!(front > 0.0 && back < 1.0);
}

#[test]
fn failing_child_painter_leaves_transform_balanced() {
    let mut board = BoardDocument::two_layer("broken-pad");
    board.items.push(BoardItem::Footprint(Footprint {
        uuid: Uuid::new_v4(),
        reference: "U1".into(),
        at: Vec2::new(10.0, 10.0),
        rotation: Angle::from_degrees(90.0),
        side: Side::Front,
        children: vec![
            BoardItem::Pad(Pad {
                uuid: Uuid::new_v4(),
                number: "1".into(),
                at: Vec2::ZERO,
                size: Vec2::new(1.0, 1.0),
                rotation: Angle::ZERO,
                shape: PadShape::Unknown("weird".into()),
                drill: None,
                layers: vec!["F.Cu".into()],
                net: None,
            }),
            segment("F.Cu", 0.0),
        ],
    }));

    let (mut gfx, layers) = paint(&board);
    assert_eq!(gfx.state().depth(), 1, "transform stack back at base");
    // The sibling segment still painted despite the pad failure.
    let cu = layers.by_name("F.Cu").unwrap();
    assert!(cu.batch.as_ref().is_some_and(|b| !b.is_empty()));
}

#[test]
fn footprint_children_paint_in_local_frame() {
    let mut board = BoardDocument::two_layer("frame");
    board.items.push(BoardItem::Footprint(Footprint {
        uuid: Uuid::new_v4(),
        reference: "R1".into(),
        at: Vec2::new(100.0, 0.0),
        rotation: Angle::ZERO,
        side: Side::Front,
        children: vec![segment("F.Cu", 0.0)],
    }));

    let (_, layers) = paint(&board);
    let bbox = layers.by_name("F.Cu").unwrap().bbox();
    assert!(bbox.valid());
    assert!(bbox.x > 90.0, "geometry translated into the footprint frame");
}

fn arb_item() -> impl Strategy<Value = BoardItem> {
    prop_oneof![
        (-50.0..50.0f64).prop_map(|x| segment("F.Cu", x)),
        (-50.0..50.0f64).prop_map(|x| segment("B.Cu", x)),
        Just(()).prop_map(|_| via(ViaKind::Through, None)),
        Just(()).prop_map(|_| via(ViaKind::Micro, Some(("F.Cu", "In1.Cu")))),
    ]
}

fn membership(layers: &kiview_viewer::LayerSet) -> Vec<(String, Vec<Uuid>)> {
    layers
        .in_display_order()
        .map(|layer| {
            let mut items = layer.items.clone();
            items.sort();
            (layer.name.clone(), items)
        })
        .collect()
}

proptest! {
    #[test]
    fn layer_membership_independent_of_document_order(
        items in prop::collection::vec(arb_item(), 0..24)
    ) {
        let mut board = six_copper_board();
        board.items = items;
        let (_, forward) = paint(&board);

        board.items.reverse();
        let (_, reversed) = paint(&board);

        prop_assert_eq!(membership(&forward), membership(&reversed));
    }

    #[test]
    fn repeated_paints_are_identical(items in prop::collection::vec(arb_item(), 0..16)) {
        let mut board = six_copper_board();
        board.items = items;
        let (_, first) = paint(&board);
        let (_, second) = paint(&board);
        prop_assert_eq!(membership(&first), membership(&second));
    }

    #[test]
    fn layers_for_is_idempotent(items in prop::collection::vec(arb_item(), 0..16)) {
        let board = six_copper_board();
        let table = BoardTable::new(&board);
        use kiview_viewer::PainterTable;
        for item in &items {
            prop_assert_eq!(table.layers_for(item), table.layers_for(item));
            prop_assert!(!table.layers_for(item).is_empty());
        }
    }
}
