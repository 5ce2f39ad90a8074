//! Demo binary: renders a synthetic two-layer board to a PNG.

use kiview::document::{
    BoardDocument, BoardItem, Footprint, Graphic, GraphicKind, Pad, PadShape, Side, TrackSegment,
    Via, ViaKind,
};
use kiview::{init_logging, Angle, BoardViewer, BoxShaper, CanvasCompositor, Theme, Vec2, Viewer};
use uuid::Uuid;

fn demo_board() -> BoardDocument {
    let mut board = BoardDocument::two_layer("demo");

    // Board outline.
    board.items.push(BoardItem::Graphic(Graphic {
        uuid: Uuid::new_v4(),
        layer: "Edge.Cuts".into(),
        width: 0.1,
        kind: GraphicKind::Rect {
            start: Vec2::new(0.0, 0.0),
            end: Vec2::new(60.0, 40.0),
            fill: false,
        },
    }));

    // A few tracks joined by vias.
    for (i, y) in [10.0, 15.0, 20.0].iter().enumerate() {
        let layer = if i % 2 == 0 { "F.Cu" } else { "B.Cu" };
        board.items.push(BoardItem::Segment(TrackSegment {
            uuid: Uuid::new_v4(),
            start: Vec2::new(5.0, *y),
            end: Vec2::new(55.0, *y),
            width: 0.5,
            layer: layer.into(),
            net: Some("SIG".into()),
        }));
        board.items.push(BoardItem::Via(Via {
            uuid: Uuid::new_v4(),
            at: Vec2::new(55.0, *y),
            size: 1.0,
            drill: 0.5,
            kind: ViaKind::Through,
            layers: None,
            net: Some("SIG".into()),
        }));
    }

    // A footprint with a rotated pad.
    board.items.push(BoardItem::Footprint(Footprint {
        uuid: Uuid::new_v4(),
        reference: "R1".into(),
        at: Vec2::new(20.0, 30.0),
        rotation: Angle::from_degrees(45.0),
        side: Side::Front,
        children: vec![BoardItem::Pad(Pad {
            uuid: Uuid::new_v4(),
            number: "1".into(),
            at: Vec2::ZERO,
            size: Vec2::new(3.0, 2.0),
            rotation: Angle::ZERO,
            shape: PadShape::RoundRect { ratio: 0.25 },
            drill: Some(1.0),
            layers: vec!["*.Cu".into(), "F.Mask".into()],
            net: None,
        })],
    }));

    board
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let out = std::env::args().nth(1).unwrap_or_else(|| "kiview.png".to_string());

    let mut viewer: BoardViewer =
        Viewer::new(Theme::board_default(), Box::new(BoxShaper), 1280.0, 960.0);
    let _ready = viewer.load(demo_board());
    viewer.draw_if_needed()?;
    viewer.zoom_to_page();
    viewer.draw_if_needed()?;

    let mut canvas = CanvasCompositor::new(1280, 960)?;
    viewer.composite(&mut canvas);
    canvas.to_image().save(&out)?;
    tracing::info!(path = out.as_str(), "wrote render");
    Ok(())
}
