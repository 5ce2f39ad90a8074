//! Renders a small board through the public facade and writes a PNG.

use kiview::document::{BoardDocument, BoardItem, Graphic, GraphicKind, Via, ViaKind};
use kiview::{BoardViewer, BoxShaper, CanvasCompositor, Theme, Vec2, Viewer};
use uuid::Uuid;

fn small_board() -> BoardDocument {
    let mut board = BoardDocument::two_layer("smoke");
    board.items.push(BoardItem::Graphic(Graphic {
        uuid: Uuid::new_v4(),
        layer: "Edge.Cuts".into(),
        width: 0.1,
        kind: GraphicKind::Rect {
            start: Vec2::new(0.0, 0.0),
            end: Vec2::new(30.0, 20.0),
            fill: false,
        },
    }));
    board.items.push(BoardItem::Via(Via {
        uuid: Uuid::new_v4(),
        at: Vec2::new(15.0, 10.0),
        size: 0.8,
        drill: 0.4,
        kind: ViaKind::Through,
        layers: None,
        net: None,
    }));
    board
}

#[test]
fn renders_a_png_to_disk() {
    let mut viewer: BoardViewer =
        Viewer::new(Theme::board_default(), Box::new(BoxShaper), 640.0, 480.0);
    let mut loaded = viewer.load(small_board());
    viewer.draw_if_needed().unwrap();
    assert!(loaded.try_recv().is_ok());

    viewer.zoom_to_page();
    viewer.draw_if_needed().unwrap();

    let mut canvas = CanvasCompositor::new(640, 480).unwrap();
    viewer.composite(&mut canvas);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smoke.png");
    canvas.to_image().save(&path).unwrap();
    let meta = std::fs::metadata(&path).unwrap();
    assert!(meta.len() > 0);
}

#[test]
fn background_differs_from_painted_area() {
    let mut viewer: BoardViewer =
        Viewer::new(Theme::board_default(), Box::new(BoxShaper), 200.0, 200.0);
    let _ready = viewer.load(small_board());
    viewer.draw_if_needed().unwrap();
    viewer.zoom_to_page();
    viewer.draw_if_needed().unwrap();

    let mut canvas = CanvasCompositor::new(200, 200).unwrap();
    viewer.composite(&mut canvas);
    let img = canvas.to_image();

    // The via sits at board center, which maps near the canvas center.
    let center = img.get_pixel(100, 100);
    let corner = img.get_pixel(1, 1);
    assert_ne!(center, corner, "painted geometry should differ from background");
}
