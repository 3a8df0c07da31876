#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use livepen_layout::{
    CursorStyle, LayoutConfig, LayoutController, Orientation, PaneMode, PointerPosition, Rect,
};
use livepen_web::{HeadlessLayout, Viewport};

#[derive(Debug, Arbitrary)]
enum Op {
    Resize { width: u16, height: u16, divider: u8 },
    DragStart,
    DragMove { x: i16, y: i16 },
    DragEnd,
    Cancel,
    Toggle,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut controller = LayoutController::new(LayoutConfig::default());
    let mut surface = HeadlessLayout::default();

    for op in ops.into_iter().take(256) {
        match op {
            Op::Resize { width, height, divider } => {
                let viewport = Viewport {
                    width: u32::from(width),
                    container: Rect::new(0, 0, u32::from(width), u32::from(height)),
                    divider: u32::from(divider),
                };
                surface.measure(&viewport);
                controller.viewport_resized(viewport.width, &mut surface);
            }
            Op::DragStart => {
                controller.drag_start(&mut surface);
            }
            Op::DragMove { x, y } => {
                let position = PointerPosition::new(i32::from(x), i32::from(y));
                controller.drag_move(position, &mut surface);
            }
            Op::DragEnd => {
                controller.drag_end(&mut surface);
            }
            Op::Cancel => {
                controller.cancel_drag(&mut surface);
            }
            Op::Toggle => {
                controller.toggle_preview(&mut surface);
            }
        }

        let state = controller.state();
        if let Some(geometry) = controller.geometry() {
            assert_eq!(geometry.total(), u64::from(geometry.container));
        }
        if state.orientation == Orientation::SideBySide {
            assert_eq!(state.pane_mode, PaneMode::Split);
        }
        if !controller.is_dragging() {
            assert_eq!(surface.cursor(), CursorStyle::Default);
        }
    }
});
