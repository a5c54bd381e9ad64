use super::*;

pub(super) fn draw_rect(frame: &mut Frame, x: usize, y: usize, w: usize, h: usize, on: bool) {
    if w == 0 || h == 0 {
        return;
    }

    for px in x..(x + w) {
        set_pixel(frame, px, y, on);
        set_pixel(frame, px, y + h - 1, on);
    }
    for py in y..(y + h) {
        set_pixel(frame, x, py, on);
        set_pixel(frame, x + w - 1, py, on);
    }
}

pub(super) fn draw_filled_rect(
    frame: &mut Frame,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    on: bool,
) {
    for py in y..(y + h) {
        for px in x..(x + w) {
            set_pixel(frame, px, py, on);
        }
    }
}

pub(super) fn set_pixel(frame: &mut Frame, x: usize, y: usize, on: bool) {
    let _ = frame.set_pixel(x, y, on);
}
