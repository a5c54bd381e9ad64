use super::*;

const DATE_X: usize = 8;
const DATE_Y: usize = 8;
const DATE_SCALE: usize = 2;
const RULE_Y: usize = 30;
const RULE_W: usize = 280;

// 5x7 glyphs at scale 8: 40x56 per digit, 48 advance.
const DIGIT_Y: usize = 56;
const DIGIT_SCALE: usize = 8;
const HOUR_X: usize = 10;
const COLON_X: usize = 102;
const MINUTE_X: usize = 134;

// Seconds pair, bottom-aligned with the big digits. The partial redraw
// repaints exactly this region, so it shares the face constants.
const SECOND_X: usize = 240;
const SECOND_Y: usize = 84;
const SECOND_SCALE: usize = 4;

/// Full-color clock face: date header, rule, and the hour:minute digits.
///
/// Inks into the red plane when one is present; a missing red plane means
/// the face falls back to black.
pub(super) fn draw_face(
    bw: &mut Frame,
    red: Option<&mut Frame>,
    date: &str,
    hour: &str,
    minute: &str,
) {
    let plane = match red {
        Some(plane) => plane,
        None => bw,
    };

    draw_text(plane, DATE_X, DATE_Y, date, DATE_SCALE, true);
    draw_filled_rect(plane, DATE_X, RULE_Y, RULE_W, 2, true);
    draw_text(plane, HOUR_X, DIGIT_Y, hour, DIGIT_SCALE, true);
    draw_text(plane, COLON_X, DIGIT_Y, ":", DIGIT_SCALE, true);
    draw_text(plane, MINUTE_X, DIGIT_Y, minute, DIGIT_SCALE, true);
}

/// Fast-mode seconds patch, black ink only.
pub(super) fn draw_seconds(bw: &mut Frame, second: &str) {
    draw_text(bw, SECOND_X, SECOND_Y, second, SECOND_SCALE, true);
}
