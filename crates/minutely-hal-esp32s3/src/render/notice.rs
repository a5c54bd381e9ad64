use super::*;

const BOX_MARGIN: usize = 10;
const TEXT_SCALE: usize = 2;
const TITLE_Y: usize = 22;
const LINES_Y: usize = 50;
const LINE_PITCH: usize = 20;

/// Bordered message box: centered title, left-aligned message lines.
/// Used for bootstrap progress and as the fatal-fault screen.
pub(super) fn draw_notice(bw: &mut Frame, title: &str, lines: &[&str]) {
    let width = bw.width();
    let height = bw.height();
    let box_w = width - 2 * BOX_MARGIN;
    let box_h = height - 2 * BOX_MARGIN;

    draw_filled_rect(bw, BOX_MARGIN, BOX_MARGIN, box_w, box_h, false);
    draw_rect(bw, BOX_MARGIN, BOX_MARGIN, box_w, box_h, true);

    let title_w = text_width(title, TEXT_SCALE);
    let title_x = width.saturating_sub(title_w) / 2;
    draw_text(bw, title_x, TITLE_Y, title, TEXT_SCALE, true);

    for (i, line) in lines.iter().enumerate() {
        let y = LINES_Y + i * LINE_PITCH;
        // Stop before the border; later lines would draw through it.
        if y + 7 * TEXT_SCALE > BOX_MARGIN + box_h - 2 {
            break;
        }
        draw_text(bw, BOX_MARGIN + 14, y, line, TEXT_SCALE, true);
    }
}
