//! On-panel message box and the fatal-fault sink.

use embassy_time::Timer;
use esp_hal::delay::Delay;
use log::info;
use minutely_core::{fault::BootFault, render::Screen};
use minutely_hal_esp32s3::{panel::RenderMode, render::ClockRenderer};

use super::{BoardPanel, BoardPanelError, FAST_FLUSH_TIMEOUT_US, INIT_TIMEOUT_US};

const HEARTBEAT_SECS: u64 = 10;

/// Paints a bordered message box in fast mode, replacing whatever handle
/// was live before.
pub(super) fn message_box(
    panel: &mut BoardPanel,
    renderer: &ClockRenderer,
    delay: &mut Delay,
    title: &str,
    lines: &[&str],
) -> Result<(), BoardPanelError> {
    let mut handle = panel.acquire(RenderMode::FastPartial, delay, INIT_TIMEOUT_US)?;
    handle.clear();
    let (bw, red) = handle.planes_mut();
    renderer.render(Screen::Notice { title, lines }, bw, red);
    handle.flush(delay, FAST_FLUSH_TIMEOUT_US)
}

/// Terminal fault sink: shows the fault on the panel, then stalls forever
/// with a heartbeat log. Operator intervention is the only way out.
pub(super) async fn halt(
    panel: &mut BoardPanel,
    renderer: &ClockRenderer,
    delay: &mut Delay,
    fault: BootFault,
) -> ! {
    let lines = fault.lines();
    if let Err(err) = message_box(panel, renderer, delay, fault.title(), &lines) {
        info!("fault: panel message failed: {:?}", err);
    }

    loop {
        info!("halted on {:?}; see panel message", fault);
        Timer::after_secs(HEARTBEAT_SECS).await;
    }
}
