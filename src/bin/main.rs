#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use core::convert::Infallible;

use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::{
    Blocking,
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig},
    spi::master::Spi,
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig};
use log::{LevelFilter, info};

use depg0290::{Depg0290, Rotation};
use minutely_core::{
    clock::{ClockSample, two_digits},
    fault::BootFault,
    refresh::{ClockScheduler, Refresh},
    render::Screen,
};
use minutely_hal_esp32s3::{
    panel::{PanelPort, RenderMode},
    render::ClockRenderer,
    storage,
};
use static_cell::StaticCell;

use wall_clock::WallClock;

#[path = "main/fault.rs"]
mod fault;
#[path = "main/net.rs"]
mod net;
#[path = "main/time_sync.rs"]
mod time_sync;
#[path = "main/wall_clock.rs"]
mod wall_clock;

const DISPLAY_SPI_HZ: u32 = 20_000_000;
const SD_SPI_HZ: u32 = 400_000;
const TITLE: &str = "MINUTELY";
const SETTINGS_FILE: &str = "SETTINGS.TXT";

const WIFI_MAX_RETRIES: u32 = 3;
const SNTP_MAX_ATTEMPTS: u32 = 10;
const SNTP_POLL_INTERVAL_MS: u64 = 2_000;
const TICK_INTERVAL_MS: u64 = 250;

// Sydney standard time. DST shifts require reflashing; the clock carries
// no timezone rule table.
const UTC_OFFSET_MINUTES: i32 = 10 * 60;

// Busy-wait bounds handed to the panel. The tri-color waveform takes
// north of ten seconds on a cold panel.
const INIT_TIMEOUT_US: u32 = 5_000_000;
const FULL_FLUSH_TIMEOUT_US: u32 = 30_000_000;
const FAST_FLUSH_TIMEOUT_US: u32 = 5_000_000;

type BoardPanel = PanelPort<
    Spi<'static, Blocking>,
    Output<'static>,
    Output<'static>,
    Output<'static>,
    Input<'static>,
>;
type BoardPanelError =
    depg0290::Error<esp_hal::spi::Error, Infallible, Infallible, Infallible, Infallible>;

static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

fn render_face(
    panel: &mut BoardPanel,
    renderer: &ClockRenderer,
    delay: &mut Delay,
    sample: &ClockSample,
) -> Result<(), BoardPanelError> {
    let date = sample.date_line();
    let hour = two_digits(sample.hour);
    let minute = two_digits(sample.minute);

    let mut handle = panel.acquire(RenderMode::FullColor, delay, INIT_TIMEOUT_US)?;
    handle.clear();
    let (bw, red) = handle.planes_mut();
    renderer.render(
        Screen::Face {
            date: date.as_str(),
            hour: hour.as_str(),
            minute: minute.as_str(),
        },
        bw,
        red,
    );
    handle.flush(delay, FULL_FLUSH_TIMEOUT_US)
}

fn render_seconds(
    panel: &mut BoardPanel,
    renderer: &ClockRenderer,
    delay: &mut Delay,
    sample: &ClockSample,
) -> Result<(), BoardPanelError> {
    let second = two_digits(sample.second);

    let mut handle = panel.acquire(RenderMode::FastPartial, delay, INIT_TIMEOUT_US)?;
    handle.clear();
    let (bw, red) = handle.planes_mut();
    renderer.render(Screen::Seconds { second: second.as_str() }, bw, red);
    handle.flush(delay, FAST_FLUSH_TIMEOUT_US)
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: minutely starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Panel wiring used by this board:
    // SCK=GPIO13, MOSI=GPIO14, CS=GPIO15, DC=GPIO16, RST=GPIO17, BUSY=GPIO18
    let dc = Output::new(peripherals.GPIO16, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO17, Level::High, OutputConfig::default());
    let panel_cs = Output::new(peripherals.GPIO15, Level::High, OutputConfig::default());
    let busy = Input::new(peripherals.GPIO18, InputConfig::default());

    let spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
        .with_mode(esp_hal::spi::Mode::_0);
    let spi = Spi::new(peripherals.SPI2, spi_config)
        .unwrap()
        .with_sck(peripherals.GPIO13)
        .with_mosi(peripherals.GPIO14);

    let mut delay = Delay::new();
    let epd = Depg0290::new(spi, dc, rst, panel_cs, busy, depg0290::Config::default());
    let mut panel = PanelPort::new(epd, Rotation::Rotate90);
    let renderer = ClockRenderer::new();

    info!("Panel pins: SCK=GPIO13 MOSI=GPIO14 CS=GPIO15 DC=GPIO16 RST=GPIO17 BUSY=GPIO18");
    info!("SD pins: CS=GPIO8 SCK=GPIO4 MOSI=GPIO40 MISO=GPIO41");

    // Wipe whatever the panel showed before power-off, then put up the
    // boot notice.
    let boot_clear = panel
        .acquire(RenderMode::FullColor, &mut delay, INIT_TIMEOUT_US)
        .and_then(|mut handle| {
            handle.clear();
            handle.flush(&mut delay, FULL_FLUSH_TIMEOUT_US)
        });
    if let Err(err) = boot_clear {
        info!("display: boot clear failed: {:?}", err);
        fault::halt(&mut panel, &renderer, &mut delay, BootFault::Display).await;
    }
    esp_println::println!("display: boot clear ok");

    if let Err(err) = fault::message_box(
        &mut panel,
        &renderer,
        &mut delay,
        TITLE,
        &["Booting", "Reading SD settings"],
    ) {
        info!("display: boot notice failed: {:?}", err);
        fault::halt(&mut panel, &renderer, &mut delay, BootFault::Display).await;
    }

    // SD SPI wiring: CS=GPIO8, SCK=GPIO4, MOSI=GPIO40, MISO=GPIO41
    let mut sd_cs = Output::new(peripherals.GPIO8, Level::High, OutputConfig::default());
    let sd_spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(SD_SPI_HZ))
        .with_mode(esp_hal::spi::Mode::_0);
    let mut sd_spi = Spi::new(peripherals.SPI3, sd_spi_config)
        .unwrap()
        .with_sck(peripherals.GPIO4)
        .with_mosi(peripherals.GPIO40)
        .with_miso(peripherals.GPIO41);
    let mut sd_delay = Delay::new();

    let credentials =
        match storage::read_credentials(&mut sd_spi, &mut sd_cs, &mut sd_delay, SETTINGS_FILE) {
            Ok(credentials) => credentials,
            Err(err) => {
                info!("sd: credential read failed: {:?}", err);
                fault::halt(&mut panel, &renderer, &mut delay, BootFault::Config).await;
            }
        };
    info!("sd: credentials loaded, ssid={}", credentials.ssid());

    if let Err(err) = fault::message_box(
        &mut panel,
        &renderer,
        &mut delay,
        TITLE,
        &["Booting", "Connecting to WiFi"],
    ) {
        info!("display: wifi notice failed: {:?}", err);
        fault::halt(&mut panel, &renderer, &mut delay, BootFault::Display).await;
    }

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            fault::halt(&mut panel, &renderer, &mut delay, BootFault::Connectivity).await;
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                fault::halt(&mut panel, &renderer, &mut delay, BootFault::Connectivity).await;
            }
        };

    let client_config = ClientConfig::default()
        .with_ssid(credentials.ssid().into())
        .with_password(credentials.secret().into());
    if let Err(err) = wifi_controller.set_config(&ModeConfig::Client(client_config)) {
        info!("wifi mode config failed: {:?}", err);
        fault::halt(&mut panel, &renderer, &mut delay, BootFault::Connectivity).await;
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        0x3A9F_11D2_84C0_57B1,
    );

    let net_future = net_runner.run();
    let app_future = async {
        if net::join_network(&mut wifi_controller, stack, WIFI_MAX_RETRIES)
            .await
            .is_err()
        {
            fault::halt(&mut panel, &renderer, &mut delay, BootFault::Connectivity).await;
        }

        if let Err(err) = fault::message_box(
            &mut panel,
            &renderer,
            &mut delay,
            TITLE,
            &["WiFi connected", "Getting time"],
        ) {
            info!("display: timesync notice failed: {:?}", err);
            fault::halt(&mut panel, &renderer, &mut delay, BootFault::Display).await;
        }

        let mut clock = WallClock::new(UTC_OFFSET_MINUTES);
        if time_sync::acquire(stack, &mut clock, SNTP_MAX_ATTEMPTS, SNTP_POLL_INTERVAL_MS)
            .await
            .is_err()
        {
            fault::halt(&mut panel, &renderer, &mut delay, BootFault::TimeSync).await;
        }
        info!("timesync: local time is {}", clock.sample().date_line().as_str());

        // Terminal state: render forever. Full face on minute boundaries,
        // fast seconds patch in between.
        let mut scheduler = ClockScheduler::new();
        loop {
            let sample = clock.sample();
            let decision = scheduler.decide(&sample);
            let outcome = match decision {
                Refresh::Full => render_face(&mut panel, &renderer, &mut delay, &sample),
                Refresh::Partial => render_seconds(&mut panel, &renderer, &mut delay, &sample),
                Refresh::Skip => Ok(()),
            };

            match outcome {
                Ok(()) => scheduler.commit(decision, &sample),
                Err(err) => {
                    info!("display: {:?} refresh failed: {:?}", decision, err);
                    fault::halt(&mut panel, &renderer, &mut delay, BootFault::Display).await;
                }
            }

            Timer::after_millis(TICK_INTERVAL_MS).await;
        }
    };

    let _ = embassy_futures::join::join(net_future, app_future).await;
    unreachable!()
}
