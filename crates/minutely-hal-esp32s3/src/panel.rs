//! Exclusive ownership of the single e-paper panel.
//!
//! [`PanelPort`] owns the physical resource: driver, frame planes, and
//! the knowledge of which waveform the controller currently runs.
//! [`PanelHandle`] is the mode-tagged working handle: it borrows the port
//! mutably, so at most one handle is ever live, and acquiring a handle in
//! a different mode tears the old controller state down before setting up
//! the new one.

use depg0290::{Depg0290, Error, Frame, Rotation, Waveform};
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};
use log::debug;

/// Rendering mode a live panel handle is tagged with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderMode {
    /// Fast monochrome partial updates.
    FastPartial,
    /// Slow damage-safe tri-color updates.
    FullColor,
}

impl RenderMode {
    fn waveform(self) -> Waveform {
        match self {
            Self::FastPartial => Waveform::FastMono,
            Self::FullColor => Waveform::FullTriColor,
        }
    }
}

/// The one physical panel plus its reusable frame planes.
pub struct PanelPort<SPI, DC, RST, CS, BUSY> {
    epd: Depg0290<SPI, DC, RST, CS, BUSY>,
    bw: Frame,
    red: Frame,
    active: Option<RenderMode>,
}

impl<SPI, DC, RST, CS, BUSY> PanelPort<SPI, DC, RST, CS, BUSY>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    BUSY: InputPin,
{
    pub fn new(epd: Depg0290<SPI, DC, RST, CS, BUSY>, rotation: Rotation) -> Self {
        Self {
            epd,
            bw: Frame::new(rotation),
            red: Frame::new(rotation),
            active: None,
        }
    }

    /// Mode the controller is currently initialized for, if any.
    pub fn active_mode(&self) -> Option<RenderMode> {
        self.active
    }

    /// Takes the panel in `mode`.
    ///
    /// When the controller currently runs the other mode it is put to
    /// sleep and re-initialized: destroy before create, never two modes
    /// at once. A matching live configuration is reused as-is.
    /// `init_timeout_us` bounds each busy wait of the init sequence.
    pub fn acquire<'a, D>(
        &'a mut self,
        mode: RenderMode,
        delay: &mut D,
        init_timeout_us: u32,
    ) -> Result<
        PanelHandle<'a, SPI, DC, RST, CS, BUSY>,
        Error<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error>,
    >
    where
        D: DelayNs,
    {
        if self.active != Some(mode) {
            if self.active.is_some() {
                debug!("panel: {:?} -> {:?}", self.active, mode);
                self.epd.deep_sleep()?;
                self.active = None;
            }
            self.epd.init(mode.waveform(), delay, init_timeout_us)?;
            self.active = Some(mode);
        }

        Ok(PanelHandle { port: self, mode })
    }
}

/// Exclusive, mode-tagged access to the panel.
pub struct PanelHandle<'a, SPI, DC, RST, CS, BUSY> {
    port: &'a mut PanelPort<SPI, DC, RST, CS, BUSY>,
    mode: RenderMode,
}

impl<SPI, DC, RST, CS, BUSY> PanelHandle<'_, SPI, DC, RST, CS, BUSY>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    BUSY: InputPin,
{
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Clears both frame planes to the background.
    pub fn clear(&mut self) {
        self.port.bw.fill(false);
        self.port.red.fill(false);
    }

    /// The black plane, plus the red plane when the full-color waveform
    /// is active. FastPartial never drives red ink.
    pub fn planes_mut(&mut self) -> (&mut Frame, Option<&mut Frame>) {
        match self.mode {
            RenderMode::FastPartial => (&mut self.port.bw, None),
            RenderMode::FullColor => (&mut self.port.bw, Some(&mut self.port.red)),
        }
    }

    /// Writes the planes out and runs the refresh waveform, blocking
    /// until the hardware signals completion or `timeout_us` elapses.
    pub fn flush<D>(
        &mut self,
        delay: &mut D,
        timeout_us: u32,
    ) -> Result<(), Error<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error>>
    where
        D: DelayNs,
    {
        self.port.epd.write_bw_frame(&self.port.bw)?;
        if self.mode == RenderMode::FullColor {
            self.port.epd.write_red_frame(&self.port.red)?;
        }
        self.port.epd.refresh(delay, timeout_us)
    }
}
