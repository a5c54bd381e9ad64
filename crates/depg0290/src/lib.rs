#![cfg_attr(not(test), no_std)]

//! DEPG0290 (2.9" 128x296 DKE tri-color e-paper) driver primitives.

mod framebuffer;
pub mod protocol;

pub use framebuffer::{Frame, Rotation};

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

/// Waveform the controller was last initialized with.
///
/// The two configurations trade refresh latency against panel stress: the
/// full tri-color waveform is slow but resets ghosting, the fast monochrome
/// waveform is quick but accumulates it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Waveform {
    /// Slow damage-safe black/white/red refresh.
    FullTriColor,
    /// Fast black/white refresh; the red plane is not driven.
    FastMono,
}

impl Waveform {
    fn update_sequence(self) -> u8 {
        match self {
            Self::FullTriColor => protocol::UPDATE_SEQUENCE_FULL,
            Self::FastMono => protocol::UPDATE_SEQUENCE_FAST,
        }
    }

    fn border_waveform(self) -> u8 {
        match self {
            Self::FullTriColor => protocol::BORDER_FULL,
            Self::FastMono => protocol::BORDER_FAST,
        }
    }
}

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Interval between BUSY pin samples while waiting for the controller.
    pub busy_poll_us: u32,
    /// Reset pulse width.
    pub reset_pulse_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            busy_poll_us: 1_000,
            reset_pulse_ms: 10,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, DcErr, RstErr, CsErr, BusyErr> {
    /// SPI transaction failed.
    Spi(SpiErr),
    /// DC pin operation failed.
    Dc(DcErr),
    /// RST pin operation failed.
    Rst(RstErr),
    /// CS pin operation failed.
    Cs(CsErr),
    /// BUSY pin read failed.
    Busy(BusyErr),
    /// Controller stayed busy past the caller's wait bound.
    BusyTimeout,
    /// Command issued before a waveform was initialized.
    Uninitialized,
}

pub type DriverResult<SpiErr, DcErr, RstErr, CsErr, BusyErr> =
    Result<(), Error<SpiErr, DcErr, RstErr, CsErr, BusyErr>>;

/// DEPG0290 driver over a shared SPI bus with dedicated control pins.
#[derive(Debug)]
pub struct Depg0290<SPI, DC, RST, CS, BUSY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    cs: CS,
    busy: BUSY,
    config: Config,
    waveform: Option<Waveform>,
}

impl<SPI, DC, RST, CS, BUSY> Depg0290<SPI, DC, RST, CS, BUSY>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    BUSY: InputPin,
{
    /// Creates a new driver instance. The controller is left untouched
    /// until [`Self::init`] runs a reset and waveform setup.
    pub fn new(spi: SPI, dc: DC, rst: RST, cs: CS, busy: BUSY, config: Config) -> Self {
        Self {
            spi,
            dc,
            rst,
            cs,
            busy,
            config,
            waveform: None,
        }
    }

    /// Returns current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Waveform the controller currently runs, if initialized.
    pub fn active_waveform(&self) -> Option<Waveform> {
        self.waveform
    }

    /// Releases owned bus and pins.
    pub fn release(self) -> (SPI, DC, RST, CS, BUSY) {
        (self.spi, self.dc, self.rst, self.cs, self.busy)
    }

    /// Resets the controller and configures it for `waveform`.
    ///
    /// Also wakes the controller from deep sleep. `timeout_us` bounds each
    /// BUSY wait during the reset sequence.
    pub fn init<D>(
        &mut self,
        waveform: Waveform,
        delay: &mut D,
        timeout_us: u32,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error>
    where
        D: DelayNs,
    {
        self.waveform = None;
        self.hardware_reset(delay)?;
        self.wait_idle(delay, timeout_us)?;
        self.write_command(protocol::SW_RESET, &[])?;
        self.wait_idle(delay, timeout_us)?;

        self.write_command(protocol::DRIVER_OUTPUT_CONTROL, &protocol::driver_output_data())?;
        self.write_command(protocol::DATA_ENTRY_MODE, &[protocol::DATA_ENTRY_X_INC_Y_INC])?;
        self.write_command(protocol::SET_RAM_X_RANGE, &protocol::ram_x_window())?;
        self.write_command(protocol::SET_RAM_Y_RANGE, &protocol::ram_y_window())?;
        self.write_command(protocol::BORDER_WAVEFORM, &[waveform.border_waveform()])?;
        self.write_command(protocol::TEMP_SENSOR_CONTROL, &[protocol::TEMP_SENSOR_INTERNAL])?;

        self.waveform = Some(waveform);
        Ok(())
    }

    /// Writes the black/white plane.
    ///
    /// The frame stores ink bits; controller BW RAM uses 1 = white, so the
    /// bytes are inverted on the way out.
    pub fn write_bw_frame(
        &mut self,
        frame: &Frame,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error> {
        if self.waveform.is_none() {
            return Err(Error::Uninitialized);
        }
        self.rewind_ram_counters()?;
        self.stream_frame(protocol::WRITE_BW_RAM, frame, true)
    }

    /// Writes the red plane (1 = red, no inversion).
    pub fn write_red_frame(
        &mut self,
        frame: &Frame,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error> {
        if self.waveform.is_none() {
            return Err(Error::Uninitialized);
        }
        self.rewind_ram_counters()?;
        self.stream_frame(protocol::WRITE_RED_RAM, frame, false)
    }

    /// Runs the display-update sequence for the active waveform and blocks
    /// until BUSY deasserts, bounded by `timeout_us`.
    pub fn refresh<D>(
        &mut self,
        delay: &mut D,
        timeout_us: u32,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error>
    where
        D: DelayNs,
    {
        let waveform = self.waveform.ok_or(Error::Uninitialized)?;
        self.write_command(protocol::DISPLAY_UPDATE_CONTROL_2, &[waveform.update_sequence()])?;
        self.write_command(protocol::MASTER_ACTIVATE, &[])?;
        self.wait_idle(delay, timeout_us)
    }

    /// Puts the controller into deep sleep. A subsequent [`Self::init`] is
    /// required before any further use.
    pub fn deep_sleep(
        &mut self,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error> {
        self.write_command(protocol::DEEP_SLEEP_MODE, &[protocol::DEEP_SLEEP_MODE_1])?;
        self.waveform = None;
        Ok(())
    }

    fn hardware_reset<D>(
        &mut self,
        delay: &mut D,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error>
    where
        D: DelayNs,
    {
        self.rst.set_low().map_err(Error::Rst)?;
        delay.delay_ms(self.config.reset_pulse_ms);
        self.rst.set_high().map_err(Error::Rst)?;
        delay.delay_ms(self.config.reset_pulse_ms);
        Ok(())
    }

    fn wait_idle<D>(
        &mut self,
        delay: &mut D,
        timeout_us: u32,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error>
    where
        D: DelayNs,
    {
        let mut waited_us = 0u32;
        // BUSY is active high on this module.
        while self.busy.is_high().map_err(Error::Busy)? {
            if waited_us >= timeout_us {
                return Err(Error::BusyTimeout);
            }
            delay.delay_us(self.config.busy_poll_us);
            waited_us = waited_us.saturating_add(self.config.busy_poll_us);
        }
        Ok(())
    }

    fn rewind_ram_counters(
        &mut self,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error> {
        self.write_command(protocol::SET_RAM_X_COUNTER, &[0x00])?;
        self.write_command(protocol::SET_RAM_Y_COUNTER, &[0x00, 0x00])
    }

    fn write_command(
        &mut self,
        command: u8,
        data: &[u8],
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error> {
        self.cs.set_low().map_err(Error::Cs)?;
        self.dc.set_low().map_err(Error::Dc)?;
        self.spi.write(&[command]).map_err(Error::Spi)?;

        if !data.is_empty() {
            self.dc.set_high().map_err(Error::Dc)?;
            self.spi.write(data).map_err(Error::Spi)?;
        }

        self.spi.flush().map_err(Error::Spi)?;
        self.cs.set_high().map_err(Error::Cs)
    }

    fn stream_frame(
        &mut self,
        command: u8,
        frame: &Frame,
        invert: bool,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error, CS::Error, BUSY::Error> {
        self.cs.set_low().map_err(Error::Cs)?;
        self.dc.set_low().map_err(Error::Dc)?;
        self.spi.write(&[command]).map_err(Error::Spi)?;
        self.dc.set_high().map_err(Error::Dc)?;

        let mut line = [0u8; protocol::LINE_BYTES];
        for chunk in frame.bytes().chunks_exact(protocol::LINE_BYTES) {
            for (dst, src) in line.iter_mut().zip(chunk) {
                *dst = if invert { !*src } else { *src };
            }
            self.spi.write(&line).map_err(Error::Spi)?;
        }

        self.spi.flush().map_err(Error::Spi)?;
        self.cs.set_high().map_err(Error::Cs)
    }
}
