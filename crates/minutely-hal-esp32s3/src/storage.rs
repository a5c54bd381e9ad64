//! SD-card credential storage.
//!
//! One small read at boot: mount volume 0 over SPI, pull the settings
//! file from the root directory, close everything, parse. The card is
//! not touched again for the life of the process.

use embedded_hal::{
    delay::DelayNs,
    digital::OutputPin,
    spi::{Error as SpiErrorTrait, ErrorKind, ErrorType, Operation, SpiBus, SpiDevice},
};
use embedded_sdmmc::{Mode, SdCard, SdCardError, TimeSource, Timestamp, VolumeIdx, VolumeManager};
use log::info;
use minutely_core::config::{self, ConfigError, Credentials};

/// Largest settings file worth reading: two short credential lines.
pub const CREDENTIAL_FILE_MAX_BYTES: usize = 128;

/// Fixed timestamp source; the wall clock is not set yet when the card
/// is read.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedTimeSource;

impl TimeSource for FixedTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        // 2026-01-01 00:00:00
        Timestamp {
            year_since_1970: 56,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// Credential read error details.
#[derive(Debug)]
pub enum StorageError<BusErr, CsErr>
where
    BusErr: core::fmt::Debug,
    CsErr: core::fmt::Debug,
{
    ChipSelect(CsErr),
    Spi(BusErr),
    Card(SdCardError),
    Filesystem(embedded_sdmmc::Error<SdCardError>),
    Credentials(ConfigError),
}

#[derive(Debug)]
enum CsSpiError<BusErr, CsErr>
where
    BusErr: core::fmt::Debug,
    CsErr: core::fmt::Debug,
{
    Bus(BusErr),
    Cs(CsErr),
    DelayNotSupported,
}

impl<BusErr, CsErr> SpiErrorTrait for CsSpiError<BusErr, CsErr>
where
    BusErr: core::fmt::Debug,
    CsErr: core::fmt::Debug,
{
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// `SpiDevice` over an exclusively held bus plus a chip-select pin.
struct CsSpiDevice<'a, BUS, CS>
where
    BUS: SpiBus<u8>,
    CS: OutputPin,
{
    bus: &'a mut BUS,
    cs: &'a mut CS,
}

impl<'a, BUS, CS> CsSpiDevice<'a, BUS, CS>
where
    BUS: SpiBus<u8>,
    CS: OutputPin,
{
    fn new(bus: &'a mut BUS, cs: &'a mut CS) -> Self {
        Self { bus, cs }
    }
}

impl<BUS, CS> ErrorType for CsSpiDevice<'_, BUS, CS>
where
    BUS: SpiBus<u8>,
    CS: OutputPin,
    BUS::Error: core::fmt::Debug,
    CS::Error: core::fmt::Debug,
{
    type Error = CsSpiError<BUS::Error, CS::Error>;
}

impl<BUS, CS> SpiDevice<u8> for CsSpiDevice<'_, BUS, CS>
where
    BUS: SpiBus<u8>,
    CS: OutputPin,
    BUS::Error: core::fmt::Debug,
    CS::Error: core::fmt::Debug,
{
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(CsSpiError::Cs)?;

        let op_result = (|| {
            for operation in operations {
                match operation {
                    Operation::Read(buf) => self.bus.read(buf).map_err(CsSpiError::Bus)?,
                    Operation::Write(buf) => self.bus.write(buf).map_err(CsSpiError::Bus)?,
                    Operation::Transfer(read, write) => {
                        self.bus.transfer(read, write).map_err(CsSpiError::Bus)?
                    }
                    Operation::TransferInPlace(buf) => {
                        self.bus.transfer_in_place(buf).map_err(CsSpiError::Bus)?
                    }
                    Operation::DelayNs(_) => return Err(CsSpiError::DelayNotSupported),
                }
            }
            self.bus.flush().map_err(CsSpiError::Bus)
        })();

        let cs_result = self.cs.set_high().map_err(CsSpiError::Cs);
        match (op_result, cs_result) {
            (Err(e), _) => Err(e),
            (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}

struct DelayRef<'a, D>(&'a mut D);

impl<D> DelayNs for DelayRef<'_, D>
where
    D: DelayNs,
{
    fn delay_ns(&mut self, ns: u32) {
        self.0.delay_ns(ns);
    }
}

/// Mounts the card, reads `file_name` from the root directory, and parses
/// it into wireless credentials. Everything is closed before returning.
pub fn read_credentials<BUS, CS, D>(
    bus: &mut BUS,
    cs: &mut CS,
    delay: &mut D,
    file_name: &str,
) -> Result<Credentials, StorageError<BUS::Error, CS::Error>>
where
    BUS: SpiBus<u8>,
    CS: OutputPin,
    D: DelayNs,
    BUS::Error: core::fmt::Debug,
    CS::Error: core::fmt::Debug,
{
    cs.set_high().map_err(StorageError::ChipSelect)?;

    // SD SPI init requires >=74 clock cycles with CS deasserted.
    let preclock = [0xFFu8; 10];
    bus.write(&preclock).map_err(StorageError::Spi)?;

    let spi_device = CsSpiDevice::new(bus, cs);
    let mut delay_ref = DelayRef(delay);
    let sd_card = SdCard::new(spi_device, &mut delay_ref);
    let card_size_bytes = sd_card.num_bytes().map_err(StorageError::Card)?;
    info!("sd: card detected, {} bytes", card_size_bytes);

    let mut volume_mgr = VolumeManager::new(sd_card, FixedTimeSource);
    let mut volume = volume_mgr
        .open_volume(VolumeIdx(0))
        .map_err(StorageError::Filesystem)?;
    let mut root_dir = volume.open_root_dir().map_err(StorageError::Filesystem)?;
    let mut file = root_dir
        .open_file_in_dir(file_name, Mode::ReadOnly)
        .map_err(StorageError::Filesystem)?;

    let mut raw = [0u8; CREDENTIAL_FILE_MAX_BYTES];
    let mut total = 0usize;
    while !file.is_eof() && total < raw.len() {
        let read_now = file
            .read(&mut raw[total..])
            .map_err(StorageError::Filesystem)?;
        if read_now == 0 {
            break;
        }
        total += read_now;
    }

    file.close().map_err(StorageError::Filesystem)?;
    root_dir.close().map_err(StorageError::Filesystem)?;
    volume.close().map_err(StorageError::Filesystem)?;

    config::parse_credentials(&raw[..total]).map_err(StorageError::Credentials)
}
