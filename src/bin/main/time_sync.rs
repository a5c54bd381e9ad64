//! SNTP acquisition: resolve the pool hostname, exchange one packet per
//! poll, anchor the wall clock, and let the core budget decide the
//! terminal state.

use embassy_net::{
    IpEndpoint, Stack,
    dns::DnsQueryType,
    udp::{PacketMetadata, UdpSocket},
};
use embassy_time::{Duration, Timer, WithTimeout};
use log::info;
use minutely_core::{
    ntp,
    sync::{SyncState, TimeSync},
};

use super::wall_clock::WallClock;

const NTP_SERVER: &str = "pool.ntp.org";
const NTP_LOCAL_PORT: u16 = 12_888;
const REPLY_TIMEOUT_MS: u64 = 1_500;
const UDP_BUFFER_BYTES: usize = 128;

/// Brings the wall clock to a plausible date. `Err` means the attempt
/// budget ran out.
pub(super) async fn acquire(
    stack: Stack<'_>,
    clock: &mut WallClock,
    max_attempts: u32,
    poll_interval_ms: u64,
) -> Result<(), ()> {
    let mut sync = TimeSync::new(max_attempts);
    if sync.begin(clock.sample().is_plausible()) == SyncState::Synced {
        info!("timesync: clock already plausible");
        return Ok(());
    }

    let mut rx_meta = [PacketMetadata::EMPTY; 2];
    let mut tx_meta = [PacketMetadata::EMPTY; 2];
    let mut rx_buffer = [0u8; UDP_BUFFER_BYTES];
    let mut tx_buffer = [0u8; UDP_BUFFER_BYTES];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if let Err(err) = socket.bind(NTP_LOCAL_PORT) {
        info!("timesync: socket bind failed: {:?}", err);
        return Err(());
    }

    let mut state = SyncState::Syncing;
    while state == SyncState::Syncing {
        if let Some(unix_secs) = query_server(stack, &mut socket).await {
            clock.set_unix(unix_secs);
        }
        Timer::after_millis(poll_interval_ms).await;
        state = sync.on_poll(clock.sample().is_plausible());
    }

    match state {
        SyncState::Synced => Ok(()),
        _ => Err(()),
    }
}

/// One request/reply exchange. Any failure just returns `None`; the
/// caller's budget decides when to stop trying.
async fn query_server(stack: Stack<'_>, socket: &mut UdpSocket<'_>) -> Option<u64> {
    let address = match stack.dns_query(NTP_SERVER, DnsQueryType::A).await {
        Ok(addresses) => addresses.first().copied()?,
        Err(err) => {
            info!("timesync: dns lookup failed: {:?}", err);
            return None;
        }
    };

    let request = ntp::client_request();
    if let Err(err) = socket
        .send_to(&request, IpEndpoint::new(address, ntp::PORT))
        .await
    {
        info!("timesync: send failed: {:?}", err);
        return None;
    }

    let mut reply = [0u8; ntp::PACKET_LEN];
    match socket
        .recv_from(&mut reply)
        .with_timeout(Duration::from_millis(REPLY_TIMEOUT_MS))
        .await
    {
        Ok(Ok((len, _meta))) => match ntp::parse_server_reply(&reply[..len]) {
            Ok(unix_secs) => {
                info!("timesync: server reply, unix={}", unix_secs);
                Some(unix_secs)
            }
            Err(err) => {
                info!("timesync: reply rejected: {:?}", err);
                None
            }
        },
        Ok(Err(err)) => {
            info!("timesync: receive failed: {:?}", err);
            None
        }
        Err(_) => {
            info!("timesync: reply timed out");
            None
        }
    }
}
