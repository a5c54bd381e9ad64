//! Bootstrap wifi join driving the core connection machine.
//!
//! The core [`Connector`] decides; this module executes its steps against
//! esp-radio and waits for DHCP through embassy-net. Every wait carries a
//! timeout, and a timed-out wait is fed back as a link loss so the retry
//! budget always resolves the stage.

use embassy_net::Stack;
use embassy_time::{Duration, WithTimeout};
use esp_radio::wifi::WifiController;
use log::info;
use minutely_core::link::{Connector, LinkEvent, LinkStep};

const CONNECT_TIMEOUT_SECS: u64 = 20;
const DHCP_TIMEOUT_SECS: u64 = 15;

/// Joins the configured network. `Err` means the retry budget ran out.
pub(super) async fn join_network(
    wifi_controller: &mut WifiController<'_>,
    stack: Stack<'_>,
    max_retries: u32,
) -> Result<(), ()> {
    let mut connector = Connector::new(max_retries);
    let mut step = connector.start();

    loop {
        match step {
            LinkStep::IssueConnect => {
                if !wifi_controller.is_started().unwrap_or(false) {
                    if let Err(err) = wifi_controller.start_async().await {
                        info!("wifi start failed: {:?}", err);
                        step = connector.on_event(LinkEvent::LinkLost);
                        continue;
                    }
                }

                match wifi_controller
                    .connect_async()
                    .with_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
                    .await
                {
                    Ok(Ok(())) => step = connector.on_event(LinkEvent::LinkUp),
                    Ok(Err(err)) => {
                        info!("wifi connect failed: {:?}", err);
                        let _ = wifi_controller.disconnect_async().await;
                        step = connector.on_event(LinkEvent::LinkLost);
                    }
                    Err(_) => {
                        info!("wifi connect timed out");
                        let _ = wifi_controller.disconnect_async().await;
                        step = connector.on_event(LinkEvent::LinkLost);
                    }
                }
            }
            LinkStep::Wait => {
                match stack
                    .wait_config_up()
                    .with_timeout(Duration::from_secs(DHCP_TIMEOUT_SECS))
                    .await
                {
                    Ok(()) => step = connector.on_event(LinkEvent::AddressAssigned),
                    Err(_) => {
                        info!("dhcp timed out; treating as link loss");
                        let _ = wifi_controller.disconnect_async().await;
                        step = connector.on_event(LinkEvent::LinkLost);
                    }
                }
            }
            LinkStep::Connected => {
                info!(
                    "wifi connected, ipv4 config {:?}",
                    stack.config_v4().map(|c| c.address)
                );
                return Ok(());
            }
            LinkStep::Failed => {
                info!("wifi failed after {} retries", connector.retries());
                return Err(());
            }
        }
    }
}
