use arp_offload::{close_socket, Device, NetStack};
use arp_offload_core::config::{HTTP_PORT, MAX_RESOURCES};
use arp_offload_core::panel::{ControlPanel, ResourceTable};
use embassy_net::{tcp::TcpSocket, IpListenEndpoint};
use log::{error, info, warn};

const ENDPOINT: IpListenEndpoint = IpListenEndpoint {
    addr: None,
    port: HTTP_PORT,
};

#[embassy_executor::task]
pub async fn task_loop(
    stack: &'static NetStack,
    table: &'static ResourceTable<MAX_RESOURCES>,
    device: &'static Device,
) {
    info!("Starting web_serve_loop");
    let panel = ControlPanel::new(table, device);
    let mut rx_buffer = [0; 2048];
    let mut tx_buffer = [0; 2048];
    let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(embassy_time::Duration::from_secs(10)));

    loop {
        if let Err(e) = socket.accept(ENDPOINT).await {
            // drop whatever is left of the previous connection
            warn!("accept error: {:?}", e);
            close_socket(&mut socket).await;
            continue;
        }

        match panel.serve(&mut socket).await {
            Ok(status) => info!("web_serve_loop: {}", status.code()),
            Err(e) => error!("web_serve_loop: {}", e),
        }

        close_socket(&mut socket).await;
    }
}
