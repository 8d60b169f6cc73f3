//! TCP listener for genome-browser clients

use genonav_utils::{GenonavError, Result};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::handlers::handle_client;
use crate::SharedState;

/// Bind the client listener
pub async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GenonavError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

    match listener.local_addr() {
        Ok(local) => info!("TCP listener bound to {}", local),
        Err(_) => info!("TCP listener bound to {}", addr),
    }
    Ok(listener)
}

/// Run the TCP accept loop until shutdown
pub async fn run_tcp_accept_loop(listener: TcpListener, shared_state: SharedState) {
    let mut shutdown_rx = shared_state.subscribe_shutdown();

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer_addr)) => {
                        debug!("New TCP connection from {}", peer_addr);
                        if let Err(e) = stream.set_nodelay(true) {
                            debug!("Could not set TCP_NODELAY for {}: {}", peer_addr, e);
                        }
                        let state_clone = shared_state.clone();
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            handle_client(reader, writer, state_clone).await;
                        });
                    }
                    Err(e) => {
                        error!("TCP accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, stopping TCP accept loop");
                break;
            }
        }
    }
}
