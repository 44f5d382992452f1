use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};

use crate::observability::metrics::Metrics;
use crate::payments::PaymentClient;
use crate::session::{SessionEvent, SessionUpdate, ShopSession, VendorSession};
use crate::store::MarketStore;

pub struct AppState {
    pub vendors: DashMap<String, VendorSession>,
    pub shops: DashMap<String, ShopSession>,
    pub store: MarketStore,
    pub payments: PaymentClient,
    pub update_tx: mpsc::Sender<SessionUpdate>,
    pub session_events_tx: broadcast::Sender<SessionEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        store: MarketStore,
        payments: PaymentClient,
        update_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<SessionUpdate>) {
        let (update_tx, update_rx) = mpsc::channel(update_queue_size);
        let (session_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                vendors: DashMap::new(),
                shops: DashMap::new(),
                store,
                payments,
                update_tx,
                session_events_tx,
                metrics: Metrics::new(),
            },
            update_rx,
        )
    }
}
