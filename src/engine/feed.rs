use std::future::Future;
use std::sync::Arc;

use dashmap::mapref::one::RefMut;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::engine::queue::push_update;
use crate::session::{SessionEvent, SessionUpdate, ShopSession, VendorSession};
use crate::state::AppState;
use crate::store::StoreError;

pub async fn run_feed_engine(state: Arc<AppState>, mut update_rx: mpsc::Receiver<SessionUpdate>) {
    info!("feed engine started");

    while let Some(update) = update_rx.recv().await {
        state.metrics.updates_in_queue.dec();
        apply_update(&state, update);
    }

    warn!("feed engine stopped: update channel closed");
}

fn apply_update(state: &AppState, update: SessionUpdate) {
    match update {
        SessionUpdate::JobsLoaded { vendor_id, jobs } => {
            let Some(mut session) = vendor_session(state, &vendor_id) else {
                return;
            };
            session.open_jobs = jobs;
            refresh_feed(state, &mut session);
        }
        SessionUpdate::BidsLoaded { vendor_id, bids } => {
            let Some(mut session) = vendor_session(state, &vendor_id) else {
                return;
            };
            session.submitted_bids = bids;
        }
        SessionUpdate::PendingLoaded { vendor_id, jobs } => {
            let Some(mut session) = vendor_session(state, &vendor_id) else {
                return;
            };
            session.pending_jobs = jobs;
        }
        SessionUpdate::PreferencesLoaded {
            vendor_id,
            preferences,
        } => {
            let Some(mut session) = vendor_session(state, &vendor_id) else {
                return;
            };
            session.preferences = Some(preferences);
            refresh_feed(state, &mut session);
        }
        SessionUpdate::PositionChanged {
            vendor_id,
            position,
        } => {
            let Some(mut session) = vendor_session(state, &vendor_id) else {
                return;
            };
            session.position = Some(position);
            refresh_feed(state, &mut session);
        }
        SessionUpdate::JobClaimed {
            vendor_id,
            job_id,
            bid,
        } => {
            let Some(mut session) = vendor_session(state, &vendor_id) else {
                return;
            };
            let bid_id = bid.id.clone();
            session.open_jobs.retain(|job| job.id != job_id);
            session.submitted_bids.push(bid);
            refresh_feed(state, &mut session);
            drop(session);

            let _ = state.session_events_tx.send(SessionEvent::BidSubmitted {
                vendor_id,
                job_id,
                bid_id,
            });
        }
        SessionUpdate::PendingResolved {
            vendor_id,
            pending_id,
        } => {
            let Some(mut session) = vendor_session(state, &vendor_id) else {
                return;
            };
            session
                .pending_jobs
                .retain(|pending| pending.id != pending_id);
            drop(session);

            let _ = state.session_events_tx.send(SessionEvent::JobCompleted {
                vendor_id,
                pending_id,
            });
        }
        SessionUpdate::ShopBidsLoaded { shop_id, bids } => {
            let Some(mut session) = shop_session(state, &shop_id) else {
                return;
            };
            session.incoming_bids = bids;
            let incoming = session.incoming_bids.len();
            drop(session);

            let _ = state
                .session_events_tx
                .send(SessionEvent::BidsRefreshed { shop_id, incoming });
        }
        SessionUpdate::BidAccepted {
            shop_id,
            bid_id,
            bids,
        } => {
            let Some(mut session) = shop_session(state, &shop_id) else {
                return;
            };
            session.incoming_bids = bids;
            let incoming = session.incoming_bids.len();
            drop(session);

            let _ = state.session_events_tx.send(SessionEvent::BidAccepted {
                shop_id: shop_id.clone(),
                bid_id,
            });
            let _ = state
                .session_events_tx
                .send(SessionEvent::BidsRefreshed { shop_id, incoming });
        }
    }
}

fn vendor_session<'a>(
    state: &'a AppState,
    vendor_id: &str,
) -> Option<RefMut<'a, String, VendorSession>> {
    let session = state.vendors.get_mut(vendor_id);
    if session.is_none() {
        debug!(vendor_id = %vendor_id, "update dropped: vendor session closed");
    }
    session
}

fn shop_session<'a>(state: &'a AppState, shop_id: &str) -> Option<RefMut<'a, String, ShopSession>> {
    let session = state.shops.get_mut(shop_id);
    if session.is_none() {
        debug!(shop_id = %shop_id, "update dropped: shop session closed");
    }
    session
}

fn refresh_feed(state: &AppState, session: &mut VendorSession) {
    session.recompute_visible();

    state
        .metrics
        .visible_jobs
        .with_label_values(&[&session.vendor_id])
        .set(session.visible_jobs.len() as i64);

    let _ = state.session_events_tx.send(SessionEvent::FeedUpdated {
        vendor_id: session.vendor_id.clone(),
        visible: session.visible_jobs.len(),
    });
}

pub fn spawn_vendor_loaders(state: &Arc<AppState>, vendor_id: &str) -> Vec<AbortHandle> {
    let jobs = spawn_loader(state, "open jobs", {
        let vendor_id = vendor_id.to_string();
        move |state: Arc<AppState>| async move {
            let jobs = state.store.fetch_open_jobs().await?;
            Ok(SessionUpdate::JobsLoaded { vendor_id, jobs })
        }
    });

    let bids = spawn_loader(state, "submitted bids", {
        let vendor_id = vendor_id.to_string();
        move |state: Arc<AppState>| async move {
            let bids = state.store.fetch_vendor_bids(&vendor_id).await?;
            Ok(SessionUpdate::BidsLoaded { vendor_id, bids })
        }
    });

    let pending = spawn_loader(state, "pending jobs", {
        let vendor_id = vendor_id.to_string();
        move |state: Arc<AppState>| async move {
            let jobs = state.store.fetch_vendor_pending(&vendor_id).await?;
            Ok(SessionUpdate::PendingLoaded { vendor_id, jobs })
        }
    });

    let preferences = spawn_loader(state, "preferences", {
        let vendor_id = vendor_id.to_string();
        move |state: Arc<AppState>| async move {
            let preferences = state.store.fetch_preferences(&vendor_id).await?;
            Ok(SessionUpdate::PreferencesLoaded {
                vendor_id,
                preferences,
            })
        }
    });

    vec![jobs, bids, pending, preferences]
}

pub fn spawn_shop_loaders(state: &Arc<AppState>, shop_id: &str) -> Vec<AbortHandle> {
    let bids = spawn_loader(state, "shop bids", {
        let shop_id = shop_id.to_string();
        move |state: Arc<AppState>| async move {
            let bids = state.store.fetch_shop_bids(&shop_id).await?;
            Ok(SessionUpdate::ShopBidsLoaded { shop_id, bids })
        }
    });

    vec![bids]
}

// Loader failures never surface to a response: the session slice simply
// stays stale until the next refresh.
fn spawn_loader<F, Fut>(state: &Arc<AppState>, context: &'static str, load: F) -> AbortHandle
where
    F: FnOnce(Arc<AppState>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<SessionUpdate, StoreError>> + Send + 'static,
{
    let state = state.clone();

    tokio::spawn(async move {
        match load(state.clone()).await {
            Ok(update) => {
                if let Err(err) = push_update(&state, update).await {
                    warn!(error = %err, context, "session update dropped");
                }
            }
            Err(err) => warn!(error = %err, context, "session load failed"),
        }
    })
    .abort_handle()
}
