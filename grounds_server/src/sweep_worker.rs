use chrono::Duration;
use grounds_engine::{db_types::Transaction, events::EventProducers, OrderFlowApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the stale order sweep. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every `interval`, pending transactions older than `pending_timeout` are cancelled by the system actor. Returns
/// `None` if `pending_timeout` is zero, which disables the sweep.
pub fn start_sweep_worker(
    db: SqliteDatabase,
    producers: EventProducers,
    pending_timeout: Duration,
    interval: std::time::Duration,
) -> Option<JoinHandle<()>> {
    if pending_timeout <= Duration::zero() {
        info!("🕰️ The stale order sweep is disabled");
        return None;
    }
    let handle = tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = OrderFlowApi::new(db, producers);
        info!("🕰️ Stale order sweep started. Pending orders expire after {} hours", pending_timeout.num_hours());
        loop {
            timer.tick().await;
            debug!("🕰️ Running stale order sweep");
            match api.expire_stale_orders(pending_timeout).await {
                Ok(expired) if expired.is_empty() => trace!("🕰️ No stale orders"),
                Ok(expired) => info!("🕰️ {} stale orders cancelled: {}", expired.len(), order_list(&expired)),
                Err(e) => error!("🕰️ Error running the stale order sweep: {e}"),
            }
        }
    });
    Some(handle)
}

fn order_list(orders: &[Transaction]) -> String {
    orders
        .iter()
        .map(|t| format!("#{} (buyer: {}, seller: {})", t.id, t.buyer_id, t.seller_id))
        .collect::<Vec<String>>()
        .join(", ")
}
