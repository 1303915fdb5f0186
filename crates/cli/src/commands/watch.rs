//! Polling views.
//!
//! Each view re-issues one GET on the interval its [`PollTarget`] names and
//! logs a fresh rendering of the response. A failed fetch logs a warning and
//! waits for the next tick. There is no retry, backoff or queue.
//!
//! # Usage
//!
//! ```bash
//! sb-cli watch driver-queue --driver-id 3
//! SWIFTBITE_ADMIN_TOKEN=... sb-cli watch admin-board
//! sb-cli watch track --order-id 42
//! ```
//!
//! # Environment Variables
//!
//! - `SWIFTBITE_API_URL` - API base URL (default `http://127.0.0.1:3000`)
//! - `SWIFTBITE_ADMIN_TOKEN` - Bearer token, required for `admin-board`

use std::fmt::Write as _;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tokio::time::{Interval, MissedTickBehavior};
use url::Url;

use swiftbite_core::PollTarget;

/// API base URL when `SWIFTBITE_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that stop a watch before it starts polling.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The API base URL could not be parsed.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A view to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    DriverQueue { driver_id: i32 },
    AdminBoard,
    Track { order_id: i32 },
}

impl View {
    /// Refresh cadence for this view.
    #[must_use]
    pub const fn target(&self) -> PollTarget {
        match self {
            Self::DriverQueue { .. } => PollTarget::DriverQueue,
            Self::AdminBoard => PollTarget::AdminDashboard,
            Self::Track { .. } => PollTarget::OrderTracking,
        }
    }

    /// API path polled by this view.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::DriverQueue { driver_id } => format!("/api/drivers/{driver_id}/available-orders"),
            Self::AdminBoard => "/api/admin/stats".to_string(),
            Self::Track { order_id } => format!("/api/orders/{order_id}/track"),
        }
    }

    const fn needs_admin(&self) -> bool {
        matches!(self, Self::AdminBoard)
    }

    /// One-screen summary of a response. Replaces the previous one entirely.
    #[must_use]
    pub fn render(&self, body: &Value) -> String {
        match self {
            Self::DriverQueue { .. } => render_queue(body),
            Self::AdminBoard => render_board(body),
            Self::Track { .. } => render_tracking(body),
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn render_queue(body: &Value) -> String {
    let orders = body.as_array().map_or(&[][..], Vec::as_slice);
    if orders.is_empty() {
        return "No orders waiting".to_string();
    }

    let mut out = format!("{} order(s) waiting", orders.len());
    for order in orders {
        let _ = write!(
            out,
            "\n  #{} {} total {} -> {}",
            text(&order["id"]),
            text(&order["orderNumber"]),
            text(&order["totalAmount"]),
            text(&order["deliveryAddress"]),
        );
    }
    out
}

fn render_board(body: &Value) -> String {
    let mut out = format!(
        "Today: {} orders, revenue {} | available drivers: {}",
        text(&body["todayOrders"]),
        text(&body["todayRevenue"]),
        text(&body["availableDrivers"]),
    );
    if let Some(by_status) = body["ordersByStatus"].as_object() {
        for (status, count) in by_status {
            let _ = write!(out, "\n  {status:<10} {}", text(count));
        }
    }
    out
}

fn render_tracking(body: &Value) -> String {
    let order = &body["order"];
    let mut out = format!(
        "Order {} is {}",
        text(&order["orderNumber"]),
        text(&order["status"]),
    );
    if let Some(driver) = body["driver"].as_object() {
        let _ = write!(
            out,
            " | driver {} ({})",
            driver.get("name").map_or_else(|| "-".to_string(), text),
            driver.get("currentLocation").map_or_else(|| "-".to_string(), text),
        );
    }
    for event in body["tracking"].as_array().map_or(&[][..], Vec::as_slice) {
        let _ = write!(
            out,
            "\n  {} {:<10} {}",
            text(&event["createdAt"]),
            text(&event["status"]),
            text(&event["message"]),
        );
    }
    out
}

fn admin_token() -> Result<SecretString, WatchError> {
    dotenvy::dotenv().ok();

    std::env::var("SWIFTBITE_ADMIN_TOKEN")
        .map(SecretString::from)
        .map_err(|_| WatchError::MissingEnvVar("SWIFTBITE_ADMIN_TOKEN"))
}

async fn fetch(
    client: &reqwest::Client,
    url: &Url,
    token: Option<&SecretString>,
) -> Result<Value, reqwest::Error> {
    let mut request = client.get(url.clone());
    if let Some(token) = token {
        request = request.bearer_auth(token.expose_secret());
    }
    request.send().await?.error_for_status()?.json().await
}

/// Poll `view` until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the base URL is invalid, the admin token is missing
/// for the admin board, or the HTTP client can't be built. Failed polls are
/// logged and skipped.
pub async fn run(api_url: &str, view: View) -> Result<(), WatchError> {
    let url = Url::parse(api_url)?.join(&view.path())?;
    let token = if view.needs_admin() {
        Some(admin_token()?)
    } else {
        None
    };
    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let period = view.target().interval();
    tracing::info!(%url, period_secs = period.as_secs(), "Watching");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let (client, url, token) = (&client, &url, token.as_ref());
    poll_until(&mut ticker, tokio::signal::ctrl_c(), move || async move {
        match fetch(client, url, token).await {
            Ok(body) => tracing::info!("\n{}", view.render(&body)),
            Err(e) => tracing::warn!(error = %e, "Refresh failed, waiting for next tick"),
        }
    })
    .await;

    tracing::info!("Stopped watching");
    Ok(())
}

/// Run `refresh` on every tick until `stop` resolves.
///
/// `stop` is polled for the whole run, including while a refresh is in
/// flight, so a shutdown request interrupts a slow fetch.
async fn poll_until<S, F, Fut>(ticker: &mut Interval, stop: S, mut refresh: F)
where
    S: Future,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::pin!(stop);
    loop {
        tokio::select! {
            _ = &mut stop => return,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            _ = &mut stop => return,
            () = refresh() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_an_in_flight_refresh() {
        let mut ticker = tokio::time::interval(Duration::from_secs(3));
        let started = AtomicUsize::new(0);
        let counter = &started;

        let stop = tokio::time::sleep(Duration::from_secs(1));
        let finished = tokio::time::timeout(
            Duration::from_secs(2),
            poll_until(&mut ticker, stop, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(60)).await;
            }),
        )
        .await;

        assert!(finished.is_ok());
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_on_each_tick_until_stopped() {
        let mut ticker = tokio::time::interval(Duration::from_secs(3));
        let count = AtomicUsize::new(0);
        let counter = &count;

        let stop = tokio::time::sleep(Duration::from_secs(7));
        poll_until(&mut ticker, stop, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        // Ticks at 0s, 3s and 6s.
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn views_use_their_poll_intervals() {
        assert_eq!(
            View::DriverQueue { driver_id: 1 }.target().interval(),
            Duration::from_secs(3)
        );
        assert_eq!(View::AdminBoard.target().interval(), Duration::from_secs(5));
        assert_eq!(
            View::Track { order_id: 1 }.target().interval(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn paths_match_api_routes() {
        assert_eq!(
            View::DriverQueue { driver_id: 7 }.path(),
            "/api/drivers/7/available-orders"
        );
        assert_eq!(View::Track { order_id: 42 }.path(), "/api/orders/42/track");
        assert!(View::AdminBoard.needs_admin());
        assert!(!View::Track { order_id: 42 }.needs_admin());
    }

    #[test]
    fn base_url_path_is_replaced() {
        let url = Url::parse("http://api.local:3000/ignored")
            .and_then(|u| u.join(&View::AdminBoard.path()));
        assert_eq!(
            url.map(String::from).ok().as_deref(),
            Some("http://api.local:3000/api/admin/stats")
        );
    }

    #[test]
    fn empty_queue_renders_placeholder() {
        let view = View::DriverQueue { driver_id: 1 };
        assert_eq!(view.render(&json!([])), "No orders waiting");
        assert_eq!(view.render(&json!({"error": "oops"})), "No orders waiting");
    }

    #[test]
    fn queue_lists_each_order() {
        let body = json!([
            {"id": 5, "orderNumber": "SB-20261018-000123", "totalAmount": "50.00", "deliveryAddress": "12 Nile St"},
            {"id": 6, "orderNumber": "SB-20261018-000124", "totalAmount": "18.50", "deliveryAddress": null},
        ]);
        let rendered = View::DriverQueue { driver_id: 1 }.render(&body);
        assert!(rendered.starts_with("2 order(s) waiting"));
        assert!(rendered.contains("#5 SB-20261018-000123 total 50.00 -> 12 Nile St"));
        assert!(rendered.contains("#6 SB-20261018-000124 total 18.50 -> -"));
    }

    #[test]
    fn tracking_shows_status_driver_and_history() {
        let body = json!({
            "order": {"orderNumber": "SB-20261018-000001", "status": "on_way"},
            "driver": {"name": "Omar", "currentLocation": "Zamalek"},
            "tracking": [
                {"createdAt": "t1", "status": "pending", "message": "Order placed"},
                {"createdAt": "t2", "status": "on_way", "message": "On the way"},
            ],
        });
        let rendered = View::Track { order_id: 1 }.render(&body);
        assert!(rendered.starts_with("Order SB-20261018-000001 is on_way | driver Omar (Zamalek)"));
        assert_eq!(rendered.lines().count(), 3);
    }

    #[test]
    fn board_lists_status_counts() {
        let body = json!({
            "ordersByStatus": {"pending": 2, "delivered": 9},
            "todayOrders": 11,
            "todayRevenue": "412.00",
            "availableDrivers": 3,
        });
        let rendered = View::AdminBoard.render(&body);
        assert!(rendered.starts_with("Today: 11 orders, revenue 412.00 | available drivers: 3"));
        assert!(rendered.contains("pending"));
        assert!(rendered.contains("delivered"));
    }
}
