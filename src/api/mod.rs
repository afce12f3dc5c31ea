pub mod client;
pub mod statistics;

pub use client::{DonateStatus, ScavengerClient};
pub use statistics::{StatisticsResponse, WalletStatistics, NIGHT_DIVISOR};

#[cfg(test)]
pub(crate) mod mock {
    //! In-process stand-in for the Scavenger API.

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone)]
    pub enum StatsReply {
        Json(serde_json::Value),
        Status(u16),
        Raw(&'static str),
    }

    #[derive(Clone)]
    pub enum DonateReply {
        Ok,
        Conflict,
        Error(u16, Option<&'static str>),
    }

    /// A recorded donate_to call
    #[derive(Debug, Clone, PartialEq)]
    pub struct DonateCall {
        pub destination: String,
        pub source: String,
        pub signature: String,
    }

    #[derive(Default)]
    struct MockState {
        stats: HashMap<String, StatsReply>,
        donate: HashMap<String, DonateReply>,
        calls: Vec<DonateCall>,
        stats_hits: usize,
        stats_delay: Option<Duration>,
        in_flight: usize,
        peak_in_flight: usize,
    }

    #[derive(Clone)]
    pub struct MockApi {
        state: Arc<Mutex<MockState>>,
        pub base_url: String,
    }

    impl MockApi {
        pub async fn start() -> Self {
            let state = Arc::new(Mutex::new(MockState::default()));
            let app = Router::new()
                .route("/statistics/:address", get(statistics))
                .route("/donate_to/:destination/:source/:signature", post(donate))
                .with_state(state.clone());

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                state,
                base_url: format!("http://{}", addr),
            }
        }

        /// Report `night` whole NIGHT and `receipts` receipts for an address.
        pub fn set_balance(&self, address: &str, night: f64, receipts: u64) {
            let raw = format!("{}", (night * 1_000_000.0).round() as u64);
            self.set_stats(
                address,
                StatsReply::Json(serde_json::json!({
                    "local": { "night_allocation": raw, "crypto_receipts": receipts }
                })),
            );
        }

        pub fn set_stats(&self, address: &str, reply: StatsReply) {
            self.state.lock().unwrap().stats.insert(address.to_string(), reply);
        }

        pub fn set_donate(&self, source: &str, reply: DonateReply) {
            self.state.lock().unwrap().donate.insert(source.to_string(), reply);
        }

        pub fn calls(&self) -> Vec<DonateCall> {
            self.state.lock().unwrap().calls.clone()
        }

        pub fn stats_hits(&self) -> usize {
            self.state.lock().unwrap().stats_hits
        }

        /// Hold every statistics reply for `delay` so concurrent lookups overlap.
        pub fn set_stats_delay(&self, delay: Duration) {
            self.state.lock().unwrap().stats_delay = Some(delay);
        }

        /// Most statistics requests that were being served at the same time
        pub fn peak_in_flight(&self) -> usize {
            self.state.lock().unwrap().peak_in_flight
        }
    }

    async fn statistics(
        State(state): State<Arc<Mutex<MockState>>>,
        Path(address): Path<String>,
    ) -> Response {
        let (reply, delay) = {
            let mut state = state.lock().unwrap();
            state.stats_hits += 1;
            state.in_flight += 1;
            state.peak_in_flight = state.peak_in_flight.max(state.in_flight);
            (state.stats.get(&address).cloned(), state.stats_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        state.lock().unwrap().in_flight -= 1;

        match reply {
            Some(StatsReply::Json(body)) => Json(body).into_response(),
            Some(StatsReply::Status(code)) => StatusCode::from_u16(code).unwrap().into_response(),
            Some(StatsReply::Raw(body)) => (StatusCode::OK, body).into_response(),
            None => Json(serde_json::json!({ "local": {} })).into_response(),
        }
    }

    async fn donate(
        State(state): State<Arc<Mutex<MockState>>>,
        Path((destination, source, signature)): Path<(String, String, String)>,
    ) -> Response {
        let reply = {
            let mut state = state.lock().unwrap();
            state.calls.push(DonateCall {
                destination,
                source: source.clone(),
                signature,
            });
            state.donate.get(&source).cloned().unwrap_or(DonateReply::Ok)
        };
        match reply {
            DonateReply::Ok => Json(serde_json::json!({ "status": "ok" })).into_response(),
            DonateReply::Conflict => StatusCode::CONFLICT.into_response(),
            DonateReply::Error(code, Some(message)) => (
                StatusCode::from_u16(code).unwrap(),
                Json(serde_json::json!({ "message": message })),
            )
                .into_response(),
            DonateReply::Error(code, None) => StatusCode::from_u16(code).unwrap().into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{DonateReply, MockApi, StatsReply};
    use super::*;
    use crate::config::ConsolidateConfig;
    use crate::error::ApiError;
    use std::time::Duration;

    fn client_for(mock: &MockApi) -> ScavengerClient {
        let config = ConsolidateConfig {
            api_base: mock.base_url.clone(),
            statistics_timeout: Duration::from_secs(2),
            donate_timeout: Duration::from_secs(2),
            ..ConsolidateConfig::default()
        };
        ScavengerClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_statistics() {
        let mock = MockApi::start().await;
        mock.set_balance("addr1alice", 12.5, 4);
        let client = client_for(&mock);

        let stats = client.fetch_statistics("addr1alice").await.unwrap();
        assert_eq!(stats, WalletStatistics { night: 12.5, receipts: 4 });

        let unknown = client.fetch_statistics("addr1nobody").await.unwrap();
        assert_eq!(unknown, WalletStatistics::default());
    }

    #[tokio::test]
    async fn test_fetch_statistics_errors() {
        let mock = MockApi::start().await;
        mock.set_stats("addr1down", StatsReply::Status(503));
        mock.set_stats("addr1junk", StatsReply::Raw("<html>oops</html>"));
        let client = client_for(&mock);

        assert!(matches!(
            client.fetch_statistics("addr1down").await,
            Err(ApiError::Status { status: 503, .. })
        ));
        assert!(matches!(
            client.fetch_statistics("addr1junk").await,
            Err(ApiError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_donate_statuses() {
        let mock = MockApi::start().await;
        mock.set_donate("addr1dup", DonateReply::Conflict);
        mock.set_donate("addr1bad", DonateReply::Error(400, Some("Invalid signature")));
        mock.set_donate("addr1boom", DonateReply::Error(500, None));
        let client = client_for(&mock);

        assert_eq!(
            client.donate_to("addr1dest", "addr1ok", "a1b2").await.unwrap(),
            DonateStatus::Accepted
        );
        assert_eq!(
            client.donate_to("addr1dest", "addr1dup", "a1b2").await.unwrap(),
            DonateStatus::AlreadyProcessed
        );

        match client.donate_to("addr1dest", "addr1bad", "a1b2").await {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid signature");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        match client.donate_to("addr1dest", "addr1boom", "a1b2").await {
            Err(e) => assert_eq!(e.to_string(), "Request failed with status code 500"),
            Ok(status) => panic!("unexpected success: {:?}", status),
        }

        let calls = mock.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].destination, "addr1dest");
        assert_eq!(calls[0].source, "addr1ok");
        assert_eq!(calls[0].signature, "a1b2");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let config = ConsolidateConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            statistics_timeout: Duration::from_millis(500),
            ..ConsolidateConfig::default()
        };
        let client = ScavengerClient::new(&config).unwrap();
        assert!(matches!(
            client.fetch_statistics("addr1x").await,
            Err(ApiError::Http(_))
        ));
    }
}
