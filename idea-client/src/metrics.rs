use std::time::Duration;
use tokio::sync::RwLock;

/// The upstream calls the gateway makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamCall {
    GenerateIdentifier,
    FetchRecord,
    Ping,
}

/// One finished upstream call. `status_code` is `None` when no response
/// arrived.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub call: UpstreamCall,
    pub status_code: Option<u16>,
    pub latency: Duration,
}

impl CallOutcome {
    fn succeeded(&self) -> bool {
        matches!(self.status_code, Some(code) if (200..300).contains(&code))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallStats {
    pub calls: u64,
    pub failures: u64,
    pub rate_limited: u64,
    pub total_latency: Duration,
    pub last_status_code: Option<u16>,
}

impl CallStats {
    fn record(&mut self, outcome: &CallOutcome) {
        self.calls += 1;
        self.total_latency += outcome.latency;
        self.last_status_code = outcome.status_code;

        if !outcome.succeeded() {
            self.failures += 1;
        }
        if outcome.status_code == Some(429) {
            self.rate_limited += 1;
        }
    }

    pub fn mean_latency(&self) -> Duration {
        match u32::try_from(self.calls) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(calls) => self.total_latency / calls,
        }
    }
}

/// Per-call statistics for one gateway.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    pub generate_identifier: CallStats,
    pub fetch_record: CallStats,
    pub ping: CallStats,
}

impl ApiMetrics {
    pub fn stats(&self, call: UpstreamCall) -> &CallStats {
        match call {
            UpstreamCall::GenerateIdentifier => &self.generate_identifier,
            UpstreamCall::FetchRecord => &self.fetch_record,
            UpstreamCall::Ping => &self.ping,
        }
    }

    fn stats_mut(&mut self, call: UpstreamCall) -> &mut CallStats {
        match call {
            UpstreamCall::GenerateIdentifier => &mut self.generate_identifier,
            UpstreamCall::FetchRecord => &mut self.fetch_record,
            UpstreamCall::Ping => &mut self.ping,
        }
    }

    fn all(&self) -> [&CallStats; 3] {
        [&self.generate_identifier, &self.fetch_record, &self.ping]
    }

    pub fn total_requests(&self) -> u64 {
        self.all().iter().map(|stats| stats.calls).sum()
    }

    pub fn failed_requests(&self) -> u64 {
        self.all().iter().map(|stats| stats.failures).sum()
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            (total - self.failed_requests()) as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: RwLock<ApiMetrics>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, outcome: CallOutcome) {
        let mut metrics = self.metrics.write().await;
        metrics.stats_mut(outcome.call).record(&outcome);
    }

    pub async fn snapshot(&self) -> ApiMetrics {
        self.metrics.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(call: UpstreamCall, status_code: Option<u16>, millis: u64) -> CallOutcome {
        CallOutcome {
            call,
            status_code,
            latency: Duration::from_millis(millis),
        }
    }

    #[tokio::test]
    async fn test_outcomes_are_kept_per_call() {
        let collector = MetricsCollector::new();

        collector
            .record(outcome(UpstreamCall::GenerateIdentifier, Some(200), 100))
            .await;
        collector
            .record(outcome(UpstreamCall::GenerateIdentifier, None, 300))
            .await;
        collector
            .record(outcome(UpstreamCall::FetchRecord, Some(429), 50))
            .await;

        let metrics = collector.snapshot().await;
        let generate = metrics.stats(UpstreamCall::GenerateIdentifier);
        assert_eq!(generate.calls, 2);
        assert_eq!(generate.failures, 1);
        assert_eq!(generate.mean_latency(), Duration::from_millis(200));
        assert_eq!(generate.last_status_code, None);

        assert_eq!(metrics.fetch_record.rate_limited, 1);
        assert_eq!(metrics.ping.calls, 0);
        assert_eq!(metrics.ping.mean_latency(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_totals() {
        let collector = MetricsCollector::new();
        assert_eq!(collector.snapshot().await.success_rate(), 0.0);

        collector
            .record(outcome(UpstreamCall::FetchRecord, Some(200), 10))
            .await;
        collector
            .record(outcome(UpstreamCall::Ping, Some(502), 10))
            .await;

        let metrics = collector.snapshot().await;
        assert_eq!(metrics.total_requests(), 2);
        assert_eq!(metrics.failed_requests(), 1);
        assert_eq!(metrics.success_rate(), 0.5);
    }
}
