//! Shared test doubles for the failover and balancer suites.


pub(crate) use mock_provider::{MockProvider, RecordingMetrics};
