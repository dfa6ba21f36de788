//! Gateway configuration, loadable from JSON. Missing fields take their
//! default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Largest plaintext width the discrete-log search is allowed to cover.
pub const MAX_SEARCHABLE_BITS: u8 = 48;

/// Largest baby-step table. Each entry costs roughly 40 bytes, so 24 bits
/// is already several hundred MiB.
pub const MAX_TABLE_BITS: u8 = 24;

/// Giant steps one decrypt request may need in the worst case, summed over
/// its handles. Keeps a full request well inside the default timeout.
pub const MAX_GIANT_STEPS_PER_REQUEST: u64 = 1 << 22;

/// Caller-owned retry policy for transient failures (timeouts, service down).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly after that.
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 200,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(attempt as u64))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Per-request deadline applied by the client.
    pub request_timeout_ms: u64,
    pub retry: RetryPolicy,
    /// Upper bound on handles in one decrypt authorization.
    pub max_handles_per_request: usize,
    /// Upper bound on an authorization's validity window, in days.
    pub max_validity_days: u32,
    /// log2 of the baby-step table used for plaintext recovery.
    pub dlog_table_bits: u8,
    /// Plaintexts at or above `2^max_plaintext_bits` are reported out of range.
    pub max_plaintext_bits: u8,
    /// Capacity of the service request queue.
    pub channel_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            retry: RetryPolicy::default(),
            max_handles_per_request: 4,
            max_validity_days: 365,
            dlog_table_bits: 20,
            max_plaintext_bits: 40,
            channel_capacity: 64,
        }
    }
}

impl GatewayConfig {
    pub fn from_json(raw: &str) -> Result<Self, GatewayError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.max_plaintext_bits == 0 || self.max_plaintext_bits > MAX_SEARCHABLE_BITS {
            return Err(GatewayError::InvalidConfig("max_plaintext_bits must be in 1..=48"));
        }
        if self.dlog_table_bits == 0 || self.dlog_table_bits > self.max_plaintext_bits {
            return Err(GatewayError::InvalidConfig(
                "dlog_table_bits must be in 1..=max_plaintext_bits",
            ));
        }
        if self.dlog_table_bits > MAX_TABLE_BITS {
            return Err(GatewayError::InvalidConfig("dlog_table_bits must be at most 24"));
        }
        if self.retry.max_attempts == 0 {
            return Err(GatewayError::InvalidConfig("retry.max_attempts must be positive"));
        }
        if self.channel_capacity == 0 {
            return Err(GatewayError::InvalidConfig("channel_capacity must be positive"));
        }
        if self.max_handles_per_request == 0 || self.max_validity_days == 0 {
            return Err(GatewayError::InvalidConfig("request limits must be positive"));
        }
        if self.worst_case_giant_steps() > MAX_GIANT_STEPS_PER_REQUEST {
            return Err(GatewayError::InvalidConfig(
                "max_handles_per_request * 2^(max_plaintext_bits - dlog_table_bits) exceeds 2^22",
            ));
        }
        Ok(())
    }

    /// Giant steps a request at the handle limit needs when every plaintext
    /// sits at the top of the range.
    pub fn worst_case_giant_steps(&self) -> u64 {
        let per_handle = 1u64 << self.max_plaintext_bits.saturating_sub(self.dlog_table_bits);
        per_handle.saturating_mul(self.max_handles_per_request as u64)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
