//! Simulator configuration

use ril_proto::SignalStrength;
use serde::{Deserialize, Serialize};

/// Configuration for one simulator instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Maximum number of live calls across all states.
    pub max_active_calls: usize,
    /// Maximum parties in a single conference.
    pub max_connections_per_call: usize,
    /// Delay before an automatically progressing dial turns to alerting.
    pub dial_alert_delay_ms: i64,
    /// Delay before an automatically progressing dial turns to active.
    pub dial_active_delay_ms: i64,
    /// Interval between ring notifications for an unanswered incoming call.
    pub call_ring_period_ms: i64,
    /// Interval between unsolicited signal-strength reports; 0 disables them.
    pub signal_report_period_ms: i64,
    /// Initial per-technology signal readings.
    pub signal: SignalStrength,
    /// Operator long alphanumeric name.
    pub operator_long_name: String,
    /// Operator short alphanumeric name.
    pub operator_short_name: String,
    /// Mobile country code.
    pub mcc: String,
    /// Mobile network code.
    pub mnc: String,
    /// Mobile subscriber number (IMSI = MCC + MNC + MSN).
    pub msn: String,
    pub imei: String,
    pub imeisv: String,
    pub baseband_version: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_active_calls: 7,
            max_connections_per_call: 5,
            dial_alert_delay_ms: 1_000,
            dial_active_delay_ms: 2_000,
            call_ring_period_ms: 3_000,
            signal_report_period_ms: 60_000,
            signal: SignalStrength::default(),
            operator_long_name: "Simulated Network".to_string(),
            operator_short_name: "SimNet".to_string(),
            mcc: "310".to_string(),
            mnc: "260".to_string(),
            msn: "123456789".to_string(),
            imei: "123456789012345".to_string(),
            imeisv: "00".to_string(),
            baseband_version: "mock-modem 0.4".to_string(),
        }
    }
}

impl SimConfig {
    /// IMSI string reported by the SIM subsystem.
    pub fn imsi(&self) -> String {
        format!("{}{}{}", self.mcc, self.mnc, self.msn)
    }

    /// Numeric operator code (MCC+MNC).
    pub fn mcc_mnc(&self) -> String {
        format!("{}{}", self.mcc, self.mnc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = SimConfig::default();
        assert_eq!(config.dial_alert_delay_ms, 1_000);
        assert_eq!(config.dial_active_delay_ms, 2_000);
        assert!(config.max_connections_per_call <= config.max_active_calls);
    }

    #[test]
    fn test_imsi_concatenation() {
        let config = SimConfig::default();
        assert_eq!(config.imsi(), "310260123456789");
        assert_eq!(config.mcc_mnc(), "310260");
    }
}
