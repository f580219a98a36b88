use serde::{Deserialize, Serialize};

/// Severity of an approaching expiry, from days remaining.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpirySeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ExpirySeverity {
    /// CRITICAL <= 7 days, HIGH <= 15, MEDIUM <= 30, LOW beyond.
    ///
    /// Only meaningful for licenses that are not yet expired; expired
    /// licenses are counted separately, not classified here.
    pub fn classify(days_until_expiry: i64) -> Self {
        if days_until_expiry <= 7 {
            ExpirySeverity::Critical
        } else if days_until_expiry <= 15 {
            ExpirySeverity::High
        } else if days_until_expiry <= 30 {
            ExpirySeverity::Medium
        } else {
            ExpirySeverity::Low
        }
    }
}

/// Severity of capacity pressure, from a utilization percentage.
///
/// Alerting scale: CRITICAL >= 95, HIGH >= 90, WARNING >= 75. This is
/// intentionally not the inline 90/70 status scale of the utilization
/// readout; the two feed different call sites and stay separate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageSeverity {
    Critical,
    High,
    Warning,
    Normal,
}

impl UsageSeverity {
    pub fn classify(usage_percentage: f64) -> Self {
        if usage_percentage >= 95.0 {
            UsageSeverity::Critical
        } else if usage_percentage >= 90.0 {
            UsageSeverity::High
        } else if usage_percentage >= 75.0 {
            UsageSeverity::Warning
        } else {
            UsageSeverity::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_boundaries_are_exact() {
        assert_eq!(ExpirySeverity::classify(0), ExpirySeverity::Critical);
        assert_eq!(ExpirySeverity::classify(7), ExpirySeverity::Critical);
        assert_eq!(ExpirySeverity::classify(8), ExpirySeverity::High);
        assert_eq!(ExpirySeverity::classify(15), ExpirySeverity::High);
        assert_eq!(ExpirySeverity::classify(16), ExpirySeverity::Medium);
        assert_eq!(ExpirySeverity::classify(30), ExpirySeverity::Medium);
        assert_eq!(ExpirySeverity::classify(31), ExpirySeverity::Low);
    }

    #[test]
    fn usage_boundaries_are_exact() {
        assert_eq!(UsageSeverity::classify(74.99), UsageSeverity::Normal);
        assert_eq!(UsageSeverity::classify(75.0), UsageSeverity::Warning);
        assert_eq!(UsageSeverity::classify(89.99), UsageSeverity::Warning);
        assert_eq!(UsageSeverity::classify(90.0), UsageSeverity::High);
        assert_eq!(UsageSeverity::classify(94.99), UsageSeverity::High);
        assert_eq!(UsageSeverity::classify(95.0), UsageSeverity::Critical);
        assert_eq!(UsageSeverity::classify(120.0), UsageSeverity::Critical);
    }

    #[test]
    fn the_two_utilization_scales_disagree_between_70_and_75() {
        // 72% is a WARNING on the inline readout scale but NORMAL here.
        assert_eq!(UsageSeverity::classify(72.0), UsageSeverity::Normal);
        // 80% happens to be WARNING on both.
        assert_eq!(UsageSeverity::classify(80.0), UsageSeverity::Warning);
    }
}
