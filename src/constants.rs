//! # System Constants
//!
//! Broker topology names, event types, and the statistics/reminder policy
//! constants shared by every service built on this core.
//!
//! The string values are wire-visible and must stay aligned with the other
//! services attached to the same broker.

/// Broker topology: exchanges, queues, and binding patterns.
///
/// Routing keys follow the `<domain>.<action>` taxonomy; consumers bind with
/// `<domain>.#` so new actions within a domain reach them without redeploys.
pub mod topology {
    // Exchanges (topic kind, durable)
    pub const CYCLE_EXCHANGE: &str = "cycle_events";
    pub const PREDICTION_EXCHANGE: &str = "prediction_events";

    // Queues (durable)
    pub const CYCLE_QUEUE: &str = "new_cycle_data";
    pub const ANALYTICS_CYCLE_QUEUE: &str = "analytics_cycle_queue";
    pub const NOTIFICATION_PREDICTION_QUEUE: &str = "notification_prediction_queue";

    // Binding patterns
    pub const CYCLE_NEW_BINDING: &str = "cycle.new";
    pub const CYCLE_ALL_BINDING: &str = "cycle.#";
    pub const PREDICTION_ALL_BINDING: &str = "prediction.#";
}

/// Event routing keys and envelope type tags.
pub mod events {
    // Routing keys
    pub const CYCLE_NEW: &str = "cycle.new";
    pub const PREDICTION_NEW: &str = "prediction.new";

    // Envelope `event_type` tags
    pub const NEW_CYCLE_DATA: &str = "new_cycle_data";
    pub const NEW_PREDICTION: &str = "new_prediction";
}

/// Statistics policy: fixed constants, not tunables.
pub mod statistics {
    /// Assumed cycle length in days when a user has no measured cycles yet.
    pub const DEFAULT_CYCLE_LENGTH_DAYS: f64 = 28.0;

    /// Number of most recent measured cycles considered by the engine.
    pub const CYCLE_WINDOW: usize = 6;

    /// Minimum analytics rows before predictions are generated.
    pub const MIN_CYCLES_FOR_PREDICTION: usize = 2;

    /// Variance below this bound classifies as very regular.
    pub const VERY_REGULAR_VARIANCE_BOUND: f64 = 2.0;

    /// Variance below this bound (and above the very-regular bound)
    /// classifies as regular.
    pub const REGULAR_VARIANCE_BOUND: f64 = 5.0;

    pub const VERY_REGULAR_CONFIDENCE: f64 = 0.9;
    pub const REGULAR_CONFIDENCE: f64 = 0.75;
    pub const IRREGULAR_CONFIDENCE: f64 = 0.6;

    /// Insight bounds on healthy average cycle length, in days.
    pub const SHORT_CYCLE_BOUND: f64 = 21.0;
    pub const LONG_CYCLE_BOUND: f64 = 35.0;

    /// Insight bound on mean period length, in days.
    pub const LONG_PERIOD_BOUND: f64 = 7.0;
}

/// Reminder scheduling policy.
pub mod reminders {
    /// Lead time used when a user has not configured one.
    pub const DEFAULT_DAYS_BEFORE: i64 = 3;

    /// Permitted lead-time range, inclusive.
    pub const MIN_DAYS_BEFORE: i64 = 1;
    pub const MAX_DAYS_BEFORE: i64 = 7;

    pub const PERIOD_REMINDER_TITLE: &str = "Period Reminder";
}

/// System-wide constants.
pub mod system {
    /// Version compatibility marker
    pub const LUNARA_CORE_VERSION: &str = "0.1.0";

    /// Connection names advertised to the broker, one per service role.
    pub const ANALYTICS_SERVICE_NAME: &str = "lunara-analytics";
    pub const NOTIFICATION_SERVICE_NAME: &str = "lunara-notifications";
    pub const CYCLE_SERVICE_NAME: &str = "lunara-cycles";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_keys_follow_domain_action_taxonomy() {
        for key in [events::CYCLE_NEW, events::PREDICTION_NEW] {
            let parts: Vec<&str> = key.split('.').collect();
            assert_eq!(parts.len(), 2, "routing key {key} must be domain.action");
            assert!(parts.iter().all(|p| !p.is_empty()));
        }
    }

    #[test]
    fn test_consumer_bindings_cover_their_domain() {
        assert!(topology::CYCLE_ALL_BINDING.starts_with("cycle."));
        assert!(topology::CYCLE_ALL_BINDING.ends_with('#'));
        assert!(topology::PREDICTION_ALL_BINDING.starts_with("prediction."));
        assert!(topology::PREDICTION_ALL_BINDING.ends_with('#'));
    }

    #[test]
    fn test_regularity_bounds_are_ordered() {
        assert!(statistics::VERY_REGULAR_VARIANCE_BOUND < statistics::REGULAR_VARIANCE_BOUND);
        assert!(statistics::VERY_REGULAR_CONFIDENCE > statistics::REGULAR_CONFIDENCE);
        assert!(statistics::REGULAR_CONFIDENCE > statistics::IRREGULAR_CONFIDENCE);
    }

    #[test]
    fn test_reminder_bounds_contain_default() {
        assert!(reminders::MIN_DAYS_BEFORE <= reminders::DEFAULT_DAYS_BEFORE);
        assert!(reminders::DEFAULT_DAYS_BEFORE <= reminders::MAX_DAYS_BEFORE);
    }
}
