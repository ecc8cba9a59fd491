pub mod analytics;
pub mod cycle;
pub mod notification;
pub mod prediction;
pub mod preference;

// Re-export core models for easy access
pub use analytics::{CycleAnalytics, NewCycleAnalytics};
pub use cycle::{CycleRecord, SymptomRecord};
pub use notification::{NewNotification, Notification, NotificationKind, NotificationStatus};
pub use prediction::{NewPrediction, Prediction, PredictionMethod};
pub use preference::{NotificationPreference, PreferenceUpdate};
