pub mod metrics;

pub use metrics::{get_metrics, render_metrics, Metrics};
