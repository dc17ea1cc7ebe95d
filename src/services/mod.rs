pub mod dedup_service;
pub mod export_service;
pub mod fetch_service;
pub mod notification_service;
pub mod pipeline_service;

pub use dedup_service::DedupService;
pub use export_service::CsvExporter;
pub use fetch_service::FetchService;
pub use notification_service::{DeliveryReport, NotificationService, Notifier};
pub use pipeline_service::{PipelineService, RunReport, SourceOutcome, Stage};
