pub mod article;
pub mod notification;
pub mod seen;
pub mod source;

pub use article::Article;
pub use notification::Notification;
pub use seen::SeenRecord;
pub use source::{FeedConfig, SourceConfig};
