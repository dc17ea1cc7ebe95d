pub mod json_store;
pub mod traits;

pub use json_store::JsonSeenStore;
pub use traits::SeenStore;
