pub mod history;
pub mod response_cache;
pub mod schema;
pub mod store;

pub use history::HistoryStore;
pub use response_cache::ResponseCache;
pub use store::Store;
