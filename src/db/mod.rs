pub mod postgres;
pub mod snapshot;
pub mod store;

pub use postgres::{create_pool, run_migrations};
pub use snapshot::Snapshot;
pub use store::{PgStore, RecommendationStore, ResultFilter};
