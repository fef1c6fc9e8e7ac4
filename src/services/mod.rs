// Service exports
pub mod cache;
pub mod pooling;
pub mod postgres;
pub mod providers;
pub mod repository;
pub mod trip_service;
pub mod user_service;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use pooling::{PoolLimits, PoolingService};
pub use postgres::{PostgresError, PostgresPoolRepository};
pub use providers::{Cached, ClientError, ProfileSource, TripSource};
pub use repository::{InMemoryPoolRepository, PoolRepository};
pub use trip_service::TripServiceClient;
pub use user_service::UserServiceClient;
