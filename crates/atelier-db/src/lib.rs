pub mod pool;
pub mod repos;

// Re-export commonly used items
pub use pool::{create_pool, run_migrations};
pub use repos::analytics::{
    AnalyticsRepo, CategoryCountRow, RecentComponentRow, TopViewedRow, TrendRow,
};
pub use repos::component::{
    AdminListParams, ComponentRepo, ComponentRow, ComponentUpdate, NewComponent,
};
pub use repos::feedback::{FeedbackRepo, FeedbackRow};
pub use repos::user::{UserRepo, UserRow};
