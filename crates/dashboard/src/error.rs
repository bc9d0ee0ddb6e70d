use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("No owner with ID {0}")]
    OwnerNotFound(uuid::Uuid),
}
