/// Common test utilities and fixtures
use anyhow::Result;
use std::sync::Arc;
use wavecast_storage::Database;

/// Create a test database with migrations applied
pub async fn create_test_database() -> Result<Arc<Database>> {
    // Private in-memory database per test
    let db = Database::in_memory().await?;
    Ok(Arc::new(db))
}

/// Test user credentials
pub mod fixtures {
    pub const TEST_USERNAME: &str = "testuser";
    pub const TEST_PASSWORD: &str = "TestPassword123!";

    pub const OTHER_USERNAME: &str = "otheruser";
    pub const OTHER_PASSWORD: &str = "OtherPassword456!";
}
