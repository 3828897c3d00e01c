/// Database models for TaskTrack
///
/// # Models
///
/// - `user`: User accounts, registration with first-user-admin promotion
/// - `task`: Personal to-do items, every query scoped to the owning user
/// - `setting`: Global key/value settings, including the JWT signing secret
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::models::task::{NewTask, Task, TaskPriority};
/// use tasktrack_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, 1, NewTask {
///     title: "Water the plants".to_string(),
///     description: String::new(),
///     priority: TaskPriority::Low,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod setting;
pub mod task;
pub mod user;
