//! Basic example of the Kiln container.
//!
//! Run with `RUST_LOG=kiln_container=debug` to watch the build passes.

use std::sync::Arc;

use kiln::prelude::*;
use tracing_subscriber::EnvFilter;

// === Define your traits and types ===

pub trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

#[derive(kiln::Component)]
#[component(implements(Logger))]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

#[derive(kiln::Component)]
struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

#[derive(kiln::Component)]
struct UserRepository {
    db: Arc<Database>,
}

#[derive(kiln::Component)]
struct UserService {
    repo: Arc<UserRepository>,
    logger: Arc<dyn Logger>,
    #[component(optional, hint = 50)]
    page_size: u32,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.logger
            .log(&format!("Getting user {id} (page size {})", self.page_size));
        self.repo
            .db
            .query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kiln_container=info")),
        )
        .init();

    let mut container =
        Container::new().with_settings(Settings::default().auto_wiring(true).annotations(true));

    // Registration order does not matter; the build retries until it settles.
    container.register("UserService", Hints::new())?;
    container.register("UserRepository", Hints::new())?;
    container.register(
        "Database",
        Hints::new().with(0, Hint::text("postgres://localhost/myapp")),
    )?;
    container.register("ConsoleLogger", Hints::new())?;

    container.build()?;
    println!("✅ Container built successfully!");
    println!("{container:?}");

    let service: Arc<UserService> = container.get("UserService")?;
    println!("👤 {}", service.get_user(42));

    // A dependency cycle stalls the build instead of looping forever.
    container.register(
        "Database",
        Hints::new()
            .with(0, Hint::text("postgres://localhost/myapp"))
            .with(1, "UserService"),
    )?;
    if let Err(error) = container.build() {
        println!("\n⚠️  {error}");
    }

    Ok(())
}
