//! Basic example of the beans registry.

use beans::prelude::*;
use std::sync::Mutex;

// === Define your capabilities and implementations ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

#[derive(Default)]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

/// Collects messages instead of printing them.
#[derive(Default)]
struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl Logger for MemoryLogger {
    fn log(&self, msg: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(msg.to_owned());
        }
    }
}

trait Database: Send + Sync {
    fn query(&self, sql: &str) -> String;
}

struct Postgres {
    url: &'static str,
    logger: Bean<dyn Logger>,
}

impl Postgres {
    fn connect(url: &'static str) -> Result<Self> {
        Ok(Self {
            url,
            logger: Bean::new()?,
        })
    }
}

impl Database for Postgres {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserService {
    db: Bean<dyn Database>,
    logger: Bean<dyn Logger>,
}

impl UserService {
    fn new() -> Result<Self> {
        Ok(Self {
            db: Bean::new()?,
            logger: Bean::new()?,
        })
    }

    fn get_user(&self, id: u64) -> String {
        self.logger.log(&format!("Getting user {id}"));
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("beans_registry=debug")
        .init();

    // Logger: a fresh ConsoleLogger per handle
    beans::register_implementation!(dyn Logger => ConsoleLogger);

    // Database: one shared connection, built once its logger is bound
    let db: &'static Postgres = Box::leak(Box::new(Postgres::connect("postgres://localhost/myapp")?));
    register_instance::<dyn Database>(db);

    println!("{:?}", Registry::global());

    let service = UserService::new()?;
    println!("{}", service.get_user(42));

    // === Override the logger for a while ===
    let memory: &'static MemoryLogger = Box::leak(Box::default());
    {
        let _session = Session::open();
        register_instance::<dyn Logger>(memory);

        let quiet = UserService::new()?;
        quiet.get_user(7);
    }
    // session closed: the console logger is back
    println!("Captured while overridden: {:?}", memory.lines.lock().map(|l| l.clone()));

    // === Nothing bound for this one ===
    trait Mailer: Send + Sync {}
    if let Err(err) = Bean::<dyn Mailer>::new() {
        println!("{err}");
    }

    Ok(())
}
