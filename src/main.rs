use application::api::{person::PersonController, router::MainRouter};
use config::AppConfig;
use domain::person::PersonRulesValidator;
use dotenv::dotenv;
use infrastructure::person::memory::memory_repository::InMemoryPersonRepository;
use tokio::runtime::Runtime;

mod application;
mod config;
mod domain;
mod infrastructure;
mod logging;

fn main() {
    dotenv().ok();
    // Check of env variables before starting the app.
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });
    // Dropping the guard flushes the log file writer.
    let _log_guard = match logging::init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Cannot initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Cannot start the runtime: {}", e);
            std::process::exit(1);
        }
    };
    let res = rt.block_on(async {
        let person_controller = PersonController::new(
            Box::new(InMemoryPersonRepository::new()),
            Box::new(PersonRulesValidator::new()),
        );
        let main_router = MainRouter::new(&config, person_controller);
        main_router.run().await
    });
    if let Err(e) = res {
        tracing::error!("An error occured: {:?}", e);
        drop(_log_guard);
        std::process::exit(1);
    }
}
