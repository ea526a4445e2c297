mod person_controller;
pub mod person_router;

pub use person_controller::PersonController;
