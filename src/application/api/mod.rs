pub mod openapi;
pub mod person;
pub mod router;
