mod person;
mod repository;
mod validator;

pub use person::Person;
pub use repository::{PersonRepository, PersonRepositoryError};
pub use validator::{
    PersonRulesValidator, PersonValidator, ValidationFailure, ValidationResult,
};

#[cfg(test)]
pub use repository::mock::MockRepository;
#[cfg(test)]
pub use validator::mock::MockValidator;
