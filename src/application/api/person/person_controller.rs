use tracing::{info, warn};

use crate::domain::person::{
    Person, PersonRepository, PersonRepositoryError, PersonValidator, ValidationFailure,
};

/// Outcome of one controller action, before it is turned into an HTTP response.
#[derive(Debug, PartialEq)]
pub enum ActionResult {
    People(Vec<Person>),
    Found(Person),
    NotFound,
    /// `location` is the path of the created resource.
    Created { location: String, person: Person },
    BadRequest(Vec<ValidationFailure>),
    BadRequestMessage(String),
    NoContent,
}

#[derive(Clone)]
pub struct PersonController {
    repository: Box<dyn PersonRepository>,
    validator: Box<dyn PersonValidator>,
}

impl PersonController {
    pub fn new(
        repository: Box<dyn PersonRepository>,
        validator: Box<dyn PersonValidator>,
    ) -> Self {
        Self {
            repository,
            validator,
        }
    }

    pub async fn get_people(&self) -> Result<ActionResult, PersonRepositoryError> {
        info!("Getting all people");
        let people = self.repository.get_people().await?;
        Ok(ActionResult::People(people))
    }

    pub async fn get_person(&self, id: i32) -> Result<ActionResult, PersonRepositoryError> {
        info!(id, "Getting person");
        match self.repository.get_person_by_id(id).await? {
            Some(person) => Ok(ActionResult::Found(person)),
            None => Ok(ActionResult::NotFound),
        }
    }

    pub async fn create_person(&self, person: Person) -> Result<ActionResult, PersonRepositoryError> {
        info!(?person, "Adding person");
        let result = self.validator.validate(&person).await;
        if !result.is_valid() {
            warn!(?person, "Validation failed for person");
            return Ok(ActionResult::BadRequest(result.errors));
        }
        let created = self.repository.create_person(&person).await?;
        Ok(ActionResult::Created {
            location: format!("/people/{}", created.id),
            person: created,
        })
    }

    pub async fn update_person(
        &self,
        id: i32,
        person: Person,
    ) -> Result<ActionResult, PersonRepositoryError> {
        info!(id, ?person, "Updating person");
        if id != person.id {
            warn!(id, "Invalid id");
            return Ok(ActionResult::BadRequestMessage("Invalid id".to_string()));
        }
        let result = self.validator.validate(&person).await;
        if !result.is_valid() {
            warn!(?person, "Validation failed for person");
            return Ok(ActionResult::BadRequest(result.errors));
        }
        self.repository.update_person(&person).await?;
        Ok(ActionResult::NoContent)
    }

    pub async fn delete_person(&self, id: i32) -> Result<ActionResult, PersonRepositoryError> {
        info!(id, "Deleting person");
        let person = match self.repository.get_person_by_id(id).await? {
            Some(person) => person,
            None => {
                warn!(id, "Person not found");
                return Ok(ActionResult::NotFound);
            }
        };
        self.repository.delete_person(&person).await?;
        Ok(ActionResult::NoContent)
    }
}
