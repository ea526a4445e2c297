use super::person::Person;

#[derive(Debug, PartialEq)]
pub enum PersonRepositoryError {
    PersonNotFound,
    PersonAlreadyExists,
    InternalError(String),
}

#[async_trait::async_trait]
pub trait PersonRepository: PersonClone + Send + Sync {
    async fn get_people(&self) -> Result<Vec<Person>, PersonRepositoryError>;
    async fn get_person_by_id(&self, id: i32) -> Result<Option<Person>, PersonRepositoryError>;
    /// Stores `person` and returns it as stored. An id of `0` lets the store pick one.
    async fn create_person(&self, person: &Person) -> Result<Person, PersonRepositoryError>;
    async fn update_person(&self, person: &Person) -> Result<(), PersonRepositoryError>;
    async fn delete_person(&self, person: &Person) -> Result<(), PersonRepositoryError>;
}

pub trait PersonClone {
    fn clone_box(&self) -> Box<dyn PersonRepository>;
}

impl<T> PersonClone for T
where
    T: 'static + PersonRepository + Clone,
{
    fn clone_box(&self) -> Box<dyn PersonRepository> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn PersonRepository> {
    fn clone(&self) -> Box<dyn PersonRepository> {
        self.clone_box()
    }
}
