use std::{collections::BTreeMap, sync::Arc};

use tokio::sync::RwLock;

use crate::domain::person::{Person, PersonRepository, PersonRepositoryError};

/// Keeps people in a map keyed by id. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersonRepository {
    people: Arc<RwLock<BTreeMap<i32, Person>>>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn get_people(&self) -> Result<Vec<Person>, PersonRepositoryError> {
        let people = self.people.read().await;
        Ok(people.values().cloned().collect())
    }

    async fn get_person_by_id(&self, id: i32) -> Result<Option<Person>, PersonRepositoryError> {
        let people = self.people.read().await;
        Ok(people.get(&id).cloned())
    }

    async fn create_person(&self, person: &Person) -> Result<Person, PersonRepositoryError> {
        let mut people = self.people.write().await;
        let mut stored = person.clone();
        if stored.id == 0 {
            let last_id = people.keys().next_back().copied().unwrap_or(0).max(0);
            stored.id = last_id.checked_add(1).ok_or_else(|| {
                PersonRepositoryError::InternalError("No id left to assign".to_string())
            })?;
        }
        if people.contains_key(&stored.id) {
            return Err(PersonRepositoryError::PersonAlreadyExists);
        }
        people.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_person(&self, person: &Person) -> Result<(), PersonRepositoryError> {
        let mut people = self.people.write().await;
        match people.get_mut(&person.id) {
            Some(existing) => {
                *existing = person.clone();
                Ok(())
            }
            None => Err(PersonRepositoryError::PersonNotFound),
        }
    }

    async fn delete_person(&self, person: &Person) -> Result<(), PersonRepositoryError> {
        let mut people = self.people.write().await;
        match people.remove(&person.id) {
            Some(_) => Ok(()),
            None => Err(PersonRepositoryError::PersonNotFound),
        }
    }
}
