use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: i32,
}

impl Person {
    pub fn new(id: i32, first_name: Option<&str>, last_name: Option<&str>, age: i32) -> Self {
        Self {
            id,
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
            age,
        }
    }
}
