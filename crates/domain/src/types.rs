//! Clinic entities
//!
//! Plain data records handed to the sample services by the persistence
//! collaborators. The services never mutate them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a pet as stored by the clinic
pub type PetId = i32;

/// Identifier of an owner as stored by the clinic
pub type OwnerId = i32;

/// Kind of animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetKind {
    Cat,
    Dog,
    Lizard,
    Snake,
    Bird,
    Hamster,
}

/// A pet registered at the clinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub kind: PetKind,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl Pet {
    pub fn new(id: PetId, name: impl Into<String>, kind: PetKind) -> Self {
        Self { id, name: name.into(), kind, birth_date: None }
    }
}

/// A pet owner together with their pets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub pets: Vec<Pet>,
}

impl Owner {
    pub fn new(id: OwnerId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            telephone: String::new(),
            pets: Vec::new(),
        }
    }

    /// Builder-style helper used by fixtures and tests
    pub fn with_pet(mut self, pet: Pet) -> Self {
        self.pets.push(pet);
        self
    }
}

/// A (recommended) visit to the clinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i32,
    pub pet_id: PetId,
    pub pet_name: String,
    pub date: NaiveDate,
    pub description: String,
}
