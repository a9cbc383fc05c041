//! In-memory clinic repository
//!
//! Holds owners with their pets behind a single lock and implements every
//! lookup port the services need. [`InMemoryClinicRepository::with_sample_data`]
//! seeds the classic sample clinic.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use petclinic_core::{OwnerLookup, PetLookup, PetNameStore};
use petclinic_domain::{ClinicError, Owner, Pet, PetId, PetKind, Result};
use tracing::{debug, trace};

/// Thread-safe owner/pet store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryClinicRepository {
    owners: RwLock<Vec<Owner>>,
}

impl InMemoryClinicRepository {
    /// Create a repository holding the given owners
    pub fn new(owners: Vec<Owner>) -> Self {
        Self { owners: RwLock::new(owners) }
    }

    /// Create a repository seeded with the sample clinic
    pub fn with_sample_data() -> Self {
        Self::new(sample_owners())
    }

    /// Number of pets across all owners
    pub fn pet_count(&self) -> usize {
        self.owners.read().iter().map(|owner| owner.pets.len()).sum()
    }
}

#[async_trait]
impl PetLookup for InMemoryClinicRepository {
    async fn find_pet(&self, id: PetId) -> Result<Pet> {
        self.owners
            .read()
            .iter()
            .flat_map(|owner| owner.pets.iter())
            .find(|pet| pet.id == id)
            .cloned()
            .ok_or_else(|| ClinicError::NotFound(format!("pet with id {id}")))
    }
}

#[async_trait]
impl OwnerLookup for InMemoryClinicRepository {
    async fn all_owners(&self) -> Result<Vec<Owner>> {
        let owners = self.owners.read().clone();
        debug!(count = owners.len(), "Owners listed");
        Ok(owners)
    }
}

#[async_trait]
impl PetNameStore for InMemoryClinicRepository {
    async fn find_name_with_prefix(&self, prefix: &str) -> Result<String> {
        self.owners
            .read()
            .iter()
            .flat_map(|owner| owner.pets.iter())
            .find(|pet| pet.name.starts_with(prefix))
            .map(|pet| pet.name.clone())
            .ok_or_else(|| ClinicError::NotFound(format!("no pets found with name '{prefix}'")))
    }

    async fn rename(&self, current: &str, new: &str) -> Result<usize> {
        let mut owners = self.owners.write();
        let mut renamed = 0;
        for pet in owners.iter_mut().flat_map(|owner| owner.pets.iter_mut()) {
            if pet.name == current {
                pet.name = new.to_string();
                renamed += 1;
            }
        }
        trace!(renamed, current, new, "Pets renamed");
        Ok(renamed)
    }
}

fn pet(id: PetId, name: &str, kind: PetKind, born: (i32, u32, u32)) -> Pet {
    let mut pet = Pet::new(id, name, kind);
    pet.birth_date = NaiveDate::from_ymd_opt(born.0, born.1, born.2);
    pet
}

fn owner(id: i32, first: &str, last: &str, telephone: &str, pets: Vec<Pet>) -> Owner {
    let mut owner = Owner::new(id, first, last);
    owner.telephone = telephone.to_string();
    pets.into_iter().fold(owner, Owner::with_pet)
}

fn sample_owners() -> Vec<Owner> {
    vec![
        owner(1, "George", "Franklin", "6085551023", vec![pet(1, "Leo", PetKind::Cat, (2010, 9, 7))]),
        owner(2, "Betty", "Davis", "6085551749", vec![pet(2, "Basil", PetKind::Hamster, (2012, 8, 6))]),
        owner(
            3,
            "Eduardo",
            "Rodriquez",
            "6085558763",
            vec![pet(3, "Rosy", PetKind::Dog, (2011, 4, 17)), pet(4, "Jewel", PetKind::Dog, (2010, 3, 7))],
        ),
        owner(4, "Harold", "Davis", "6085553198", vec![pet(5, "Iggy", PetKind::Lizard, (2010, 11, 30))]),
        owner(5, "Peter", "McTavish", "6085552765", vec![pet(6, "George", PetKind::Snake, (2010, 1, 20))]),
        owner(
            6,
            "Jean",
            "Coleman",
            "6085552654",
            vec![pet(7, "Samantha", PetKind::Cat, (2012, 9, 4)), pet(8, "Max", PetKind::Cat, (2012, 9, 4))],
        ),
        owner(7, "Jeff", "Black", "6085555387", vec![pet(9, "Lucky", PetKind::Bird, (2011, 8, 6))]),
        owner(8, "Maria", "Escobito", "6085557683", vec![pet(10, "Mulligan", PetKind::Dog, (2007, 2, 24))]),
        owner(9, "David", "Schroeder", "6085559435", vec![pet(11, "Freddy", PetKind::Bird, (2010, 3, 9))]),
        owner(
            10,
            "Carlos",
            "Estaban",
            "6085555487",
            vec![pet(12, "Lucky", PetKind::Dog, (2010, 6, 24)), pet(13, "Sly", PetKind::Cat, (2012, 6, 8))],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_shape() {
        let repo = InMemoryClinicRepository::with_sample_data();

        assert_eq!(repo.owners.read().len(), 10);
        assert_eq!(repo.pet_count(), 13);
    }

    #[tokio::test]
    async fn test_find_pet() {
        let repo = InMemoryClinicRepository::with_sample_data();

        let pet = repo.find_pet(7).await.unwrap();
        assert_eq!(pet.name, "Samantha");
        assert_eq!(pet.birth_date, NaiveDate::from_ymd_opt(2012, 9, 4));

        assert!(matches!(repo.find_pet(99).await, Err(ClinicError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_owners_keep_insertion_order() {
        let mut owners = sample_owners();
        owners.push(Owner::new(11, "Ada", "Lovelace"));
        let repo = InMemoryClinicRepository::new(owners);

        let owners = repo.all_owners().await.unwrap();

        assert_eq!(owners.first().unwrap().first_name, "George");
        assert_eq!(owners.last().unwrap().first_name, "Ada");
    }

    #[tokio::test]
    async fn test_rename_by_prefix() {
        let repo = InMemoryClinicRepository::with_sample_data();

        let current = repo.find_name_with_prefix("Bas").await.unwrap();
        assert_eq!(current, "Basil");
        assert_eq!(repo.rename(&current, "Basil The Second").await.unwrap(), 1);
        assert_eq!(repo.find_pet(2).await.unwrap().name, "Basil The Second");

        assert_eq!(repo.rename("Nobody", "Somebody").await.unwrap(), 0);
        assert!(repo.find_name_with_prefix("Zed").await.is_err());
    }
}
