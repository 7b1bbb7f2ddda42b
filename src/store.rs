use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteError, WriteFailure},
    options::IndexOptions,
    Client, Collection, IndexModel,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::schemas::{Expense, Participant, Trip};

/// Where trips live between requests.
///
/// Every mutation reports whether it matched: `false` means the trip is
/// missing, the targeted participant or expense is missing, or (for inserts)
/// the id is already taken. Participant display names are unique per trip.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn create_trip(&self, trip: &Trip) -> Result<bool, StoreError>;
    async fn trip(&self, id: &str) -> Result<Option<Trip>, StoreError>;
    async fn trips(&self) -> Result<Vec<Trip>, StoreError>;
    async fn add_participant(
        &self,
        trip_id: &str,
        participant: &Participant,
    ) -> Result<bool, StoreError>;
    async fn remove_participant(
        &self,
        trip_id: &str,
        participant_id: &str,
    ) -> Result<bool, StoreError>;
    async fn add_expense(&self, trip_id: &str, expense: &Expense) -> Result<bool, StoreError>;
    async fn replace_expense(&self, trip_id: &str, expense: &Expense)
        -> Result<bool, StoreError>;
    async fn remove_expense(&self, trip_id: &str, expense_id: &str) -> Result<bool, StoreError>;
}

pub struct MongoTripStore {
    trips: Collection<Trip>,
}

const DUPLICATE_KEY: i32 = 11000;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError {
            code: DUPLICATE_KEY,
            ..
        }))
    )
}

impl MongoTripStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let trips: Collection<Trip> = client.database(database).collection("Trips");
        let unique_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        trips.create_index(unique_id, None).await?;
        Ok(MongoTripStore { trips })
    }
}

#[async_trait]
impl TripStore for MongoTripStore {
    async fn create_trip(&self, trip: &Trip) -> Result<bool, StoreError> {
        match self.trips.insert_one(trip, None).await {
            Ok(_) => Ok(true),
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn trip(&self, id: &str) -> Result<Option<Trip>, StoreError> {
        Ok(self.trips.find_one(doc! { "id": id }, None).await?)
    }

    async fn trips(&self) -> Result<Vec<Trip>, StoreError> {
        let cursor = self.trips.find(None, None).await?;
        let trips: Vec<Trip> = cursor.try_collect().await?;
        Ok(trips)
    }

    async fn add_participant(
        &self,
        trip_id: &str,
        participant: &Participant,
    ) -> Result<bool, StoreError> {
        let result = self
            .trips
            .update_one(
                doc! {
                    "id": trip_id,
                    "participants.id": { "$ne": participant.id.as_str() },
                    "participants.name": { "$ne": participant.name.as_str() },
                },
                doc! { "$push": { "participants": bson::to_bson(participant)? } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn remove_participant(
        &self,
        trip_id: &str,
        participant_id: &str,
    ) -> Result<bool, StoreError> {
        let result = self
            .trips
            .update_one(
                doc! { "id": trip_id, "participants.id": participant_id },
                doc! { "$pull": { "participants": { "id": participant_id } } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn add_expense(&self, trip_id: &str, expense: &Expense) -> Result<bool, StoreError> {
        let result = self
            .trips
            .update_one(
                doc! { "id": trip_id, "expenses.id": { "$ne": expense.id.as_str() } },
                doc! { "$push": { "expenses": bson::to_bson(expense)? } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn replace_expense(
        &self,
        trip_id: &str,
        expense: &Expense,
    ) -> Result<bool, StoreError> {
        let result = self
            .trips
            .update_one(
                doc! { "id": trip_id, "expenses.id": expense.id.as_str() },
                doc! { "$set": { "expenses.$": bson::to_bson(expense)? } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn remove_expense(&self, trip_id: &str, expense_id: &str) -> Result<bool, StoreError> {
        let result = self
            .trips
            .update_one(
                doc! { "id": trip_id, "expenses.id": expense_id },
                doc! { "$pull": { "expenses": { "id": expense_id } } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

/// Keeps trips in process memory. Used for local runs and tests.
#[derive(Default)]
pub struct MemoryTripStore {
    trips: RwLock<HashMap<String, Trip>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn create_trip(&self, trip: &Trip) -> Result<bool, StoreError> {
        let mut trips = self.trips.write().await;
        if trips.contains_key(&trip.id) {
            return Ok(false);
        }
        trips.insert(trip.id.clone(), trip.clone());
        Ok(true)
    }

    async fn trip(&self, id: &str) -> Result<Option<Trip>, StoreError> {
        Ok(self.trips.read().await.get(id).cloned())
    }

    async fn trips(&self) -> Result<Vec<Trip>, StoreError> {
        let mut trips: Vec<Trip> = self.trips.read().await.values().cloned().collect();
        trips.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(trips)
    }

    async fn add_participant(
        &self,
        trip_id: &str,
        participant: &Participant,
    ) -> Result<bool, StoreError> {
        let mut trips = self.trips.write().await;
        let Some(trip) = trips.get_mut(trip_id) else {
            return Ok(false);
        };
        if trip
            .participants
            .iter()
            .any(|p| p.id == participant.id || p.name == participant.name)
        {
            return Ok(false);
        }
        trip.participants.push(participant.clone());
        Ok(true)
    }

    async fn remove_participant(
        &self,
        trip_id: &str,
        participant_id: &str,
    ) -> Result<bool, StoreError> {
        let mut trips = self.trips.write().await;
        let Some(trip) = trips.get_mut(trip_id) else {
            return Ok(false);
        };
        let before = trip.participants.len();
        trip.participants.retain(|p| p.id != participant_id);
        Ok(trip.participants.len() != before)
    }

    async fn add_expense(&self, trip_id: &str, expense: &Expense) -> Result<bool, StoreError> {
        let mut trips = self.trips.write().await;
        let Some(trip) = trips.get_mut(trip_id) else {
            return Ok(false);
        };
        if trip.expenses.iter().any(|e| e.id == expense.id) {
            return Ok(false);
        }
        trip.expenses.push(expense.clone());
        Ok(true)
    }

    async fn replace_expense(
        &self,
        trip_id: &str,
        expense: &Expense,
    ) -> Result<bool, StoreError> {
        let mut trips = self.trips.write().await;
        let stored = trips
            .get_mut(trip_id)
            .and_then(|trip| trip.expenses.iter_mut().find(|e| e.id == expense.id));
        match stored {
            Some(stored) => {
                *stored = expense.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_expense(&self, trip_id: &str, expense_id: &str) -> Result<bool, StoreError> {
        let mut trips = self.trips.write().await;
        let Some(trip) = trips.get_mut(trip_id) else {
            return Ok(false);
        };
        let before = trip.expenses.len();
        trip.expenses.retain(|e| e.id != expense_id);
        Ok(trip.expenses.len() != before)
    }
}
