use actix_web::{delete, get, post, put, web, HttpResponse};
use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::balance::compute_balances;
use crate::error::ApiError;
use crate::schemas::{BeneficiaryRule, Expense, Participant, ParticipantId, Trip};
use crate::settle::consolidate_transfers;
use crate::store::TripStore;
use crate::transfers::compute_transfers;

type Store = web::Data<dyn TripStore>;

#[derive(Deserialize)]
struct NewTrip {
    name: String,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct NewParticipant {
    name: String,
}

#[derive(Deserialize)]
struct ExpenseBody {
    #[serde(default)]
    id: Option<String>,
    title: String,
    amount: f64,
    #[serde(default)]
    category: String,
    payer_id: ParticipantId,
    beneficiary: BeneficiaryRule,
    #[serde(default)]
    date: Option<NaiveDate>,
}

impl ExpenseBody {
    fn into_expense(self, id: String) -> Expense {
        Expense {
            id,
            title: self.title,
            amount: self.amount,
            category: self.category,
            payer_id: self.payer_id,
            beneficiary: self.beneficiary,
            date: self.date,
        }
    }
}

#[derive(Deserialize)]
struct TransfersQuery {
    #[serde(default)]
    consolidated: bool,
}

fn new_id() -> String {
    ObjectId::new().to_hex()
}

async fn load_trip(store: &Store, trip_id: &str) -> Result<Trip, ApiError> {
    store
        .trip(trip_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("trip {trip_id}")))
}

/// Tells apart a missing trip from a missing or clashing item after a
/// mutation did not match.
async fn unmatched(store: &Store, trip_id: &str, error: ApiError) -> ApiError {
    match load_trip(store, trip_id).await {
        Ok(_) => error,
        Err(err) => err,
    }
}

#[get("/trips")]
async fn list_trips(store: Store) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(store.trips().await?))
}

#[put("/trips/{id}")]
async fn create_trip(
    store: Store,
    id: web::Path<String>,
    json: web::Json<NewTrip>,
) -> Result<HttpResponse, ApiError> {
    let json = json.into_inner();
    let trip = Trip {
        id: id.into_inner(),
        name: json.name,
        start_date: json.start_date,
        end_date: json.end_date,
        participants: vec![],
        expenses: vec![],
    };
    trip.validate_dates()?;
    if !store.create_trip(&trip).await? {
        return Err(ApiError::Conflict(format!("trip {}", trip.id)));
    }
    tracing::info!(trip = %trip.id, "trip created");
    Ok(HttpResponse::Created().json(trip))
}

#[get("/trips/{id}")]
async fn get_trip(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(load_trip(&store, &id).await?))
}

#[post("/trips/{id}/participants")]
async fn add_participant(
    store: Store,
    id: web::Path<String>,
    json: web::Json<NewParticipant>,
) -> Result<HttpResponse, ApiError> {
    let participant = Participant::new(new_id(), json.into_inner().name);
    participant.validate()?;
    if !store.add_participant(&id, &participant).await? {
        let clash = ApiError::Conflict(format!("participant named {:?}", participant.name));
        return Err(unmatched(&store, &id, clash).await);
    }
    tracing::info!(trip = %id, participant = %participant.id, "participant added");
    Ok(HttpResponse::Created().json(participant))
}

#[delete("/trips/{id}/participants/{participant_id}")]
async fn remove_participant(
    store: Store,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (id, participant_id) = path.into_inner();
    if !store.remove_participant(&id, &participant_id).await? {
        let missing = ApiError::NotFound(format!("participant {participant_id}"));
        return Err(unmatched(&store, &id, missing).await);
    }
    tracing::info!(trip = %id, participant = %participant_id, "participant removed");
    Ok(HttpResponse::NoContent().finish())
}

#[post("/trips/{id}/expenses")]
async fn add_expense(
    store: Store,
    id: web::Path<String>,
    json: web::Json<ExpenseBody>,
) -> Result<HttpResponse, ApiError> {
    let mut body = json.into_inner();
    let expense_id = body
        .id
        .take()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(new_id);
    let expense = body.into_expense(expense_id);
    expense.validate()?;
    if !store.add_expense(&id, &expense).await? {
        let clash = ApiError::Conflict(format!("expense {}", expense.id));
        return Err(unmatched(&store, &id, clash).await);
    }
    tracing::info!(trip = %id, expense = %expense.id, amount = expense.amount, "expense added");
    Ok(HttpResponse::Created().json(expense))
}

#[put("/trips/{id}/expenses/{expense_id}")]
async fn replace_expense(
    store: Store,
    path: web::Path<(String, String)>,
    json: web::Json<ExpenseBody>,
) -> Result<HttpResponse, ApiError> {
    let (id, expense_id) = path.into_inner();
    let expense = json.into_inner().into_expense(expense_id);
    expense.validate()?;
    if !store.replace_expense(&id, &expense).await? {
        let missing = ApiError::NotFound(format!("expense {}", expense.id));
        return Err(unmatched(&store, &id, missing).await);
    }
    tracing::info!(trip = %id, expense = %expense.id, "expense replaced");
    Ok(HttpResponse::Ok().json(expense))
}

#[delete("/trips/{id}/expenses/{expense_id}")]
async fn remove_expense(
    store: Store,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (id, expense_id) = path.into_inner();
    if !store.remove_expense(&id, &expense_id).await? {
        let missing = ApiError::NotFound(format!("expense {expense_id}"));
        return Err(unmatched(&store, &id, missing).await);
    }
    tracing::info!(trip = %id, expense = %expense_id, "expense removed");
    Ok(HttpResponse::NoContent().finish())
}

#[get("/trips/{id}/balance")]
async fn get_balance(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let trip = load_trip(&store, &id).await?;
    let balance = compute_balances(&trip.participants, &trip.expenses);
    tracing::debug!(trip = %trip.id, entries = balance.len(), "balance computed");
    Ok(HttpResponse::Ok().json(balance))
}

#[get("/trips/{id}/transfers")]
async fn get_transfers(
    store: Store,
    id: web::Path<String>,
    query: web::Query<TransfersQuery>,
) -> Result<HttpResponse, ApiError> {
    let trip = load_trip(&store, &id).await?;
    let mut transfers = compute_transfers(&trip.participants, &trip.expenses);
    if query.consolidated {
        transfers = consolidate_transfers(&transfers);
    }
    tracing::debug!(
        trip = %trip.id,
        count = transfers.len(),
        consolidated = query.consolidated,
        "transfers computed"
    );
    Ok(HttpResponse::Ok().json(transfers))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_trips)
        .service(create_trip)
        .service(get_trip)
        .service(add_participant)
        .service(remove_participant)
        .service(add_expense)
        .service(replace_expense)
        .service(remove_expense)
        .service(get_balance)
        .service(get_transfers);
}
