use crate::backend::BookingBackend;
use crate::booking_manager::{BookingManager, BookingPolicy};
use crate::clock::SystemClock;
use crate::configuration::Configuration;
use crate::error::BookingError;
use crate::types::{AvailableTimeSlot, Booking, OperatingHours, Service};
use axum::body::Body;
use axum::extract::{FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use axum_valid::Valid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";
/// Set by the identity provider's gateway once the customer's session is verified.
const CUSTOMER_HEADER: &str = "x-customer-id";

lazy_static! {
    static ref TIME_OF_DAY: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

#[derive(Clone)]
pub struct AppState<T: BookingBackend> {
    pub booking_manager: BookingManager<T>,
    pub admin_password: Arc<str>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdmitBookingRequest {
    barbershop_id: Uuid,
    service_id: Uuid,
    start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotQuery {
    service_id: Uuid,
    date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct OperatingHoursRequest {
    #[validate(range(min = 0, max = 6))]
    weekday: i16,
    #[validate(regex(path = *TIME_OF_DAY))]
    opening_time: String,
    #[validate(regex(path = *TIME_OF_DAY))]
    closing_time: String,
    is_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct AddServiceRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(range(min = 1))]
    duration_minutes: i32,
    #[validate(range(min = 0))]
    price_in_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServiceActivationRequest {
    is_active: bool,
}

/// Verified customer identity taken from [`CUSTOMER_HEADER`].
struct CustomerId(String);

impl<S: Send + Sync> FromRequestParts<S> for CustomerId {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts
            .headers
            .get(CUSTOMER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
        {
            Some(customer_id) if !customer_id.is_empty() => Ok(CustomerId(customer_id.into())),
            _ => Err((StatusCode::UNAUTHORIZED, "Missing customer identity".to_string())),
        }
    }
}

pub fn create_app<T: BookingBackend, C: Configuration>(
    backend: T,
    configuration: C,
) -> Result<Router, BookingError> {
    let policy = BookingPolicy::from_configuration(&configuration)?;
    let state = AppState {
        booking_manager: BookingManager::new(backend, policy, Arc::new(SystemClock)),
        admin_password: configuration.password().into(),
    };
    Ok(router(state))
}

pub fn router<T: BookingBackend>(state: AppState<T>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/barbershops/{barbershop_id}/services", get(get_services))
        .route("/barbershops/{barbershop_id}/slots", get(get_available_slots))
        .route("/bookings", get(get_own_bookings).post(admit_booking))
        .route("/bookings/{booking_id}", get(get_own_booking))
        .route("/bookings/{booking_id}/cancel", post(cancel_own_booking));

    let admin = Router::new()
        .route("/admin/barbershops/{barbershop_id}/hours", put(set_operating_hours))
        .route(
            "/admin/barbershops/{barbershop_id}/services",
            get(get_all_services).post(add_service),
        )
        .route(
            "/admin/barbershops/{barbershop_id}/bookings",
            get(get_barbershop_bookings),
        )
        .route("/admin/services/{service_id}", delete(delete_service))
        .route(
            "/admin/services/{service_id}/activation",
            post(set_service_activation),
        )
        .route("/admin/bookings/{booking_id}/confirm", post(confirm_booking))
        .route("/admin/bookings/{booking_id}/cancel", post(cancel_booking))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth::<T>));

    Router::new()
        .merge(public)
        .merge(admin)
        .with_state(state)
        .layer(cors)
}

async fn admin_auth<T: BookingBackend>(
    State(state): State<AppState<T>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    if let Some(auth_header) = request.headers().get(ADMIN_PASSWORD_HEADER) {
        if auth_header.to_str().unwrap_or("") != &*state.admin_password {
            return Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()));
        }
    } else {
        return Err((StatusCode::UNAUTHORIZED, "Missing credentials".to_string()));
    }
    Ok(next.run(request).await)
}

async fn get_services<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(barbershop_id): Path<Uuid>,
) -> Result<Json<Vec<Service>>, BookingError> {
    Ok(Json(state.booking_manager.bookable_services(barbershop_id)?))
}

async fn get_available_slots<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(barbershop_id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Vec<AvailableTimeSlot>>, BookingError> {
    debug!(%barbershop_id, service_id = %query.service_id, date = %query.date, "Listing slots");
    let slots = state.booking_manager.list_available_slots(
        barbershop_id,
        query.service_id,
        query.date,
    )?;
    Ok(Json(slots))
}

async fn admit_booking<T: BookingBackend>(
    State(state): State<AppState<T>>,
    CustomerId(customer_id): CustomerId,
    Json(request): Json<AdmitBookingRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let booking = state.booking_manager.admit_booking(
        request.barbershop_id,
        request.service_id,
        request.start_time,
        &customer_id,
    )?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn get_own_bookings<T: BookingBackend>(
    State(state): State<AppState<T>>,
    CustomerId(customer_id): CustomerId,
) -> Result<Json<Vec<Booking>>, BookingError> {
    Ok(Json(state.booking_manager.customer_bookings(&customer_id)?))
}

async fn get_own_booking<T: BookingBackend>(
    State(state): State<AppState<T>>,
    CustomerId(customer_id): CustomerId,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, BookingError> {
    Ok(Json(
        state
            .booking_manager
            .customer_booking(booking_id, &customer_id)?,
    ))
}

async fn cancel_own_booking<T: BookingBackend>(
    State(state): State<AppState<T>>,
    CustomerId(customer_id): CustomerId,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, BookingError> {
    Ok(Json(
        state
            .booking_manager
            .cancel_own_booking(booking_id, &customer_id)?,
    ))
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, BookingError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|err| BookingError::InvalidConfiguration(format!("invalid time '{value}': {err}")))
}

async fn set_operating_hours<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(barbershop_id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<OperatingHoursRequest>>,
) -> Result<Json<OperatingHours>, BookingError> {
    let hours = OperatingHours {
        barbershop_id,
        weekday: request.weekday,
        opening_time: parse_time_of_day(&request.opening_time)?,
        closing_time: parse_time_of_day(&request.closing_time)?,
        is_open: request.is_open,
    };
    state.booking_manager.set_operating_hours(hours.clone())?;
    Ok(Json(hours))
}

async fn get_all_services<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(barbershop_id): Path<Uuid>,
) -> Result<Json<Vec<Service>>, BookingError> {
    Ok(Json(state.booking_manager.services(barbershop_id)?))
}

async fn add_service<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(barbershop_id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<AddServiceRequest>>,
) -> Result<impl IntoResponse, BookingError> {
    let service = state.booking_manager.add_service(
        barbershop_id,
        request.name,
        request.duration_minutes,
        request.price_in_cents,
    )?;
    Ok((StatusCode::CREATED, Json(service)))
}

async fn get_barbershop_bookings<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(barbershop_id): Path<Uuid>,
) -> Result<Json<Vec<Booking>>, BookingError> {
    Ok(Json(state.booking_manager.barbershop_bookings(barbershop_id)?))
}

async fn set_service_activation<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(service_id): Path<Uuid>,
    Json(request): Json<ServiceActivationRequest>,
) -> Result<Json<Service>, BookingError> {
    Ok(Json(
        state
            .booking_manager
            .set_service_active(service_id, request.is_active)?,
    ))
}

async fn delete_service<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(service_id): Path<Uuid>,
) -> Result<StatusCode, BookingError> {
    state.booking_manager.delete_service(service_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn confirm_booking<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, BookingError> {
    Ok(Json(state.booking_manager.confirm_booking(booking_id)?))
}

async fn cancel_booking<T: BookingBackend>(
    State(state): State<AppState<T>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, BookingError> {
    Ok(Json(state.booking_manager.cancel_booking(booking_id)?))
}
