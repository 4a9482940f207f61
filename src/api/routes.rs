//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Amount, ExpenseStatus, ExpenseView, PublicUser};
use crate::error::AppError;
use crate::services::{AuthService, CustomerService, ExpenseInput, ExpenseService, RegisterCommand, UserService};

use super::extractors::ValidatedJson;
use super::middleware::CurrentUser;
use super::{ApiResponse, AppState};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// Strictly positive, at most 2 decimal places; re-checked by the
    /// domain `Amount` type
    pub amount: Decimal,
    pub debtor_id: Uuid,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<ExpenseStatus>,
}

impl ExpenseRequest {
    /// Convert to the service input, validating the amount.
    fn into_input(self) -> Result<ExpenseInput, AppError> {
        let amount = Amount::new(self.amount)
            .map_err(|e| AppError::validation_field("amount", &e.to_string()))?;

        Ok(ExpenseInput {
            description: self.description,
            amount,
            debtor_id: self.debtor_id,
            due_date: self.due_date,
            notes: self.notes,
            status: self.status,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

// =========================================================================
// Routers
// =========================================================================

/// Routes that do not require authentication
pub fn create_public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes behind the bearer token middleware
pub fn create_protected_router() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(current_user))
        .route("/users/search", get(search_users))
        .route("/customers", get(list_customers))
        .route("/customers/:user_id", post(add_customer))
        .route("/customers/:user_id", delete(remove_customer))
        .route("/expenses", post(create_expense))
        .route("/expenses", get(list_expenses))
        .route("/expenses/created", get(list_created_expenses))
        .route("/expenses/debts", get(list_debtor_expenses))
        .route("/expenses/with/:user_id", get(list_expenses_with))
        .route("/expenses/:id", get(get_expense))
        .route("/expenses/:id", put(update_expense))
        .route("/expenses/:id", delete(delete_expense))
}

// =========================================================================
// Auth endpoints
// =========================================================================

/// Register a new user and return a token for the fresh account
async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    let service = AuthService::new(state.pool, state.tokens);

    let (token, user) = service
        .register(RegisterCommand {
            username: request.username,
            email: request.email,
            password: request.password,
            full_name: request.full_name,
            phone_number: request.phone_number,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User registered successfully",
            AuthResponse {
                token: token.access_token,
                token_type: token.token_type,
                expires_in: token.expires_in,
                user,
            },
        )),
    ))
}

/// Authenticate and return a token
async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let service = AuthService::new(state.pool, state.tokens);

    let (token, user) = service.login(&request.username, &request.password).await?;

    Ok(Json(ApiResponse::with_message(
        "Login successful",
        AuthResponse {
            token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            user,
        },
    )))
}

// =========================================================================
// User endpoints
// =========================================================================

/// Profile of the authenticated user
async fn current_user(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ApiResponse<PublicUser>> {
    Json(ApiResponse::ok(user.to_public()))
}

/// Search users by username, email, or full name; the caller is excluded
/// from the results
async fn search_users(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<PublicUser>>>, AppError> {
    let mut results = UserService::new(state.pool).search(&query.query).await?;
    results.retain(|found| found.id != user.id);

    Ok(Json(ApiResponse::ok(results)))
}

// =========================================================================
// Customer endpoints
// =========================================================================

/// List the caller's customers
async fn list_customers(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<PublicUser>>>, AppError> {
    let customers = CustomerService::new(state.pool).list(&user).await?;
    Ok(Json(ApiResponse::ok(customers)))
}

/// Add a user to the caller's customer list
async fn add_customer(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PublicUser>>, AppError> {
    let customer = CustomerService::new(state.pool).add(&user, user_id).await?;
    Ok(Json(ApiResponse::with_message(
        "Customer added successfully",
        customer,
    )))
}

/// Remove a user from the caller's customer list
async fn remove_customer(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    CustomerService::new(state.pool).remove(&user, user_id).await?;
    Ok(Json(ApiResponse::message_only(
        "Customer removed successfully",
    )))
}

// =========================================================================
// Expense endpoints
// =========================================================================

/// Record a new expense owed to the caller
async fn create_expense(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<ExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseView>>), AppError> {
    let input = request.into_input()?;
    let expense = ExpenseService::new(state.pool).create(&user, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Expense created successfully",
            expense,
        )),
    ))
}

/// All expenses where the caller is creator or debtor
async fn list_expenses(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ExpenseView>>>, AppError> {
    let expenses = ExpenseService::new(state.pool).list_all(&user).await?;
    Ok(Json(ApiResponse::ok(expenses)))
}

/// Expenses the caller created
async fn list_created_expenses(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ExpenseView>>>, AppError> {
    let expenses = ExpenseService::new(state.pool).list_created(&user).await?;
    Ok(Json(ApiResponse::ok(expenses)))
}

/// Expenses the caller owes
async fn list_debtor_expenses(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ExpenseView>>>, AppError> {
    let expenses = ExpenseService::new(state.pool).list_as_debtor(&user).await?;
    Ok(Json(ApiResponse::ok(expenses)))
}

/// Expenses between the caller and another user, in either direction
async fn list_expenses_with(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ExpenseView>>>, AppError> {
    let expenses = ExpenseService::new(state.pool)
        .list_between(&user, user_id)
        .await?;
    Ok(Json(ApiResponse::ok(expenses)))
}

/// Read a single expense (creator or debtor only)
async fn get_expense(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExpenseView>>, AppError> {
    let expense = ExpenseService::new(state.pool).get(id, &user).await?;
    Ok(Json(ApiResponse::ok(expense)))
}

/// Update an expense (creator only)
async fn update_expense(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ExpenseRequest>,
) -> Result<Json<ApiResponse<ExpenseView>>, AppError> {
    let input = request.into_input()?;
    let expense = ExpenseService::new(state.pool)
        .update(id, &user, input)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Expense updated successfully",
        expense,
    )))
}

/// Delete an expense (creator only)
async fn delete_expense(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    ExpenseService::new(state.pool).delete(id, &user).await?;
    Ok(Json(ApiResponse::message_only(
        "Expense deleted successfully",
    )))
}
