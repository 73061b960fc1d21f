use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::models::{Customer, CustomerInput, Customers};
use crate::database::{transaction, TableSource};
use crate::format::datetime;
use crate::middleware::{ApiResponse, ApiResult, Created, CreatedResult};
use crate::query::{ListPage, ListQuery};
use crate::state::AppState;
use crate::validation::Validator;

use super::params::{JsonBody, RecordId};

#[derive(Debug, Default, Deserialize)]
pub struct CustomerBody {
    #[serde(rename = "Customer", default)]
    pub customer: CustomerInput,
}

#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub banned: bool,
    pub order_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Customer> for CustomerView {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            banned: c.banned,
            order_count: c.order_count,
            created_at: datetime(&c.created_at),
            updated_at: datetime(&c.updated_at),
        }
    }
}

fn check_fields(v: &mut Validator, input: &CustomerInput) {
    v.max_len("name", input.name.as_ref(), 255)
        .max_len("email", input.email.as_ref(), 255)
        .email("email", input.email.as_ref())
        .max_len("phone", input.phone.as_ref(), 32);
}

/// GET /api/customers - list customers
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListPage<CustomerView>> {
    let source = TableSource::<Customer>::new(state.pool(), Customers::LIST_SQL);
    let page = state
        .lists()
        .list(&source, &query, Customers::SORTABLE, CustomerView::from)
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/customers/:id - show one customer
pub async fn show(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    match Customers::find(state.pool(), id).await? {
        Some(customer) => Ok(ApiResponse::success(json!({ "Customer": CustomerView::from(customer) }))),
        None => Ok(ApiResponse::not_found("Customer not found")),
    }
}

/// POST /api/customers - register a customer
pub async fn store(State(state): State<AppState>, JsonBody(body): JsonBody<CustomerBody>) -> CreatedResult {
    let input = body.customer;

    let mut v = Validator::new();
    v.required_str("name", input.name.as_ref())
        .required_str("email", input.email.as_ref());
    check_fields(&mut v, &input);
    if let Some(email) = input.email.as_deref().filter(|e| !e.trim().is_empty()) {
        if Customers::email_taken(state.pool(), email, None).await? {
            v.taken("email");
        }
    }
    v.finish()?;

    let id = transaction(state.pool(), move |conn| Box::pin(Customers::insert(conn, input))).await?;

    tracing::info!("Created customer {}", id);
    Ok(Created::new("Customer Created Successfully", "customer_id", id))
}

/// PUT /api/customers/:id - update a customer
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody<CustomerBody>,
) -> ApiResult {
    let input = body.customer;

    let mut v = Validator::new();
    v.filled("name", input.name.as_ref()).filled("email", input.email.as_ref());
    check_fields(&mut v, &input);
    if let Some(email) = input.email.as_deref().filter(|e| !e.trim().is_empty()) {
        if Customers::email_taken(state.pool(), email, Some(id)).await? {
            v.taken("email");
        }
    }
    v.finish()?;

    let updated = transaction(state.pool(), move |conn| Box::pin(Customers::update(conn, id, input))).await?;
    if updated == 0 {
        return Ok(ApiResponse::not_found("Customer not found"));
    }
    Ok(ApiResponse::updated("Customer Updated Successfully"))
}

/// DELETE /api/customers/:id - delete a customer
pub async fn destroy(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    let deleted = transaction(state.pool(), move |conn| Box::pin(Customers::delete(conn, id))).await?;
    if deleted == 0 {
        return Ok(ApiResponse::not_found("Customer not found"));
    }
    Ok(ApiResponse::deleted("Customer Deleted Successfully"))
}
