use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, proxy};
use crate::middleware::bearer_auth_middleware;
use crate::state::AppState;

/// Full application router: public routes plus everything under `/api`
/// behind the bearer token.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(catalog_routes())
        .merge(attribute_routes())
        .merge(product_routes())
        .merge(customer_routes())
        .merge(order_routes())
        .merge(upstream_routes())
        .route_layer(from_fn_with_state(state.clone(), bearer_auth_middleware));

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        // Protected API
        .merge(protected);

    if state.config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn catalog_routes() -> Router<AppState> {
    use handlers::{categories, colors, coupons};

    Router::new()
        .route("/api/categories", get(categories::index).post(categories::store))
        .route(
            "/api/categories/:id",
            get(categories::show).put(categories::update).delete(categories::destroy),
        )
        .route("/api/colors", get(colors::index).post(colors::store))
        .route(
            "/api/colors/:id",
            get(colors::show).put(colors::update).delete(colors::destroy),
        )
        .route("/api/coupons", get(coupons::index).post(coupons::store))
        .route(
            "/api/coupons/:id",
            get(coupons::show).put(coupons::update).delete(coupons::destroy),
        )
}

fn attribute_routes() -> Router<AppState> {
    use handlers::attributes;

    Router::new()
        .route("/api/attributes", get(attributes::index).post(attributes::store))
        .route(
            "/api/attributes/:id",
            get(attributes::show).put(attributes::update).delete(attributes::destroy),
        )
        .route(
            "/api/attributes/:id/values",
            get(attributes::values).post(attributes::store_value),
        )
        .route("/api/attribute-values/:id", delete(attributes::destroy_value))
}

fn product_routes() -> Router<AppState> {
    use handlers::{products, variants};

    Router::new()
        .route("/api/products", get(products::index).post(products::store))
        .route(
            "/api/products/:id",
            get(products::show).put(products::update).delete(products::destroy),
        )
        .route("/api/products/:id/variants", get(variants::index).post(variants::store))
        .route(
            "/api/product-variants/:id",
            get(variants::show).put(variants::update).delete(variants::destroy),
        )
}

fn customer_routes() -> Router<AppState> {
    use handlers::customers;

    Router::new()
        .route("/api/customers", get(customers::index).post(customers::store))
        .route(
            "/api/customers/:id",
            get(customers::show).put(customers::update).delete(customers::destroy),
        )
}

fn order_routes() -> Router<AppState> {
    use handlers::orders;

    Router::new()
        .route("/api/orders", get(orders::index))
        .route("/api/orders/:id", get(orders::show).put(orders::update))
}

fn upstream_routes() -> Router<AppState> {
    Router::new()
        .nest("/api/enjoy/clients", proxy::routes(proxy::CLIENTS))
        .nest("/api/enjoy/orders", proxy::routes(proxy::ORDERS))
        .nest("/api/enjoy/products", proxy::routes(proxy::PRODUCTS))
}
