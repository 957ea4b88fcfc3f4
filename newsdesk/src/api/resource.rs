//! Generic admin CRUD controller.
//!
//! A [`ResourceController`] bundles what differs between resources: the service, the view model
//! `V`, the store/update validators and the filter allow-list. The handlers below are written
//! once against it and turn every outcome into an [`envelope`](crate::api::envelope) response.
//! [`ResourceRouter`] mounts them; the toggle-status route only exists for
//! [`StatusTogglable`] entities.

use std::{marker::PhantomData, sync::Arc};

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, RawQuery, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::api::envelope::{self, NOT_FOUND};
use crate::api::models::{
    pagination::{CollectionView, parse_list_query},
    validation::{Validator, body_error},
};
use crate::db::{
    errors::DbError,
    models::{Entity, StatusTogglable, paging::FilterField},
};
use crate::errors::Error;
use crate::services::Service;
use crate::types::{EntityId, parse_id};

/// Strategies for one admin resource.
pub struct ResourceController<E: Entity, V> {
    service: Arc<dyn Service<E>>,
    filters: &'static [FilterField],
    validate_store: Validator,
    validate_update: Validator,
    view: PhantomData<fn() -> V>,
}

impl<E: Entity, V> Clone for ResourceController<E, V> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            filters: self.filters,
            validate_store: self.validate_store,
            validate_update: self.validate_update,
            view: PhantomData,
        }
    }
}

impl<E: Entity, V> ResourceController<E, V> {
    pub fn new(
        service: Arc<dyn Service<E>>,
        filters: &'static [FilterField],
        validate_store: Validator,
        validate_update: Validator,
    ) -> Self {
        Self {
            service,
            filters,
            validate_store,
            validate_update,
            view: PhantomData,
        }
    }
}

/// Envelope for a failed operation. `action` prefixes the message, e.g. "Failed to create resource".
fn failure(action: &str, err: Error) -> Response {
    err.log();
    match err {
        Error::ValidationFailed { errors } => envelope::validation_error(errors).into_response(),
        err if err.is_not_found() => envelope::not_found(NOT_FOUND).into_response(),
        Error::Database(DbError::UniqueViolation { field, .. }) => {
            let field = field.as_deref().unwrap_or("value");
            envelope::error(format!("{action}: {field} already exists"), StatusCode::CONFLICT, None).into_response()
        }
        err => envelope::error(format!("{action}: {}", err.user_message()), StatusCode::BAD_REQUEST, None).into_response(),
    }
}

/// Unwrap a JSON body, mapping a malformed one to a validation envelope.
fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, Response> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| envelope::validation_error(body_error(rejection.body_text())).into_response())
}

fn view<E, V: From<E> + Serialize>(entity: E, message: &str, status: StatusCode) -> Response {
    envelope::success(V::from(entity), message, status).into_response()
}

#[instrument(skip_all, fields(resource = E::NAME))]
async fn index<E, V>(
    State(ctrl): State<ResourceController<E, V>>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
) -> Response
where
    E: Entity,
    V: From<E> + Serialize + Send + 'static,
{
    const ACTION: &str = "Failed to retrieve data";

    let list = match parse_list_query(query.as_deref(), ctrl.filters) {
        Ok(list) => list,
        Err(err) => return failure(ACTION, err),
    };
    match ctrl.service.get_paginated_with_filters(&list.page, &list.filters).await {
        Ok(page) => envelope::success(
            CollectionView::<V>::new(page, &uri),
            "Data retrieved successfully",
            StatusCode::OK,
        )
        .into_response(),
        Err(err) => failure(ACTION, err),
    }
}

#[instrument(skip_all, fields(resource = E::NAME))]
async fn store<E, V>(
    State(ctrl): State<ResourceController<E, V>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response
where
    E: Entity,
    V: From<E> + Serialize + Send + 'static,
{
    let data = match body(payload).and_then(|value| {
        (ctrl.validate_store)(value).map_err(|errors| envelope::validation_error(errors).into_response())
    }) {
        Ok(data) => data,
        Err(response) => return response,
    };

    match ctrl.service.create(data).await {
        Ok(entity) => view::<E, V>(entity, "Resource created successfully", StatusCode::CREATED),
        Err(err) => failure("Failed to create resource", err),
    }
}

#[instrument(skip_all, fields(resource = E::NAME, id = %id))]
async fn show<E, V>(State(ctrl): State<ResourceController<E, V>>, Path(id): Path<String>) -> Response
where
    E: Entity,
    V: From<E> + Serialize + Send + 'static,
{
    let Some(id) = parse_id(&id) else {
        return envelope::not_found(NOT_FOUND).into_response();
    };
    match ctrl.service.get_by_id(id).await {
        Ok(Some(entity)) => view::<E, V>(entity, "Resource retrieved successfully", StatusCode::OK),
        Ok(None) => envelope::not_found(NOT_FOUND).into_response(),
        Err(err) => failure("Failed to retrieve resource", err),
    }
}

#[instrument(skip_all, fields(resource = E::NAME, id = %id))]
async fn update<E, V>(
    State(ctrl): State<ResourceController<E, V>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response
where
    E: Entity,
    V: From<E> + Serialize + Send + 'static,
{
    let Some(id) = parse_id(&id) else {
        return envelope::not_found(NOT_FOUND).into_response();
    };
    let data = match body(payload).and_then(|value| {
        (ctrl.validate_update)(value).map_err(|errors| envelope::validation_error(errors).into_response())
    }) {
        Ok(data) => data,
        Err(response) => return response,
    };

    match ctrl.service.update(id, data).await {
        Ok(entity) => view::<E, V>(entity, "Resource updated successfully", StatusCode::OK),
        Err(err) => failure("Failed to update resource", err),
    }
}

#[instrument(skip_all, fields(resource = E::NAME, id = %id))]
async fn destroy<E, V>(State(ctrl): State<ResourceController<E, V>>, Path(id): Path<String>) -> Response
where
    E: Entity,
    V: Send + 'static,
{
    let Some(id) = parse_id(&id) else {
        return envelope::not_found(NOT_FOUND).into_response();
    };
    match ctrl.service.delete(id).await {
        Ok(true) => envelope::done("Resource deleted successfully").into_response(),
        Ok(false) => envelope::not_found(NOT_FOUND).into_response(),
        Err(err) => failure("Failed to delete resource", err),
    }
}

/// Ids from a `{"ids": [...]}` body. Entries that are not valid ids are dropped.
fn requested_ids(value: &Value) -> Option<Vec<EntityId>> {
    let ids = value.get("ids")?.as_array().filter(|ids| !ids.is_empty())?;
    Some(ids.iter().filter_map(Value::as_str).filter_map(parse_id).collect())
}

#[instrument(skip_all, fields(resource = E::NAME))]
async fn bulk_destroy<E, V>(
    State(ctrl): State<ResourceController<E, V>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response
where
    E: Entity,
    V: Send + 'static,
{
    let value = match body(payload) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let Some(ids) = requested_ids(&value) else {
        return envelope::error("No IDs provided", StatusCode::BAD_REQUEST, None).into_response();
    };

    match ctrl.service.bulk_delete(&ids).await {
        Ok(deleted_count) => envelope::success(
            json!({ "deleted_count": deleted_count }),
            format!("Successfully deleted {deleted_count} resources"),
            StatusCode::OK,
        )
        .into_response(),
        Err(err) => failure("Failed to bulk delete", err),
    }
}

#[instrument(skip_all, fields(resource = E::NAME, id = %id))]
async fn toggle_status<E, V>(State(ctrl): State<ResourceController<E, V>>, Path(id): Path<String>) -> Response
where
    E: StatusTogglable,
    V: From<E> + Serialize + Send + 'static,
{
    let Some(id) = parse_id(&id) else {
        return envelope::not_found(NOT_FOUND).into_response();
    };
    match ctrl.service.toggle_status(id).await {
        Ok(entity) => view::<E, V>(entity, "Status updated successfully", StatusCode::OK),
        Err(err) => failure("Failed to toggle status", err),
    }
}

/// Routes of one admin resource, relative to where it is nested.
pub struct ResourceRouter<E: Entity, V> {
    controller: ResourceController<E, V>,
    routes: Router<ResourceController<E, V>>,
}

impl<E, V> ResourceRouter<E, V>
where
    E: Entity,
    V: From<E> + Serialize + Send + 'static,
{
    pub fn new(controller: ResourceController<E, V>) -> Self {
        let routes = Router::new()
            .route("/", get(index::<E, V>).post(store::<E, V>))
            .route("/bulk-delete", post(bulk_destroy::<E, V>))
            .route("/{id}", get(show::<E, V>).put(update::<E, V>).delete(destroy::<E, V>));
        Self { controller, routes }
    }

    /// Mount `POST /{id}/toggle-status`.
    pub fn with_status_toggle(mut self) -> Self
    where
        E: StatusTogglable,
    {
        self.routes = self.routes.route("/{id}/toggle-status", post(toggle_status::<E, V>));
        self
    }

    pub fn into_router<S>(self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.routes.with_state(self.controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{
        comments::{CommentCreate, CommentUpdate, CommentView, FILTERS},
        validation::validate_payload,
    };
    use crate::db::{
        handlers::Records,
        models::comments::Comment,
        store::MemoryStore,
    };
    use axum_test::TestServer;
    use serde_json::json;

    /// Comments without any business rules, so tests can create them freely.
    struct Plain(Records<Comment>);

    impl Service<Comment> for Plain {
        fn repository(&self) -> &Records<Comment> {
            &self.0
        }
    }

    fn server(toggle: bool) -> TestServer {
        let controller = ResourceController::<Comment, CommentView>::new(
            Arc::new(Plain(Records::new(Arc::new(MemoryStore::new())))),
            FILTERS,
            validate_payload::<CommentCreate>,
            validate_payload::<CommentUpdate>,
        );
        let mut resource = ResourceRouter::new(controller);
        if toggle {
            resource = resource.with_status_toggle();
        }
        let app: Router = Router::new().nest("/comments", resource.into_router());
        TestServer::new(app).expect("Failed to create test server")
    }

    fn comment(author: &str) -> Value {
        json!({"news_id": EntityId::new_v4(), "author_name": author, "content": "Hello", "status": "active"})
    }

    #[tokio::test]
    async fn test_store_then_show() {
        let server = server(false);
        let created = server.post("/comments").json(&comment("Ada")).await;
        created.assert_status(StatusCode::CREATED);
        let body: Value = created.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Resource created successfully");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let shown = server.get(&format!("/comments/{id}")).await;
        shown.assert_status_ok();
        let body: Value = shown.json();
        assert_eq!(body["message"], "Resource retrieved successfully");
        assert_eq!(body["data"]["author_name"], "Ada");
        assert!(body["data"]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_store_validation_and_malformed_body() {
        let server = server(false);
        let response = server.post("/comments").json(&json!({"content": "x"})).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["message"], "Validation failed");
        assert!(body["errors"]["author_name"].is_array());

        let response = server
            .post("/comments")
            .text("{not json")
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert!(body["errors"]["body"].is_array());
    }

    #[tokio::test]
    async fn test_missing_and_malformed_ids_are_not_found() {
        let server = server(false);
        for path in [format!("/comments/{}", EntityId::new_v4()), "/comments/not-an-id".to_string()] {
            let response = server.get(&path).await;
            response.assert_status_not_found();
            let body: Value = response.json();
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Resource not found");
            assert_eq!(body["data"], Value::Null);
        }
        server
            .delete(&format!("/comments/{}", EntityId::new_v4()))
            .await
            .assert_status_not_found();
        server
            .put(&format!("/comments/{}", EntityId::new_v4()))
            .json(&json!({"content": "x"}))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_update_and_destroy() {
        let server = server(false);
        let body: Value = server.post("/comments").json(&comment("Ada")).await.json();
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let response = server.put(&format!("/comments/{id}")).json(&json!({"content": "Edited"})).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Resource updated successfully");
        assert_eq!(body["data"]["content"], "Edited");
        assert_eq!(body["data"]["author_name"], "Ada");

        let response = server.delete(&format!("/comments/{id}")).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Resource deleted successfully");
        assert_eq!(body["data"], Value::Null);
        server.get(&format!("/comments/{id}")).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_index_pages_and_filters() {
        let server = server(false);
        for author in ["Ada", "Bob", "Cy"] {
            server.post("/comments").json(&comment(author)).await.assert_status(StatusCode::CREATED);
        }

        let body: Value = server
            .get("/comments")
            .add_query_param("per_page", "2")
            .add_query_param("sort_field", "author_name")
            .add_query_param("sort_direction", "asc")
            .await
            .json();
        assert_eq!(body["message"], "Data retrieved successfully");
        let page = &body["data"];
        assert_eq!(page["data"].as_array().unwrap().len(), 2);
        assert_eq!(page["data"][0]["author_name"], "Ada");
        assert_eq!(page["meta"]["total"], 3);
        assert_eq!(page["meta"]["total_pages"], 2);
        assert_eq!(page["meta"]["has_more_pages"], true);
        assert!(page["links"]["next"].as_str().unwrap().ends_with("page=2"));
        assert_eq!(page["links"]["prev"], Value::Null);

        let body: Value = server
            .get("/comments")
            .add_query_param("author_name", "bo")
            .add_query_param("secret", "ignored")
            .await
            .json();
        assert_eq!(body["data"]["meta"]["total"], 1);
        assert_eq!(body["data"]["data"][0]["author_name"], "Bob");
    }

    #[tokio::test]
    async fn test_index_rejects_bad_sorting() {
        let server = server(false);
        let response = server.get("/comments").add_query_param("sort_direction", "sideways").await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().starts_with("Failed to retrieve data: "));

        server
            .get("/comments")
            .add_query_param("sort_field", "name; drop")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_bulk_destroy() {
        let server = server(false);
        let mut ids = Vec::new();
        for author in ["Ada", "Bob"] {
            let body: Value = server.post("/comments").json(&comment(author)).await.json();
            ids.push(body["data"]["id"].as_str().unwrap().to_string());
        }
        ids.push(EntityId::new_v4().to_string());
        ids.push("garbage".to_string());

        let response = server.post("/comments/bulk-delete").json(&json!({ "ids": ids })).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Successfully deleted 2 resources");
        assert_eq!(body["data"]["deleted_count"], 2);

        for empty in [json!({}), json!({"ids": []})] {
            let response = server.post("/comments/bulk-delete").json(&empty).await;
            response.assert_status_bad_request();
            let body: Value = response.json();
            assert_eq!(body["message"], "No IDs provided");
        }
    }

    #[tokio::test]
    async fn test_toggle_status_only_when_mounted() {
        let with_toggle = server(true);
        let body: Value = with_toggle.post("/comments").json(&comment("Ada")).await.json();
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let body: Value = with_toggle.post(&format!("/comments/{id}/toggle-status")).await.json();
        assert_eq!(body["message"], "Status updated successfully");
        assert_eq!(body["data"]["status"], "inactive");
        let body: Value = with_toggle.post(&format!("/comments/{id}/toggle-status")).await.json();
        assert_eq!(body["data"]["status"], "active");

        let without = server(false);
        let body: Value = without.post("/comments").json(&comment("Ada")).await.json();
        let id = body["data"]["id"].as_str().unwrap().to_string();
        without
            .post(&format!("/comments/{id}/toggle-status"))
            .await
            .assert_status_not_found();
    }

    #[test]
    fn test_requested_ids() {
        let id = EntityId::new_v4();
        assert_eq!(requested_ids(&json!({"ids": [id.to_string(), 5, "x"]})), Some(vec![id]));
        assert_eq!(requested_ids(&json!({"ids": []})), None);
        assert_eq!(requested_ids(&json!({"ids": "x"})), None);
        assert_eq!(requested_ids(&json!({})), None);
    }
}
