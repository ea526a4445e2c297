use hyper::{
    header::{self, HeaderValue},
    Method, Response, StatusCode,
};
use serde_json::Value;
use tracing::error;

use crate::{
    application::api::router::{
        empty, full, json_response, BoxBody, HttpError, INTERNAL_ERROR, NOT_FOUND_ERROR,
    },
    domain::person::{Person, PersonRepositoryError},
};

use super::person_controller::{ActionResult, PersonController};

const COLLECTION_METHODS: &str = "GET, POST";
const ITEM_METHODS: &str = "GET, PUT, DELETE";

impl From<PersonRepositoryError> for HttpError<'static> {
    fn from(value: PersonRepositoryError) -> Self {
        match value {
            PersonRepositoryError::PersonNotFound => {
                HttpError::new(404, "PersonNotFound", "The person requested is not found")
            }
            PersonRepositoryError::PersonAlreadyExists => HttpError::new(
                409,
                "PersonAlreadyExists",
                "The person you try to create already exists.",
            ),
            PersonRepositoryError::InternalError(e) => {
                error!(
                    "An internal error occured while making an action on people: {}",
                    e
                );
                INTERNAL_ERROR
            }
        }
    }
}

impl From<ActionResult> for Response<BoxBody> {
    fn from(value: ActionResult) -> Self {
        match value {
            ActionResult::People(people) => json_response(200, &people),
            ActionResult::Found(person) => json_response(200, &person),
            ActionResult::NotFound => empty(StatusCode::NOT_FOUND),
            ActionResult::Created { location, person } => {
                let mut response = json_response(201, &person);
                match HeaderValue::from_str(&location) {
                    Ok(location) => {
                        response.headers_mut().insert(header::LOCATION, location);
                    }
                    Err(e) => error!("Invalid location {}: {}", location, e),
                }
                response
            }
            ActionResult::BadRequest(errors) => json_response(400, &errors),
            ActionResult::BadRequestMessage(message) => {
                let mut response = Response::new(full(message));
                *response.status_mut() = StatusCode::BAD_REQUEST;
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                response
            }
            ActionResult::NoContent => empty(StatusCode::NO_CONTENT),
        }
    }
}

pub async fn router(
    path: &str,
    method: &Method,
    body: Value,
    person_controller: &PersonController,
) -> Result<Response<BoxBody>, HttpError<'static>> {
    let result = match (method, path) {
        (&Method::GET, "") => person_controller.get_people().await?,
        (&Method::POST, "") => {
            let person = parse_person(body)?;
            person_controller.create_person(person).await?
        }
        (&Method::GET, _) => person_controller.get_person(parse_id(path)?).await?,
        (&Method::PUT, _) => {
            let id = parse_id(path)?;
            let person = parse_person(body)?;
            person_controller.update_person(id, person).await?
        }
        (&Method::DELETE, _) => person_controller.delete_person(parse_id(path)?).await?,
        (_, "") => return Ok(method_not_allowed(COLLECTION_METHODS)),
        (_, _) if path.contains('/') => return Err(NOT_FOUND_ERROR),
        (_, _) => return Ok(method_not_allowed(ITEM_METHODS)),
    };
    Ok(result.into())
}

fn method_not_allowed(allowed: &'static str) -> Response<BoxBody> {
    let mut response = json_response(
        405,
        &HttpError::new(
            405,
            "MethodNotAllowed",
            "The method is not supported on this resource",
        ),
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(allowed));
    response
}

fn parse_id(path: &str) -> Result<i32, HttpError<'static>> {
    if path.contains('/') {
        return Err(NOT_FOUND_ERROR);
    }
    path.parse::<i32>().map_err(|_| {
        HttpError::new(
            400,
            "InvalidId",
            "The id you provided must be an integer",
        )
    })
}

fn parse_person(body: Value) -> Result<Person, HttpError<'static>> {
    serde_json::from_value(body).map_err(|_| {
        HttpError::new(
            400,
            "InvalidFormat",
            "The body format is invalid. Please refer to the documentation",
        )
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http_body_util::{BodyExt, Full};
    use hyper::{header, Request, Response, StatusCode};
    use serde_json::{json, Value};

    use crate::{
        application::api::{
            person::PersonController,
            router::{route_requests, BoxBody},
        },
        domain::person::{
            MockRepository, MockValidator, PersonRepositoryError, PersonRulesValidator,
        },
        infrastructure::person::memory::memory_repository::InMemoryPersonRepository,
    };

    fn controller() -> PersonController {
        PersonController::new(
            Box::new(InMemoryPersonRepository::new()),
            Box::new(PersonRulesValidator::new()),
        )
    }

    async fn send(
        controller: &PersonController,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> Response<BoxBody> {
        send_to(controller.clone(), method, uri, body).await
    }

    async fn send_to(
        controller: PersonController,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> Response<BoxBody> {
        let payload = match body {
            Some(body) => Bytes::from(body.to_string()),
            None => Bytes::new(),
        };
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(payload))
            .unwrap();
        match route_requests(request, controller, false).await {
            Ok(r) => r,
            Err(e) => e.into(),
        }
    }

    async fn body_bytes(response: Response<BoxBody>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    async fn body_json(response: Response<BoxBody>) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn john() -> Value {
        json!({ "id": 1, "firstName": "John", "lastName": "Doe", "age": 30 })
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let controller = controller();
        let res = send(&controller, "POST", "/people", Some(john())).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()[header::LOCATION], "/people/1");
        assert_eq!(body_json(res).await, john());

        let res = send(&controller, "GET", "/people/1", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, john());
    }

    #[tokio::test]
    async fn test_create_invalid_person() {
        let controller = controller();
        let body = json!({ "id": 1, "firstName": null, "lastName": "Doe", "age": 30 });
        let res = send(&controller, "POST", "/people", Some(body)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res).await,
            json!([{ "propertyName": "FirstName", "errorMessage": "'First Name' must not be empty." }])
        );

        let res = send(&controller, "GET", "/people", None).await;
        assert_eq!(body_json(res).await, json!([]));
    }

    #[tokio::test]
    async fn test_invalid_fields_reported_on_create_and_update() {
        let controller = controller();
        send(&controller, "POST", "/people", Some(john())).await;
        let cases = [
            ("lastName", json!(null), "LastName"),
            ("firstName", json!(""), "FirstName"),
            ("lastName", json!("Abcdefghijk"), "LastName"),
            ("age", json!(121), "Age"),
            ("age", json!(-1), "Age"),
        ];
        for (field, value, property) in cases {
            let mut body = john();
            body[field] = value;
            for (method, uri) in [("POST", "/people"), ("PUT", "/people/1")] {
                let res = send(&controller, method, uri, Some(body.clone())).await;
                assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{} {}", method, field);
                let failures = body_json(res).await;
                let properties: Vec<&str> = failures
                    .as_array()
                    .unwrap()
                    .iter()
                    .filter_map(|f| f["propertyName"].as_str())
                    .collect();
                assert!(properties.contains(&property), "{} {}", method, field);
            }
        }
    }

    #[tokio::test]
    async fn test_update_with_mismatched_id() {
        let controller = controller();
        send(&controller, "POST", "/people", Some(john())).await;
        let mut body = john();
        body["firstName"] = json!("Johnny");
        let res = send(&controller, "PUT", "/people/2", Some(body)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(&body_bytes(res).await[..], b"Invalid id");

        let res = send(&controller, "GET", "/people/1", None).await;
        assert_eq!(body_json(res).await, john());
    }

    #[tokio::test]
    async fn test_update_replaces_person() {
        let controller = controller();
        send(&controller, "POST", "/people", Some(john())).await;
        let updated = json!({ "id": 1, "firstName": "Johnny", "lastName": "Doe", "age": 31 });
        let res = send(&controller, "PUT", "/people/1", Some(updated.clone())).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(res).await.is_empty());

        let res = send(&controller, "GET", "/people/1", None).await;
        assert_eq!(body_json(res).await, updated);
    }

    #[tokio::test]
    async fn test_update_missing_person() {
        let res = send(&controller(), "PUT", "/people/1", Some(john())).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_and_missing_lookups() {
        let controller = controller();
        send(&controller, "POST", "/people", Some(john())).await;

        let res = send(&controller, "DELETE", "/people/1", None).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = send(&controller, "DELETE", "/people/1", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(res).await.is_empty());

        let res = send(&controller, "GET", "/people/1", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(res).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_remaining_people() {
        let controller = controller();
        for (id, name) in [(1, "John"), (2, "Jane"), (3, "Jim")] {
            let body = json!({ "id": id, "firstName": name, "lastName": "Doe", "age": 30 });
            send(&controller, "POST", "/people", Some(body)).await;
        }
        send(&controller, "DELETE", "/people/2", None).await;

        for _ in 0..2 {
            let res = send(&controller, "GET", "/people", None).await;
            assert_eq!(res.status(), StatusCode::OK);
            let ids: Vec<i64> = body_json(res)
                .await
                .as_array()
                .unwrap()
                .iter()
                .filter_map(|p| p["id"].as_i64())
                .collect();
            assert_eq!(ids, vec![1, 3]);
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_id_conflicts() {
        let controller = controller();
        send(&controller, "POST", "/people", Some(john())).await;
        let res = send(&controller, "POST", "/people", Some(john())).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_malformed_requests() {
        let controller = controller();
        let res = send(&controller, "GET", "/people/abc", None).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "InvalidId");

        let res = send(&controller, "POST", "/people", None).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "InvalidFormat");


        let res = send(&controller, "GET", "/people/1/friends", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsupported_method_lists_allowed_ones() {
        let controller = controller();
        let res = send(&controller, "PATCH", "/people/1", Some(john())).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[header::ALLOW], "GET, PUT, DELETE");
        assert_eq!(body_json(res).await["error"], "MethodNotAllowed");

        let res = send(&controller, "PUT", "/people/", Some(john())).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[header::ALLOW], "GET, POST");

        let res = send(&controller, "DELETE", "/people", None).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_store_fault_is_hidden_behind_generic_error() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_people()
            .returning(|| Err(PersonRepositoryError::InternalError("secret".to_string())));
        let controller =
            PersonController::new(Box::new(repository), Box::new(MockValidator::new()));

        let res = send_to(controller, "GET", "/people", None).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_bytes(res).await;
        assert!(!String::from_utf8_lossy(&body).contains("secret"));
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "InternalError");
    }

    #[tokio::test]
    async fn test_valid_people_read_back_unchanged() {
        let controller = controller();
        let people = [
            json!({ "id": 1, "firstName": "J", "lastName": "Abcdefghij", "age": 0 }),
            json!({ "id": 2, "firstName": "Abcdefghij", "lastName": "D", "age": 120 }),
            json!({ "id": 3, "firstName": "Éléonoreée", "lastName": "Müller", "age": 45 }),
            json!({ "id": 0, "firstName": "Zoe", "lastName": "Doe", "age": 30 }),
        ];
        for person in people {
            let res = send(&controller, "POST", "/people", Some(person.clone())).await;
            assert_eq!(res.status(), StatusCode::CREATED, "{}", person);
            let location = res.headers()[header::LOCATION]
                .to_str()
                .unwrap()
                .to_string();
            let created = body_json(res).await;

            let mut expected = person.clone();
            if person["id"] == 0 {
                assert_eq!(location, "/people/4");
                expected["id"] = json!(4);
            }
            assert_eq!(created, expected);

            let res = send(&controller, "GET", &location, None).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(body_json(res).await, expected);
        }
    }
}
