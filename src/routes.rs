//! HTTP surface: binds each route's inputs, validates them, calls the
//! handler and serializes the result with the route's status.
//!
//! | Method | Path | Input |
//! |---|---|---|
//! | GET  | `/` | none |
//! | POST | `/person/new` | JSON `Person` |
//! | GET  | `/person/detail` | query `name?`, `age` (deprecated) |
//! | GET  | `/person/detail/{person_id}` | path id |
//! | PUT  | `/person/{person_id}` | path id, JSON `{person, location}` |
//! | POST | `/login` | form `username`, `password` |
//! | POST | `/contact` | form fields, `User-Agent` header, `ads` cookie |
//! | POST | `/post-image` | multipart file `image` |

use crate::error::ApiError;
use crate::handlers;
use crate::health;
use crate::request::Request;
use crate::response::{Json, Response};
use crate::router::Router;
use crate::schema::{
    ContactForm, LoginForm, LoginOut, Person, PersonPath, PersonQuery, UpdatePerson,
};
use crate::state::AppState;
use crate::status::Status;
use crate::validate::validated;

/// The complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .with_state(state)
        .get("/", home)
        .post("/person/new", create_person)
        .get("/person/detail", show_person_query)
        .get("/person/detail/{person_id}", show_person)
        .put("/person/{person_id}", update_person)
        .post("/login", login)
        .post("/contact", contact)
        .post("/post-image", post_image)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
}

async fn home(_req: Request) -> Response {
    Response::builder().json_value(&handlers::home())
}

async fn create_person(req: Request) -> Result<Response, ApiError> {
    let person: Person = req.json()?;
    Ok(Response::builder()
        .status(Status::Created)
        .json_value(&handlers::create_person(person)))
}

async fn show_person_query(req: Request) -> Result<Response, ApiError> {
    let query: PersonQuery = req.query()?;
    Ok(Response::builder()
        .header("deprecation", "true")
        .json_value(&handlers::show_person_query(query)))
}

async fn show_person(req: Request) -> Result<Response, ApiError> {
    let PersonPath { person_id } = person_path(&req)?;
    let found = handlers::show_person(&req.state().persons, person_id)?;
    Ok(Response::builder().json_value(&found))
}

async fn update_person(req: Request) -> Result<Response, ApiError> {
    // Path and body are bound independently so both sets of errors are reported.
    let path = person_path(&req);
    let body = req.json::<UpdatePerson>();
    let (PersonPath { person_id }, update) = merge_errors(path, body)?;
    let merged = handlers::update_person(person_id, update)?;
    Ok(Response::builder().json_value(&merged))
}

async fn login(req: Request) -> Result<Json<LoginOut>, ApiError> {
    let form: LoginForm = req.form()?;
    Ok(Json(handlers::login(form)))
}

async fn contact(req: Request) -> Result<Json<Option<String>>, ApiError> {
    let form: ContactForm = req.form()?;
    let user_agent = req.header("user-agent").map(str::to_owned);
    let ads = req.cookie("ads").map(str::to_owned);
    Ok(Json(handlers::contact(form, user_agent, ads)))
}

async fn post_image(req: Request) -> Result<Response, ApiError> {
    let file = req.upload("image").await?;
    Ok(Response::builder().json_value(&handlers::post_image(file)))
}

fn person_path(req: &Request) -> Result<PersonPath, ApiError> {
    validated(PersonPath { person_id: req.path_param("person_id")? }, "path")
}

/// Combines two independent bindings, concatenating validation errors when
/// both fail.
fn merge_errors<A, B>(a: Result<A, ApiError>, b: Result<B, ApiError>) -> Result<(A, B), ApiError> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(ApiError::Validation(mut x)), Err(ApiError::Validation(y))) => {
            x.extend(y);
            Err(ApiError::Validation(x))
        }
        (Err(e), _) | (_, Err(e)) => Err(e),
    }
}
