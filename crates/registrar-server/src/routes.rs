//! Route handlers.
//!
//! Each handler runs inside a tracing span named after the route, performs
//! whole-file reads/writes through the catalog store, appends one entry to
//! the event log, and renders a view or redirects.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Form, Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::field::Empty;

use registrar_core::{Course, Error};
use registrar_telemetry::{LogEvent, RequestSpan, Timer};

use crate::server::AppState;
use crate::views::{self, Flash};

/// Flash message carried across a redirect as query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    flash: Option<String>,
    kind: Option<String>,
}

impl FlashQuery {
    fn into_flash(self) -> Option<Flash> {
        let message = self.flash?;
        let kind = self.kind.unwrap_or_else(|| "error".to_string());
        Some(Flash { message, kind })
    }
}

/// Submitted add-course form. Absent fields deserialize as empty strings and
/// fail validation rather than the extraction.
#[derive(Debug, Default, Deserialize)]
pub struct CourseForm {
    #[serde(default)]
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    instructor: String,
    #[serde(default)]
    semester: String,
    #[serde(default)]
    schedule: String,
    #[serde(default)]
    classroom: String,
    #[serde(default)]
    prerequisites: String,
    #[serde(default)]
    grading: String,
}

impl CourseForm {
    fn into_course(self) -> Course {
        Course {
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            instructor: self.instructor.trim().to_string(),
            semester: self.semester.trim().to_string(),
            schedule: self.schedule.trim().to_string(),
            classroom: self.classroom.trim().to_string(),
            prerequisites: self.prerequisites.trim().to_string(),
            grading: self.grading.trim().to_string(),
        }
    }
}

fn redirect_with_flash(flash: &Flash) -> Redirect {
    Redirect::to(&format!(
        "/catalog?flash={}&kind={}",
        views::percent_encode(&flash.message),
        views::percent_encode(&flash.kind)
    ))
}

fn storage_error(error: &Error) -> Response {
    tracing::error!(error = %error, "Catalog storage failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(views::error_page(
            "The course catalog could not be read or written.",
        )),
    )
        .into_response()
}

/// `GET /` — index page.
#[tracing::instrument(
    name = "index-page",
    skip_all,
    fields(http.method = "GET", http.url = %uri, processing_time_ms = Empty)
)]
pub async fn index(State(state): State<Arc<AppState>>, uri: Uri) -> Html<String> {
    let timer = Timer::start();
    state.metrics.record_request();

    let elapsed = timer.elapsed_ms();
    tracing::Span::current().record("processing_time_ms", elapsed);
    state.events.record(
        LogEvent::new("index-page")
            .with("method", "GET")
            .with("url", uri.to_string())
            .with("processing_time_ms", elapsed),
    );

    Html(views::index_page())
}

/// `GET /catalog` — list all courses.
#[tracing::instrument(
    name = "course-catalog",
    skip_all,
    fields(
        http.method = "GET",
        http.url = %uri,
        user.ip = %addr.ip(),
        course.count = Empty,
        processing_time_ms = Empty,
    )
)]
pub async fn course_catalog(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
    Query(query): Query<FlashQuery>,
) -> Response {
    let timer = Timer::start();
    state.metrics.record_request();

    let courses = match state.catalog.load() {
        Ok(courses) => courses,
        Err(e) => return storage_error(&e),
    };

    let span = tracing::Span::current();
    span.record("course.count", courses.len() as u64);

    let elapsed = timer.elapsed_ms();
    span.record("processing_time_ms", elapsed);
    state.events.record(
        LogEvent::new("catalog-page")
            .with("method", "GET")
            .with("course_count", courses.len() as u64)
            .with("processing_time_ms", elapsed),
    );

    Html(views::catalog_page(&courses, query.into_flash().as_ref())).into_response()
}

/// `GET /add_course` — render the add form.
#[tracing::instrument(
    name = "add-course-page",
    skip_all,
    fields(http.method = "GET", http.url = %uri, processing_time_ms = Empty)
)]
pub async fn add_course_form(State(state): State<Arc<AppState>>, uri: Uri) -> Html<String> {
    let timer = Timer::start();
    state.metrics.record_request();

    let elapsed = timer.elapsed_ms();
    tracing::Span::current().record("processing_time_ms", elapsed);
    state.events.record(
        LogEvent::new("add-course-page")
            .with("method", "GET")
            .with("url", uri.to_string())
            .with("processing_time_ms", elapsed),
    );

    Html(views::add_course_page(None))
}

/// `POST /add_course` — validate the form and append to the catalog.
#[tracing::instrument(
    name = "add-course-submit",
    skip_all,
    fields(
        http.method = "POST",
        http.url = %uri,
        course.code = Empty,
        course.name = Empty,
        processing_time_ms = Empty,
    )
)]
pub async fn add_course_submit(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    Form(form): Form<CourseForm>,
) -> Response {
    let timer = Timer::start();
    state.metrics.record_request();

    let course = form.into_course();

    let missing = course.missing_required_fields();
    if !missing.is_empty() {
        state.metrics.record_error();
        state
            .events
            .record(LogEvent::warning("add-course-error").with("missing_fields", missing.clone()));
        let flash = Flash::error(format!(
            "The following required fields are missing: {}",
            missing.join(", ")
        ));
        return Html(views::add_course_page(Some(&flash))).into_response();
    }

    if let Err(e) = state.catalog.append(course.clone()) {
        return storage_error(&e);
    }
    state.metrics.record_course_added();

    let span = tracing::Span::current();
    span.record("course.code", course.code.as_str());
    span.record("course.name", course.name.as_str());

    let elapsed = timer.elapsed_ms();
    span.record("processing_time_ms", elapsed);
    state.events.record(
        LogEvent::new("course-added")
            .with("course_code", course.code.clone())
            .with("course_name", course.name.clone())
            .with("processing_time_ms", elapsed),
    );

    Redirect::to("/catalog").into_response()
}

/// `GET /course/{code}` — detail page for the first course with the code.
#[tracing::instrument(
    name = "course-details",
    skip_all,
    fields(
        http.method = "GET",
        http.url = %uri,
        course.code = %code,
        processing_time_ms = Empty,
    )
)]
pub async fn course_details(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    uri: Uri,
) -> Response {
    let timer = Timer::start();
    state.metrics.record_request();

    match state.catalog.find(&code) {
        Ok(Some(course)) => {
            let elapsed = timer.elapsed_ms();
            tracing::Span::current().record("processing_time_ms", elapsed);
            state.events.record(
                LogEvent::new("course-details-viewed")
                    .with("course_code", code)
                    .with("processing_time_ms", elapsed),
            );
            Html(views::course_details_page(&course)).into_response()
        }
        Ok(None) => {
            state.metrics.record_error();
            state
                .events
                .record(LogEvent::warning("course-not-found").with("course_code", code.clone()));
            redirect_with_flash(&Flash::error(format!(
                "No course found with code '{code}'."
            )))
            .into_response()
        }
        Err(e) => storage_error(&e),
    }
}

/// `POST /delete_course/{code}` — remove every course with the code.
#[tracing::instrument(
    name = "delete-course",
    skip_all,
    fields(
        http.method = "POST",
        http.url = %uri,
        course.code = %code,
        processing_time_ms = Empty,
    )
)]
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    uri: Uri,
) -> Response {
    let timer = Timer::start();
    state.metrics.record_request();

    match state.catalog.remove(&code) {
        Ok(_removed) => {
            state.metrics.record_course_deleted();

            let elapsed = timer.elapsed_ms();
            tracing::Span::current().record("processing_time_ms", elapsed);
            state.events.record(
                LogEvent::new("course-deleted")
                    .with("course_code", code.clone())
                    .with("processing_time_ms", elapsed),
            );
            redirect_with_flash(&Flash::success(format!(
                "Course with code {code} has been deleted successfully."
            )))
            .into_response()
        }
        Err(Error::CourseNotFound { .. }) => {
            state.metrics.record_error();
            state
                .events
                .record(LogEvent::warning("course-not-found").with("course_code", code.clone()));
            redirect_with_flash(&Flash::error(format!(
                "No course found with code '{code}'."
            )))
            .into_response()
        }
        Err(e) => storage_error(&e),
    }
}

/// `GET /manual-trace` — diagnostic route emitting one hand-built span
/// through the global tracer.
pub async fn manual_trace(State(state): State<Arc<AppState>>, uri: Uri) -> &'static str {
    use opentelemetry::trace::{Span, SpanKind, Tracer};

    let timer = Timer::start();
    state.metrics.record_request();

    let mut request_span = RequestSpan::new("GET", uri.to_string());
    request_span.record_processing_time(timer.elapsed_ms());

    let tracer = registrar_telemetry::create_tracer("registrar-server");
    let mut span = tracer
        .span_builder("manual-span")
        .with_kind(SpanKind::Server)
        .start(&tracer);
    span.set_attributes(request_span.to_attributes());
    span.end();

    state.events.record(
        LogEvent::new("manual-trace")
            .with("method", "GET")
            .with("url", uri.to_string())
            .with("processing_time_ms", timer.elapsed_ms()),
    );

    "Manual trace finished"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerConfig;
    use axum::http::header::LOCATION;

    fn test_state(dir: &tempfile::TempDir) -> Arc<AppState> {
        let config = ServerConfig::builder()
            .course_file(dir.path().join("course_catalog.json"))
            .event_log_file(dir.path().join("logoutput.json"))
            .build();
        Arc::new(AppState::new(&config).unwrap())
    }

    fn full_form() -> CourseForm {
        CourseForm {
            code: " CS101 ".to_string(),
            name: "Intro to Computer Science".to_string(),
            instructor: "Prof. Byrd".to_string(),
            semester: "Fall 2025".to_string(),
            ..CourseForm::default()
        }
    }

    fn local_addr() -> ConnectInfo<SocketAddr> {
        ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000)))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> String {
        response
            .headers()
            .get(LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_index_renders() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response = index(State(state.clone()), Uri::from_static("/"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Course Catalog"));

        let events = state.events.read_all().unwrap();
        assert_eq!(events.last().unwrap().event, "index-page");
    }

    #[tokio::test]
    async fn test_add_course_increases_catalog_by_one() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response = add_course_submit(
            State(state.clone()),
            Uri::from_static("/add_course"),
            Form(full_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/catalog");
        assert_eq!(state.catalog.count().unwrap(), 1);

        // Fields were trimmed before storage.
        let stored = state.catalog.find("CS101").unwrap().unwrap();
        assert_eq!(stored.code, "CS101");

        assert_eq!(state.metrics.added(), 1);
        let events = state.events.read_all().unwrap();
        assert_eq!(events.last().unwrap().event, "course-added");
    }

    #[tokio::test]
    async fn test_add_course_missing_fields_rerenders_form() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let form = CourseForm {
            semester: "Fall 2025".to_string(),
            ..CourseForm::default()
        };
        let response = add_course_submit(
            State(state.clone()),
            Uri::from_static("/add_course"),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("The following required fields are missing: code, name, instructor"));

        assert_eq!(state.catalog.count().unwrap(), 0);
        assert_eq!(state.metrics.errors(), 1);
        let events = state.events.read_all().unwrap();
        assert_eq!(events.last().unwrap().event, "add-course-error");
        assert_eq!(events.last().unwrap().level, "warning");
    }

    #[tokio::test]
    async fn test_catalog_lists_courses() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        add_course_submit(
            State(state.clone()),
            Uri::from_static("/add_course"),
            Form(full_form()),
        )
        .await;

        let response = course_catalog(
            State(state.clone()),
            local_addr(),
            Uri::from_static("/catalog"),
            Query(FlashQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("CS101"));
        assert!(body.contains("Intro to Computer Science"));

        let events = state.events.read_all().unwrap();
        assert_eq!(events.last().unwrap().event, "catalog-page");
        assert_eq!(events.last().unwrap().fields["course_count"], 1);
    }

    #[tokio::test]
    async fn test_catalog_renders_flash_from_query() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let query = FlashQuery {
            flash: Some("No course found with code 'CS999'.".to_string()),
            kind: Some("error".to_string()),
        };
        let response = course_catalog(
            State(state),
            local_addr(),
            Uri::from_static("/catalog"),
            Query(query),
        )
        .await;

        let body = body_string(response).await;
        assert!(body.contains("flash error"));
        assert!(body.contains("No course found with code"));
    }

    #[tokio::test]
    async fn test_course_details_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        add_course_submit(
            State(state.clone()),
            Uri::from_static("/add_course"),
            Form(full_form()),
        )
        .await;

        let response = course_details(
            State(state.clone()),
            Path("CS101".to_string()),
            Uri::from_static("/course/CS101"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Prof. Byrd"));

        let events = state.events.read_all().unwrap();
        assert_eq!(events.last().unwrap().event, "course-details-viewed");
    }

    #[tokio::test]
    async fn test_course_details_unknown_redirects_with_error_flash() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response = course_details(
            State(state.clone()),
            Path("CS999".to_string()),
            Uri::from_static("/course/CS999"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        assert!(target.starts_with("/catalog?flash="));
        assert!(target.ends_with("&kind=error"));

        let events = state.events.read_all().unwrap();
        assert_eq!(events.last().unwrap().event, "course-not-found");
    }

    #[tokio::test]
    async fn test_delete_course_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        add_course_submit(
            State(state.clone()),
            Uri::from_static("/add_course"),
            Form(full_form()),
        )
        .await;

        let response = delete_course(
            State(state.clone()),
            Path("CS101".to_string()),
            Uri::from_static("/delete_course/CS101"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).ends_with("&kind=success"));
        assert_eq!(state.catalog.count().unwrap(), 0);
        assert_eq!(state.metrics.deleted(), 1);

        let events = state.events.read_all().unwrap();
        assert_eq!(events.last().unwrap().event, "course-deleted");
    }

    #[tokio::test]
    async fn test_delete_unknown_course_redirects_with_error_flash() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response = delete_course(
            State(state.clone()),
            Path("CS999".to_string()),
            Uri::from_static("/delete_course/CS999"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).ends_with("&kind=error"));
        assert_eq!(state.metrics.errors(), 1);
    }

    #[tokio::test]
    async fn test_manual_trace_returns_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let body = manual_trace(State(state.clone()), Uri::from_static("/manual-trace")).await;
        assert_eq!(body, "Manual trace finished");

        let events = state.events.read_all().unwrap();
        assert_eq!(events.last().unwrap().event, "manual-trace");
    }
}
