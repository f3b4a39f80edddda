//! Server-rendered HTML views.
//!
//! Pages are assembled in code; all interpolated data goes through
//! [`escape`] and course codes placed in URLs go through [`percent_encode`].

use registrar_core::Course;

/// A one-shot user-visible notice rendered at the top of a page.
#[derive(Debug, Clone)]
pub struct Flash {
    /// The notice text.
    pub message: String,
    /// Notice category, `error` or `success`.
    pub kind: String,
}

impl Flash {
    /// Creates an error flash.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "error".to_string(),
        }
    }

    /// Creates a success flash.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "success".to_string(),
        }
    }
}

/// Escapes text for interpolation into HTML.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Percent-encodes a value for use in a URL path segment or query value.
#[must_use]
pub fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let flash_html = flash
        .map(|f| {
            format!(
                "<p class=\"flash {}\">{}</p>\n",
                escape(&f.kind),
                escape(&f.message)
            )
        })
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>{} - Course Catalog</title></head>\n\
         <body>\n\
         <nav><a href=\"/\">Home</a> | <a href=\"/catalog\">Catalog</a> | \
         <a href=\"/add_course\">Add Course</a></nav>\n\
         {}{}\n\
         </body>\n\
         </html>\n",
        escape(title),
        flash_html,
        body
    )
}

/// Renders the index page.
#[must_use]
pub fn index_page() -> String {
    layout(
        "Home",
        None,
        "<h1>Course Catalog</h1>\n\
         <p>Browse the <a href=\"/catalog\">catalog</a> or \
         <a href=\"/add_course\">add a course</a>.</p>",
    )
}

/// Renders the catalog listing.
#[must_use]
pub fn catalog_page(courses: &[Course], flash: Option<&Flash>) -> String {
    let body = if courses.is_empty() {
        "<h1>Catalog</h1>\n<p>No courses in the catalog yet.</p>".to_string()
    } else {
        let rows: String = courses
            .iter()
            .map(|course| {
                format!(
                    "<tr>\
                     <td><a href=\"/course/{}\">{}</a></td>\
                     <td>{}</td><td>{}</td><td>{}</td>\
                     <td><form method=\"post\" action=\"/delete_course/{}\">\
                     <button type=\"submit\">Delete</button></form></td>\
                     </tr>\n",
                    percent_encode(&course.code),
                    escape(&course.code),
                    escape(&course.name),
                    escape(&course.instructor),
                    escape(&course.semester),
                    percent_encode(&course.code),
                )
            })
            .collect();

        format!(
            "<h1>Catalog</h1>\n\
             <table>\n\
             <tr><th>Code</th><th>Name</th><th>Instructor</th><th>Semester</th><th></th></tr>\n\
             {rows}</table>"
        )
    };

    layout("Catalog", flash, &body)
}

/// Renders the add-course form.
#[must_use]
pub fn add_course_page(flash: Option<&Flash>) -> String {
    let body = "<h1>Add Course</h1>\n\
         <form method=\"post\" action=\"/add_course\">\n\
         <label>Code <input name=\"code\"></label><br>\n\
         <label>Name <input name=\"name\"></label><br>\n\
         <label>Instructor <input name=\"instructor\"></label><br>\n\
         <label>Semester <input name=\"semester\"></label><br>\n\
         <label>Schedule <input name=\"schedule\"></label><br>\n\
         <label>Classroom <input name=\"classroom\"></label><br>\n\
         <label>Prerequisites <input name=\"prerequisites\"></label><br>\n\
         <label>Grading <input name=\"grading\"></label><br>\n\
         <button type=\"submit\">Add</button>\n\
         </form>\n\
         <p>Code, name, and instructor are required.</p>";

    layout("Add Course", flash, body)
}

/// Renders the detail page for one course.
#[must_use]
pub fn course_details_page(course: &Course) -> String {
    let body = format!(
        "<h1>{} — {}</h1>\n\
         <dl>\n\
         <dt>Instructor</dt><dd>{}</dd>\n\
         <dt>Semester</dt><dd>{}</dd>\n\
         <dt>Schedule</dt><dd>{}</dd>\n\
         <dt>Classroom</dt><dd>{}</dd>\n\
         <dt>Prerequisites</dt><dd>{}</dd>\n\
         <dt>Grading</dt><dd>{}</dd>\n\
         </dl>\n\
         <form method=\"post\" action=\"/delete_course/{}\">\
         <button type=\"submit\">Delete</button></form>\n\
         <p><a href=\"/catalog\">Back to catalog</a></p>",
        escape(&course.code),
        escape(&course.name),
        escape(&course.instructor),
        escape(&course.semester),
        escape(&course.schedule),
        escape(&course.classroom),
        escape(&course.prerequisites),
        escape(&course.grading),
        percent_encode(&course.code),
    );

    layout(&course.code, None, &body)
}

/// Renders a minimal error page.
#[must_use]
pub fn error_page(message: &str) -> String {
    layout(
        "Error",
        None,
        &format!("<h1>Something went wrong</h1>\n<p>{}</p>", escape(message)),
    )
}
