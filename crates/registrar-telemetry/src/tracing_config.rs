//! Distributed tracing configuration.

use std::time::Duration;

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
    Resource,
};

use crate::TelemetryConfig;

/// Guard for the tracing provider that shuts down on drop.
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl std::fmt::Debug for TracingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracingGuard")
            .field("active", &self.provider.is_some())
            .finish()
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::warn!("Error shutting down tracer provider: {:?}", e);
            }
        }
    }
}

/// Initializes distributed tracing with OpenTelemetry.
///
/// # Errors
///
/// Returns an error if tracing cannot be initialized.
pub fn init_tracing(
    config: &TelemetryConfig,
) -> Result<TracingGuard, Box<dyn std::error::Error + Send + Sync>> {
    let provider = if let Some(endpoint) = &config.otlp_endpoint {
        tracing::info!(endpoint = %endpoint, "Initializing OTLP tracing");

        #[cfg(feature = "otlp")]
        {
            use opentelemetry_otlp::{SpanExporter, WithExportConfig};

            // Build OTLP exporter with tonic
            let exporter = SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .with_timeout(Duration::from_secs(10))
                .build()?;

            // Build resource with service info
            let resource = Resource::builder()
                .with_service_name(config.service_name.clone())
                .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
                .build();

            // Build the provider
            let provider = SdkTracerProvider::builder()
                .with_batch_exporter(exporter)
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource)
                .build();

            // Set global tracer provider
            let _ = global::set_tracer_provider(provider.clone());

            tracing::info!(
                service = %config.service_name,
                endpoint = %endpoint,
                "OTLP tracing initialized"
            );

            Some(provider)
        }

        #[cfg(not(feature = "otlp"))]
        {
            tracing::warn!("OTLP feature not enabled, tracing will be local only");
            None
        }
    } else {
        tracing::debug!("No OTLP endpoint configured, using local tracing only");
        None
    };

    Ok(TracingGuard { provider })
}

/// Creates a tracer for a specific component.
#[must_use]
pub fn create_tracer(component: &str) -> opentelemetry::global::BoxedTracer {
    global::tracer(component.to_string())
}

/// Per-request span attributes.
///
/// Collects the attributes a route handler records on its span: the HTTP
/// method and URL on every route, the route-specific course attributes, and
/// the processing time measured at the end of the handler.
#[derive(Debug, Clone)]
pub struct RequestSpan {
    /// HTTP method of the request.
    pub method: String,
    /// Full request URL.
    pub url: String,
    /// Course code, for routes addressing a single course.
    pub course_code: Option<String>,
    /// Course count, for the catalog listing.
    pub course_count: Option<usize>,
    /// Client address, when recorded.
    pub client_ip: Option<String>,
    /// Handler processing time in milliseconds.
    pub processing_time_ms: Option<f64>,
}

impl RequestSpan {
    /// Creates a new request span for the given method and URL.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            course_code: None,
            course_count: None,
            client_ip: None,
            processing_time_ms: None,
        }
    }

    /// Records the course code.
    pub fn record_course_code(&mut self, code: impl Into<String>) {
        self.course_code = Some(code.into());
    }

    /// Records the catalog size.
    pub fn record_course_count(&mut self, count: usize) {
        self.course_count = Some(count);
    }

    /// Records the client address.
    pub fn record_client_ip(&mut self, ip: impl Into<String>) {
        self.client_ip = Some(ip.into());
    }

    /// Records the handler processing time.
    pub fn record_processing_time(&mut self, elapsed_ms: f64) {
        self.processing_time_ms = Some(elapsed_ms);
    }

    /// Converts to OpenTelemetry attributes.
    #[must_use]
    pub fn to_attributes(&self) -> Vec<KeyValue> {
        let mut attrs = vec![
            KeyValue::new("http.method", self.method.clone()),
            KeyValue::new("http.url", self.url.clone()),
        ];

        if let Some(code) = &self.course_code {
            attrs.push(KeyValue::new("course.code", code.clone()));
        }

        if let Some(count) = self.course_count {
            attrs.push(KeyValue::new("course.count", count as i64));
        }

        if let Some(ip) = &self.client_ip {
            attrs.push(KeyValue::new("user.ip", ip.clone()));
        }

        if let Some(elapsed) = self.processing_time_ms {
            attrs.push(KeyValue::new("processing_time_ms", elapsed));
        }

        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_span_attributes() {
        let mut span = RequestSpan::new("GET", "/catalog");
        span.record_course_count(3);
        span.record_client_ip("127.0.0.1");
        span.record_processing_time(2.5);

        let attrs = span.to_attributes();
        assert!(attrs.iter().any(|kv| kv.key.as_str() == "http.method"));
        assert!(attrs.iter().any(|kv| kv.key.as_str() == "course.count"));
        assert!(attrs.iter().any(|kv| kv.key.as_str() == "user.ip"));
        assert!(attrs
            .iter()
            .any(|kv| kv.key.as_str() == "processing_time_ms"));
    }

    #[test]
    fn test_request_span_omits_unset_attributes() {
        let span = RequestSpan::new("GET", "/");
        let attrs = span.to_attributes();
        assert_eq!(attrs.len(), 2);
        assert!(!attrs.iter().any(|kv| kv.key.as_str() == "course.code"));
    }
}
