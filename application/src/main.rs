use std::{
    future::IntoFuture as _,
    io,
    sync::{Arc, OnceLock},
    time,
};

use application::{api, graphql, Args, Config, Service, SessionCookie};
use axum::{
    extract::MatchedPath,
    routing::{on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use futures::TryFutureExt as _;
use service::infra::{appwrite, Appwrite, Dwolla, Plaid};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

/// [`log::Level`]s written to `stderr` rather than `stdout`.
const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

/// Maximum [`log::Level`] to write, set once the [`Config`] is loaded.
static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| is_written(meta, false))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| is_written(meta, true))),
        )
        .init();

    _ = start().await;
}

/// Decides whether an event described by the provided [`log::Metadata`] is
/// written to `stderr` (if `to_stderr`) or `stdout` (otherwise).
fn is_written(meta: &log::Metadata<'_>, to_stderr: bool) -> bool {
    if meta.is_span() {
        return true;
    }
    let max = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
    STDERR_LEVELS.contains(meta.level()) == to_stderr && max >= *meta.level()
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        server,
        service,
        session,
        appwrite,
        plaid,
        dwolla,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let appwrite = appwrite::Config::try_from(appwrite).map_err(|e| {
        log::error!("invalid `appwrite.endpoint` URL: {e}");
    })?;
    let service = Service::new(
        service.into(),
        Appwrite::new(appwrite),
        Plaid::new(plaid.into()),
        Dwolla::new(dwolla.into()),
    );

    let app = Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(Extension(Arc::new(api::schema())))
        .layer(Extension(service))
        .layer(Extension(SessionCookie::from(session)))
        .layer(cors(&server.cors.origins)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(record_response),
        );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app)
        .into_future()
        .map_err(|e| log::error!("webserver failed: {e}"))
        .await
}

/// Builds the [`CorsLayer`] allowing credentialed requests from the provided
/// `origins`.
///
/// Credentials carry the session cookie, so wildcard origins are not allowed.
fn cors(origins: &[String]) -> Result<CorsLayer, ()> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin.parse::<http::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not correct CORS origin: {e}");
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true))
}

/// Creates the [`tracing::Span`] of the provided HTTP request.
fn request_span<B>(req: &http::Request<B>) -> tracing::Span {
    let client_ip = InsecureClientIp::from(req.headers(), req.extensions())
        .map(|ip| ip.0.to_string())
        .ok();
    tracing::info_span!(
        "HTTP request",
        http.client_ip = client_ip,
        http.flavor = ?req.version(),
        http.host = req.uri().host(),
        http.method = req.method().as_str(),
        http.route = req
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
        http.scheme = req.uri().scheme().map(http::uri::Scheme::as_str),
        http.target = req
            .uri()
            .path_and_query()
            .map(http::uri::PathAndQuery::as_str),
        http.user_agent = req
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok()),
        http.status_code = tracing::field::Empty,
    )
}

/// Records the status and the duration of the provided HTTP response in its
/// [`tracing::Span`].
fn record_response<B>(
    resp: &http::Response<B>,
    dur: time::Duration,
    span: &tracing::Span,
) {
    let status = resp.status();
    span.record("http.status_code", tracing::field::display(status.as_u16()));

    let duration = format!("{}ms", dur.as_millis());
    if status.is_server_error() || status.is_client_error() {
        tracing::error!(duration = %duration);
    } else {
        tracing::info!(duration = %duration);
    }
}
