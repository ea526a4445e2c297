use std::{convert::Infallible, fmt::Debug, future::Future, net::SocketAddr, time::Duration};

use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Full};
use hyper::{
    body::{Body, Buf},
    header::{self, HeaderValue},
    server::conn::http1,
    Method, Request, Response, StatusCode,
};
use hyper_util::{rt::TokioIo, service::TowerToHyperService};
use serde::Serialize;
use tokio::{
    net::TcpListener,
    sync::watch,
    task::JoinSet,
    time,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use crate::{
    application::api::{openapi, person::person_router},
    config::AppConfig,
};

use super::person::PersonController;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

#[derive(Debug, Serialize)]
pub struct HttpError<'a> {
    code: u16,
    error: &'a str,
    details: &'a str,
}
impl<'a> HttpError<'a> {
    pub fn new(code: u16, error: &'a str, details: &'a str) -> Self {
        HttpError {
            code,
            error,
            details,
        }
    }
}

pub const INTERNAL_ERROR: HttpError = HttpError {
    code: 500,
    error: "InternalError",
    details: "An internal error occured, please contact our technical service",
};

pub const NOT_FOUND_ERROR: HttpError = HttpError {
    code: 404,
    error: "NotFound",
    details: "The requested resource is not found",
};

#[derive(Debug)]
pub enum APIError {
    ConfigurationError(String),
    RequestError(HttpError<'static>),
}

impl From<APIError> for Response<BoxBody> {
    fn from(value: APIError) -> Self {
        match value {
            APIError::RequestError(err) => json_response(err.code, &err),
            APIError::ConfigurationError(e) => {
                error!("A configuration error reached a request: {}", e);
                json_response(INTERNAL_ERROR.code, &INTERNAL_ERROR)
            }
        }
    }
}

pub struct MainRouter {
    address: SocketAddr,
    docs_enabled: bool,
    person_controller: PersonController,
}

impl MainRouter {
    pub fn new(config: &AppConfig, person_controller: PersonController) -> Self {
        return Self {
            address: config.address,
            docs_enabled: config.is_development(),
            person_controller,
        };
    }

    /// Serves until Ctrl-C or SIGTERM, then waits for open connections to finish.
    pub async fn run(&self) -> Result<(), APIError> {
        let listener = TcpListener::bind(self.address)
            .await
            .map_err(|e| APIError::ConfigurationError(e.to_string()))?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Accepts connections on `listener` until `shutdown` resolves. Open
    /// connections are then asked to close once their current request is
    /// answered; the ones still open after `DRAIN_TIMEOUT` are aborted.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), APIError>
    where
        F: Future<Output = ()>,
    {
        let address = listener
            .local_addr()
            .map_err(|e| APIError::ConfigurationError(e.to_string()))?;
        info!(%address, docs = self.docs_enabled, "Listening");

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!(in_flight = connections.len(), "Shutdown signal received, draining connections");
                    break;
                }

                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(v) => v,
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);

                    let person_controller = self.person_controller.clone();
                    let docs_enabled = self.docs_enabled;
                    let mut shutdown_rx = shutdown_rx.clone();
                    connections.spawn(async move {
                        let cors = CorsLayer::new()
                            .allow_origin(AllowOrigin::any())
                            .allow_methods(vec![
                                Method::GET,
                                Method::POST,
                                Method::PUT,
                                Method::DELETE,
                                Method::OPTIONS,
                            ])
                            .allow_headers(vec![header::CONTENT_TYPE]);
                        let service = ServiceBuilder::new()
                            .layer(TraceLayer::new_for_http())
                            .layer(cors)
                            .service_fn(move |r| {
                                let person_controller = person_controller.clone();
                                async move {
                                    let res = match route_requests(r, person_controller, docs_enabled).await {
                                        Ok(r) => r,
                                        Err(e) => e.into(),
                                    };
                                    Ok::<Response<BoxBody>, Infallible>(res)
                                }
                            });
                        let connection = http1::Builder::new()
                            .serve_connection(io, TowerToHyperService::new(service));
                        tokio::pin!(connection);

                        let mut closing = false;
                        let res = loop {
                            tokio::select! {
                                res = connection.as_mut() => break res,
                                _ = shutdown_rx.changed(), if !closing => {
                                    connection.as_mut().graceful_shutdown();
                                    closing = true;
                                }
                            }
                        };
                        if let Err(err) = res {
                            error!(%peer, "Error serving connection: {:?}", err);
                        }
                    });
                }

                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        drop(listener);
        let _ = shutdown_tx.send(());
        let drained = time::timeout(DRAIN_TIMEOUT, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                remaining = connections.len(),
                "Connections still open after {:?}, aborting them", DRAIN_TIMEOUT
            );
            connections.shutdown().await;
        }
        info!("Server stopped");
        Ok(())
    }
}

pub async fn route_requests<B>(
    request: Request<B>,
    person_controller: PersonController,
    docs_enabled: bool,
) -> Result<Response<BoxBody>, APIError>
where
    B: Body,
    B::Error: Debug,
{
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    debug!("Request {}:{}", method.as_str(), path);
    let whole_body = request
        .collect()
        .await
        .map_err(|e| {
            error!("An internal error occured while reading the body: {:?}", e);
            APIError::RequestError(INTERNAL_ERROR)
        })?
        .aggregate();
    let body: serde_json::Value =
        serde_json::from_reader(whole_body.reader()).unwrap_or(serde_json::Value::Null);

    let mut splitted_path = path.split("/").skip(1);
    let resp = match splitted_path.next() {
        Some("people") => {
            let partial_path = &splitted_path.collect::<Vec<&str>>().join("/");
            person_router::router(partial_path, &method, body, &person_controller).await
        }
        Some("swagger") if docs_enabled && method == Method::GET => {
            let partial_path = splitted_path.collect::<Vec<&str>>().join("/");
            if partial_path != openapi::DOCUMENT_PATH {
                return Err(APIError::RequestError(NOT_FOUND_ERROR));
            }
            Ok(json_response(200, &openapi::document()))
        }
        _ => return Err(APIError::RequestError(NOT_FOUND_ERROR)),
    }
    .map_err(|e| {
        if e.code >= 500 {
            error!("An error occured: {:?}", e);
        } else {
            debug!("Request rejected: {:?}", e);
        }
        APIError::RequestError(e)
    })?;
    Ok(resp)
}

pub fn full<T: Into<Bytes>>(chunk: T) -> BoxBody {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty(status: StatusCode) -> Response<BoxBody> {
    let mut response = Response::new(Empty::<Bytes>::new().map_err(|never| match never {}).boxed());
    *response.status_mut() = status;
    response
}

pub fn json_response<T: Serialize>(code: u16, data: &T) -> Response<BoxBody> {
    let (status, payload) = match serde_json::to_vec(data) {
        Ok(payload) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            payload,
        ),
        Err(e) => {
            error!("An internal error occured while serializing a response: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
        }
    };
    let mut response = Response::new(full(payload));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
