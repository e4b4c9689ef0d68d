use crate::{
    config::Config,
    error::RelayError,
    models::{ErrorBody, GenerateImageRequest},
    relay::Relay,
};
use actix_web::{
    error::InternalError,
    http::{header::ContentType, StatusCode},
    middleware, web, App, HttpResponse, HttpServer, ResponseError,
};

pub const GENERATE_IMAGE_PATH: &str = "/api/generate-image";

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Message shown to the caller for any unrecovered downstream failure.
pub const GENERATION_FAILED: &str = "Failed to generate image";

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            RelayError::InvalidRequest(msg) => ErrorBody::new(msg.clone()),
            other => ErrorBody::new(GENERATION_FAILED).with_details(other.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

async fn generate_image(
    relay: web::Data<Relay>,
    body: web::Json<GenerateImageRequest>,
) -> Result<HttpResponse, RelayError> {
    let response = relay.generate(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected request body: {}", err);
        let body = ErrorBody::new("Invalid request body").with_details(err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Registers the page, the health probe and the relay endpoint. The caller
/// provides the `Relay` as app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route(GENERATE_IMAGE_PATH, web::post().to(generate_image));
}

/// Headers that restrict which origins may embed the page in a frame.
pub fn framing_headers(frame_ancestors: Option<&str>) -> middleware::DefaultHeaders {
    let headers = middleware::DefaultHeaders::new();
    match frame_ancestors {
        Some(origin) => headers
            .add((
                "Content-Security-Policy",
                format!("frame-ancestors 'self' {}", origin),
            ))
            .add(("X-Frame-Options", format!("ALLOW-FROM {}", origin))),
        None => headers,
    }
}

pub async fn run(config: Config, relay: Relay) -> std::io::Result<()> {
    let relay = web::Data::new(relay);
    let frame_ancestors = config.frame_ancestors.clone();
    let bind_address = config.bind_address();

    log::info!("🌐 Listening on http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(relay.clone())
            .wrap(framing_headers(frame_ancestors.as_deref()))
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .configure(routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
