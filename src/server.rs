use crate::{
    aspect,
    config::Config,
    error::{ErrorKind, GenerationError},
    generator::ImageGenerator,
    models::{ErrorBody, ProviderKind},
};
use actix_web::{get, http::StatusCode, post, web, App, HttpResponse, HttpServer, ResponseError};
use serde::Serialize;
use std::io;

impl ResponseError for GenerationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.public_message(),
        })
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    providers: Vec<ProviderKind>,
}

#[post("/api/generate")]
async fn generate(
    generator: web::Data<ImageGenerator>,
    body: web::Bytes,
) -> Result<HttpResponse, GenerationError> {
    let response = generator.generate_from_json(&body).await.map_err(|e| {
        if e.kind() == ErrorKind::BadInput {
            log::warn!("Rejected generation request: {}", e);
        }
        e
    })?;

    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/presets")]
async fn presets() -> HttpResponse {
    HttpResponse::Ok().json(aspect::resolved_presets())
}

#[get("/api/health")]
async fn health(generator: web::Data<ImageGenerator>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        providers: generator.configured_providers(),
    })
}

/// Registers every route. Callers must also provide `web::Data<ImageGenerator>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(generate).service(presets).service(health);
}

pub async fn run(config: Config) -> io::Result<()> {
    let generator = ImageGenerator::new(&config)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let data = web::Data::new(generator);

    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(config.bind_address())?
        .run()
        .await
}
