use std::collections::BTreeMap;
use std::io;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use privacypsi::paillier::{Ciphertext, PublicKey};
use privacypsi::{PartitionedPsi, PartitionedPsiEncryptum, PsiConfig, PsiError};

/// Labeled reference sets, built once on startup and read-only afterwards
static INDEX: OnceCell<PartitionedPsi> = OnceCell::new();

/// Counterparty query: its public key and the sparse encryption of its terms
#[derive(Deserialize)]
struct CardinalityRequest {
    public_key: PublicKey,
    encryptum: PartitionedPsiEncryptum,
}

/// One encrypted intersection size per label; only the key holder can read them
#[derive(Serialize)]
struct CardinalityResponse {
    cardinalities: BTreeMap<String, Ciphertext>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// POST /cardinality
/// { "public_key": {...}, "encryptum": { "partitionIds": [...], "ciphertextVectors": [[...]] } }
async fn cardinality(body: web::Json<CardinalityRequest>) -> impl Responder {
    let Some(index) = INDEX.get() else {
        return HttpResponse::ServiceUnavailable().body("index not ready");
    };
    let req = body.into_inner();

    let result =
        web::block(move || index.cardinality_all(&req.public_key, &req.encryptum)).await;
    match result {
        Ok(Ok(cardinalities)) => HttpResponse::Ok().json(CardinalityResponse { cardinalities }),
        Ok(Err(e)) => {
            warn!(error = %e, "rejected cardinality query");
            HttpResponse::BadRequest().body(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "cardinality worker failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn invalid_input(e: PsiError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("PRIVACYSERVER_CONFIG") {
        Ok(path) => PsiConfig::load(path),
        Err(_) => Ok(PsiConfig::default()),
    }
    .map_err(invalid_input)?;

    let index = config.build_index().map_err(invalid_input)?;
    INDEX
        .set(index)
        .map_err(|_| io::Error::other("index already initialised"))?;

    info!(
        bind = %config.bind,
        partitions = config.partitions,
        sets = config.sets.len(),
        "starting privacy server"
    );

    HttpServer::new(|| {
        App::new()
            .app_data(web::JsonConfig::default().limit(32 << 20))
            .route("/health", web::get().to(health))
            .route("/cardinality", web::post().to(cardinality))
    })
    .bind(config.bind.as_str())?
    .run()
    .await
}
