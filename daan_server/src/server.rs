use std::time::Duration;

use actix_web::{dev::Server, error::JsonPayloadError, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use daan_engine::{events::EventProducers, DirectoryApi, SettlementApi, SqliteDatabase};
use log::*;

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    data_objects::CheckoutKey,
    errors::ServerError,
    integrations::{event_logging::create_logging_event_handlers, razorpay::RazorpayGateway},
    middleware::{HmacMiddlewareFactory, RAZORPAY_SIGNATURE_HEADER},
    routes::{
        health,
        AddFavoriteRoute,
        CreateDonationOrderRoute,
        EventProgressRoute,
        MyDonationStatsRoute,
        MyDonationsRoute,
        MyFavoritesRoute,
        RazorpayWebhookRoute,
        RemoveFavoriteRoute,
        VerifyDonationPaymentRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    let gateway = RazorpayGateway::new(config.razorpay_config.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_logging_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: RazorpayGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let settlement_api =
            SettlementApi::new(db.clone(), gateway.clone(), config.settlement.clone(), producers.clone());
        let directory_api = DirectoryApi::new(db.clone());
        let verifier = TokenVerifier::new(&config.auth);
        let checkout_key = CheckoutKey(gateway.key_id().to_string());
        let webhook_hmac = HmacMiddlewareFactory::new(
            RAZORPAY_SIGNATURE_HEADER,
            config.razorpay_config.webhook_secret.clone(),
            config.webhook_checks,
        );
        let api_scope = web::scope("/api")
            .service(CreateDonationOrderRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(VerifyDonationPaymentRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(MyDonationStatsRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(MyDonationsRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(MyFavoritesRoute::<SqliteDatabase>::new())
            .service(AddFavoriteRoute::<SqliteDatabase>::new())
            .service(RemoveFavoriteRoute::<SqliteDatabase>::new())
            .service(EventProgressRoute::<SqliteDatabase>::new());
        let razorpay_scope = web::scope("/razorpay")
            .wrap(webhook_hmac)
            .service(RazorpayWebhookRoute::<SqliteDatabase, RazorpayGateway>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("daan::access_log"))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .app_data(web::Data::new(settlement_api))
            .app_data(web::Data::new(directory_api))
            .app_data(web::Data::new(verifier))
            .app_data(web::Data::new(checkout_key))
            .service(health)
            .service(api_scope)
            .service(razorpay_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    info!("💻️ Server listening on {host}:{port}");
    Ok(srv)
}

/// Malformed JSON bodies get the same structured error responses as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let msg = match &err {
            JsonPayloadError::ContentType => "Expected a JSON body".to_string(),
            e => e.to_string(),
        };
        ServerError::InvalidRequestBody(msg).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| ServerError::InvalidRequestPath(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into())
}
