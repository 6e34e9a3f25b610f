use std::{fmt::Display, time::Duration};

use actix_web::{
    dev::{Server, Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::KeepAlive,
    middleware::Logger,
    web,
    web::ServiceConfig,
    App,
    Error,
    HttpRequest,
    HttpServer,
    Scope,
};
use futures::future::{ok, Either};
use grounds_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    CheckoutApi,
    MarketplaceDatabase,
    NotificationSink,
    OrderFlowApi,
    ParticipantApi,
    PaymentApi,
    PaymentGateway,
    SqliteDatabase,
};
use log::*;

use crate::{
    auth::TokenVerifier,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    helpers::{get_remote_ip, is_whitelisted},
    integrations::gateway::GatewayClient,
    routes::{
        health,
        AddToCartRoute,
        CancelTransactionRoute,
        CreatePaymentSessionRoute,
        CreateTransactionRoute,
        GatewayNotificationRoute,
        ListTransactionsRoute,
        MyCartRoute,
        TransactionByIdRoute,
        TransactionHistoryRoute,
        TransactionSummaryRoute,
        UpdateStatusRoute,
    },
    sweep_worker::start_sweep_worker,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    info!("🚀️ Database is ready at {}", config.database_url);
    let gateway =
        GatewayClient::new(config.gateway.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(config.event_buffer_size, create_event_hooks(db.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let _sweep = start_sweep_worker(db.clone(), producers.clone(), config.pending_order_timeout, config.sweep_interval);
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Notifications are stored for the participants to fetch. Status changes are only logged.
pub fn create_event_hooks(sink: SqliteDatabase) -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_notification(move |ev| {
        let sink = sink.clone();
        Box::pin(async move {
            debug!("📬️ {} notification for {}", ev.category, ev.recipient_id);
            if let Err(e) = sink.enqueue(&ev).await {
                warn!("📬️ Could not store notification for {}. It is dropped. {e}", ev.recipient_id);
            }
        })
    });
    hooks.on_status_changed(|ev| {
        Box::pin(async move {
            let t = &ev.transaction;
            info!("📬️ Transaction #{} moved from {} to {} by {}", t.id, ev.from, t.status, ev.actor);
        })
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: GatewayClient,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let verifier = TokenVerifier::new(&config.auth);
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), producers.clone());
        let flow_api = OrderFlowApi::new(db.clone(), producers.clone());
        let participant_api = ParticipantApi::new(db.clone());
        let payment_api = PaymentApi::new(db.clone(), gateway.clone(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("gm::access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(participant_api))
            .app_data(web::Data::new(payment_api))
            .app_data(web::Data::new(verifier.clone()))
            .service(health)
            .service(web::scope("/api").configure(configure_api::<SqliteDatabase, GatewayClient>))
            .service(gateway_scope::<SqliteDatabase, GatewayClient>(&options))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the authenticated API. The engine APIs and a [`TokenVerifier`] must be available as app data.
pub fn configure_api<B, G>(cfg: &mut ServiceConfig)
where
    B: MarketplaceDatabase + 'static,
    G: PaymentGateway + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(invalid_request))
        .app_data(web::QueryConfig::default().error_handler(invalid_request))
        .app_data(web::PathConfig::default().error_handler(invalid_request))
        .service(CreateTransactionRoute::<B>::new())
        .service(ListTransactionsRoute::<B>::new())
        // Must be registered before `/transactions/{id}`
        .service(TransactionSummaryRoute::<B>::new())
        .service(TransactionByIdRoute::<B>::new())
        .service(TransactionHistoryRoute::<B>::new())
        .service(UpdateStatusRoute::<B>::new())
        .service(CancelTransactionRoute::<B>::new())
        .service(CreatePaymentSessionRoute::<B, G>::new())
        .service(MyCartRoute::<B>::new())
        .service(AddToCartRoute::<B>::new());
}

fn invalid_request<E: Display>(err: E, _req: &HttpRequest) -> Error {
    ServerError::InvalidRequestBody(err.to_string()).into()
}

/// The payment gateway's webhook. Unauthenticated, but restricted to the whitelist, if one is configured.
pub fn gateway_scope<B, G>(
    options: &ServerOptions,
) -> Scope<impl ServiceFactory<ServiceRequest, Config = (), Response = ServiceResponse, Error = Error, InitError = ()>>
where
    B: MarketplaceDatabase + 'static,
    G: PaymentGateway + 'static,
{
    let use_x_forwarded_for = options.use_x_forwarded_for;
    let use_forwarded = options.use_forwarded;
    let whitelist = options.gateway_whitelist.clone();
    web::scope("/gateway")
        .wrap_fn(move |req, srv| {
            let peer_ip = get_remote_ip(req.request(), use_x_forwarded_for, use_forwarded);
            if is_whitelisted(peer_ip, whitelist.as_deref()) {
                trace!("💻️ Gateway request from {peer_ip:?}");
                Either::Left(srv.call(req))
            } else {
                Either::Right(ok(req.error_response(ServerError::ForbiddenPeer)))
            }
        })
        .service(GatewayNotificationRoute::<B, G>::new())
}
