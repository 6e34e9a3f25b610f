//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Every handler under `/api` takes [`JwtClaims`], so a request without a valid access token never reaches the
//! engine. Who may do what to a transaction is decided by the engine from the caller's user id.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any I/O (database calls, the payment gateway) must be awaited,
//! never blocked on.
use actix_web::{get, web, HttpResponse, Responder};
use grounds_engine::{
    transaction_objects::{Actor, CheckoutRequest},
    CheckoutApi,
    MarketplaceDatabase,
    OrderFlowApi,
    ParticipantApi,
    PaymentApi,
    PaymentGateway,
};
use log::*;

use crate::{
    auth::JwtClaims,
    data_objects::{CancelRequest, CartRequest, NotificationAck, StatusUpdateRequest, TransactionListQuery},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Transactions  ----------------------------------------------------
route!(create_transaction => Post "/transactions" impl MarketplaceDatabase);
/// Turns one of the caller's cart selections into a `pending` transaction, with the caller as buyer.
///
/// Responds with `201 Created` and the new transaction. Any non-fatal problems (e.g. the cart entry could not be
/// cleared) are listed under `warnings`.
pub async fn create_transaction<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST transaction for {}: {} x product #{}", claims.sub, request.quantity, request.product_id);
    let result = api.create_transaction(claims.user_id(), request).await?;
    Ok(HttpResponse::Created().json(result))
}

route!(list_transactions => Get "/transactions" impl MarketplaceDatabase);
/// The caller's transactions, newest first. Filter with `?role=buyer|seller` and `?status=pending,confirmed,...`.
pub async fn list_transactions<B: MarketplaceDatabase>(
    claims: JwtClaims,
    query: web::Query<TransactionListQuery>,
    api: web::Data<ParticipantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET transactions for {}", claims.sub);
    let filter = query.into_inner().into_filter()?;
    let transactions = api.list(claims.user_id(), filter).await?;
    Ok(HttpResponse::Ok().json(transactions))
}

route!(transaction_summary => Get "/transactions/summary" impl MarketplaceDatabase);
pub async fn transaction_summary<B: MarketplaceDatabase>(
    claims: JwtClaims,
    api: web::Data<ParticipantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET transaction summary for {}", claims.sub);
    let summary = api.summary(claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

route!(transaction_by_id => Get "/transactions/{id}" impl MarketplaceDatabase);
/// Transactions the caller is not a party to are reported as not found.
pub async fn transaction_by_id<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<ParticipantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET transaction #{id} for {}", claims.sub);
    let transaction = api.get(claims.user_id(), id).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

route!(transaction_history => Get "/transactions/{id}/history" impl MarketplaceDatabase);
pub async fn transaction_history<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<ParticipantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET history of transaction #{id} for {}", claims.sub);
    let history = api.history(claims.user_id(), id).await?;
    Ok(HttpResponse::Ok().json(history))
}

route!(update_status => Patch "/transactions/{id}/status" impl MarketplaceDatabase);
/// Moves a transaction along its lifecycle.
///
/// Body: `{"status": "...", "note": "...", "tracking_reference": "...", "shipping_cost": 15000}`. Only `status` is
/// required. Tracking details are only accepted with `shipped`.
pub async fn update_status<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let (status, details) = body.into_inner().into_parts();
    info!("💻️ {} asks to move transaction #{id} to {status}", claims.sub);
    let actor = Actor::user(claims.sub);
    let transaction = api.update_status(&actor, id, status, details).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

route!(cancel_transaction => Post "/transactions/{id}/cancel" impl MarketplaceDatabase);
pub async fn cancel_transaction<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: Option<web::Json<CancelRequest>>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let note = body.and_then(|b| b.into_inner().note);
    info!("💻️ {} asks to cancel transaction #{id}", claims.sub);
    let actor = Actor::user(claims.sub);
    let transaction = api.cancel(&actor, id, note).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

route!(create_payment_session => Post "/transactions/{id}/payment" impl MarketplaceDatabase, PaymentGateway);
/// Opens a payment session with the gateway for one of the caller's pending purchases. Responds with the gateway's
/// session token and the URL the buyer should be sent to.
pub async fn create_payment_session<B: MarketplaceDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<PaymentApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ POST payment session for transaction #{id} by {}", claims.sub);
    let session = api.create_payment_session(claims.user_id(), id).await?;
    Ok(HttpResponse::Ok().json(session))
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(my_cart => Get "/cart" impl MarketplaceDatabase);
pub async fn my_cart<B: MarketplaceDatabase>(
    claims: JwtClaims,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET cart for {}", claims.sub);
    let entries = api.cart(claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(entries))
}

route!(add_to_cart => Post "/cart" impl MarketplaceDatabase);
/// Adds a product to the caller's cart, or replaces the quantity if it is already there.
pub async fn add_to_cart<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<CartRequest>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let CartRequest { product_id, quantity } = body.into_inner();
    debug!("💻️ POST cart entry for {}: {quantity} x product #{product_id}", claims.sub);
    let entry = api.add_to_cart(claims.user_id(), product_id, quantity).await?;
    Ok(HttpResponse::Ok().json(entry))
}

//----------------------------------------------   Gateway  ----------------------------------------------------
route!(gateway_notification => Post "/notification" impl MarketplaceDatabase, PaymentGateway);
/// Payment notification webhook.
///
/// The raw body is handed to the gateway client for verification, so it is read as bytes rather than JSON. A `200`
/// is only returned once the event has been recorded. Anything else (including a `502` when verification fails) tells
/// the gateway to retry later, and since nothing was recorded the retry is safe.
pub async fn gateway_notification<B: MarketplaceDatabase, G: PaymentGateway>(
    body: web::Bytes,
    api: web::Data<PaymentApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received payment notification ({} bytes)", body.len());
    let result = api.process_notification(&body).await.map_err(|e| {
        warn!("💻️ Payment notification was not processed. {e}");
        e
    })?;
    info!("💻️ Payment notification for {} was {}", result.external_ref, result.outcome);
    Ok(HttpResponse::Ok().json(NotificationAck { external_ref: result.external_ref, outcome: result.outcome }))
}
