//! Request handler definitions
//!
//! Every route is registered through the `route!` macro, so handlers stay generic over the storage backend and the
//! payment gateway. Handlers only translate between HTTP and the engine APIs. Anything more involved belongs in the
//! engine, or in a separate module here.
//!
//! Handlers must never block the worker thread. All storage and gateway calls are async.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use daan_engine::{
    db_types::GatewayOrderId,
    traits::DEFAULT_PAGE_SIZE,
    DirectoryApi,
    DonationDatabase,
    PaymentGateway,
    SettlementApi,
    SettlementError,
};
use log::*;
use razorpay_tools::WebhookEvent;

use crate::{
    auth::JwtClaims,
    data_objects::{
        CheckoutKey,
        CreateOrderRequest,
        DonationListResponse,
        DonationOrderResponse,
        DonationResponse,
        DonationStatsResponse,
        EventProgressResponse,
        JsonResponse,
        PageQuery,
        VerifyPaymentRequest,
    },
    errors::ServerError,
    integrations::razorpay::notification_from_webhook,
    middleware::RAZORPAY_SIGNATURE_HEADER,
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

//----------------------------------------------   Donations  ----------------------------------------------------
route!(create_donation_order => Post "/donations/order" impl DonationDatabase, PaymentGateway);
/// Opens a donation and reserves a gateway order for it.
///
/// The response carries everything the client needs to launch the gateway's checkout: the order id, the amount in
/// minor units, and the public key id.
pub async fn create_donation_order<B, G>(
    claims: JwtClaims,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<SettlementApi<B, G>>,
    key: web::Data<CheckoutKey>,
) -> Result<HttpResponse, ServerError>
where
    B: DonationDatabase,
    G: PaymentGateway,
{
    let CreateOrderRequest { organization_id, amount, event_id } = body.into_inner();
    debug!("💻️ Donation order request from devotee {} for organization #{organization_id}", claims.devotee_id);
    let order =
        api.create_donation_order(claims.devotee_id, organization_id, &amount.to_string(), event_id).await?;
    Ok(HttpResponse::Ok().json(DonationOrderResponse::new(order, &key.0)))
}

route!(verify_donation_payment => Post "/donations/verify" impl DonationDatabase, PaymentGateway);
/// Confirms a completed checkout. Retrying with the same payload is safe.
pub async fn verify_donation_payment<B, G>(
    claims: JwtClaims,
    body: web::Json<VerifyPaymentRequest>,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: DonationDatabase,
    G: PaymentGateway,
{
    let VerifyPaymentRequest { order_id, payment_id, signature } = body.into_inner();
    debug!("💻️ Payment verification from devotee {} for order {order_id}", claims.devotee_id);
    let order_id = GatewayOrderId(order_id);
    let donation = api.verify_donation_payment(&order_id, &payment_id, &signature, claims.devotee_id).await?;
    Ok(HttpResponse::Ok().json(DonationResponse::from(donation)))
}

route!(my_donations => Get "/donations" impl DonationDatabase, PaymentGateway);
pub async fn my_donations<B, G>(
    claims: JwtClaims,
    query: web::Query<PageQuery>,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: DonationDatabase,
    G: PaymentGateway,
{
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    trace!("💻️ Listing donations for devotee {} (page {page}, limit {limit})", claims.devotee_id);
    let donations = api.list_donations(claims.devotee_id, page, limit).await?;
    Ok(HttpResponse::Ok().json(DonationListResponse::from(donations)))
}

route!(my_donation_stats => Get "/donations/stats" impl DonationDatabase, PaymentGateway);
pub async fn my_donation_stats<B, G>(
    claims: JwtClaims,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: DonationDatabase,
    G: PaymentGateway,
{
    let stats = api.donation_stats(claims.devotee_id).await?;
    Ok(HttpResponse::Ok().json(DonationStatsResponse::from(stats)))
}

//----------------------------------------------   Favorites  ----------------------------------------------------
route!(my_favorites => Get "/favorites" impl DonationDatabase);
pub async fn my_favorites<B: DonationDatabase>(
    claims: JwtClaims,
    api: web::Data<DirectoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let favorites = api.favorites(claims.devotee_id).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

route!(add_favorite => Post "/favorites/{org_id}" impl DonationDatabase);
pub async fn add_favorite<B: DonationDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<DirectoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let org_id = path.into_inner();
    let favorite = api.add_favorite(claims.devotee_id, org_id).await?;
    Ok(HttpResponse::Created().json(favorite))
}

route!(remove_favorite => Delete "/favorites/{org_id}" impl DonationDatabase);
pub async fn remove_favorite<B: DonationDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<DirectoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let org_id = path.into_inner();
    api.remove_favorite(claims.devotee_id, org_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Organization {org_id} removed from favorites"))))
}

//----------------------------------------------   Events  ----------------------------------------------------
route!(event_progress => Get "/events/{event_id}/progress" impl DonationDatabase);
pub async fn event_progress<B: DonationDatabase>(
    path: web::Path<i64>,
    api: web::Data<DirectoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let progress = api.event_progress(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(EventProgressResponse::from(progress)))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(razorpay_webhook => Post "/webhook" impl DonationDatabase, PaymentGateway);
/// Receives payment notifications from Razorpay. The HMAC middleware has already authenticated the body.
///
/// Anything that a retry cannot fix (unknown orders, irrelevant events, policy violations) is acknowledged with a
/// 200 so that the gateway stops redelivering it. Storage and gateway errors are returned as-is so that it retries.
pub async fn razorpay_webhook<B, G>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: DonationDatabase,
    G: PaymentGateway,
{
    let event = serde_json::from_slice::<WebhookEvent>(&body).map_err(|e| {
        warn!("💻️ Could not deserialize webhook body. {e}");
        ServerError::InvalidWebhook(e.to_string())
    })?;
    let signature = req.headers().get(RAZORPAY_SIGNATURE_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default();
    let Some(notification) = notification_from_webhook(&event, signature) else {
        return Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Ignored {} event", event.event))));
    };
    let order_id = notification.order_id.clone();
    match api.settle_gateway_notification(notification).await {
        Ok(Some(donation)) => {
            info!("💻️ Webhook for order {order_id} applied. Donation #{} is {}", donation.id, donation.status);
            Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Donation {} is {}", donation.id, donation.status))))
        },
        Ok(None) => Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {order_id} is not ours")))),
        Err(SettlementError::PolicyError(violation)) => {
            warn!("💻️ Webhook for order {order_id} was rejected. {violation}");
            Ok(HttpResponse::Ok().json(JsonResponse::failure(violation)))
        },
        Err(e) => Err(e.into()),
    }
}
