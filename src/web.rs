use std::collections::{BTreeMap, HashSet};
use std::future::{ready, Ready};
use std::net::SocketAddr;
use std::slice;

use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionExt, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::dev::Payload;
use actix_web::error::JsonPayloadError;
use actix_web::http::header;
use actix_web::{middleware, web, App, FromRequest, HttpRequest, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::items::{BannerImage, Promotion, Schedulable};
use crate::schedule::{DayTag, DaySet, ItemId, Scope};
use crate::service::{Direction, RotationService, Saved};
use crate::store::ScopeVersion;

const LOG_TARGET: &str = "web";
const ADMIN_HEADER: &str = "X-Admin-Password";
const ADMIN_SESSION_KEY: &str = "admin";

pub struct AppState {
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct BannerQuery {
    #[serde(rename = "type")]
    placement: Option<String>,
}

#[derive(Deserialize)]
pub struct PromotionQuery {
    usage_type: Option<String>,
}

#[derive(Deserialize)]
pub struct ScheduleBody {
    #[serde(alias = "scheduleDays")]
    schedule_days: DaySet,
    #[serde(default, alias = "isDayScheduled")]
    is_day_scheduled: Option<bool>,
}

#[derive(Deserialize)]
pub struct ActiveBody {
    #[serde(alias = "isActive")]
    is_active: bool,
}

#[derive(Deserialize)]
pub struct MoveBody {
    direction: Direction,
}

/// Proof that the request came from an administrator, either through the
/// login session or the `X-Admin-Password` header.
pub struct Admin;

impl FromRequest for Admin {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn authorize(req: &HttpRequest) -> Result<Admin, ApiError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err(ApiError::Internal("admin password not configured".into()));
    };

    let password = req
        .headers()
        .get(ADMIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !password.is_empty() && password == state.admin_password {
        return Ok(Admin);
    }

    match req.get_session().get::<bool>(ADMIN_SESSION_KEY) {
        Ok(Some(true)) => Ok(Admin),
        _ => Err(ApiError::Unauthorized("Unauthorized")),
    }
}

fn parse_scope<R: Schedulable>(raw: &str) -> Result<Scope, ApiError> {
    R::parse_scope(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Version the client last saw; `*` and a missing header skip the check
fn if_match(req: &HttpRequest) -> Option<ScopeVersion> {
    let raw = req.headers().get(header::IF_MATCH)?.to_str().ok()?.trim();
    if raw.is_empty() || raw == "*" {
        return None;
    }
    Some(ScopeVersion::parse(raw.trim_start_matches("W/")))
}

fn etag(version: &ScopeVersion) -> (header::HeaderName, String) {
    (header::ETAG, format!("\"{}\"", version))
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid request body: {}", err)).into()
}

fn saved_response<R: Schedulable>(service: &RotationService<R>, saved: Saved<R>) -> serde_json::Value {
    let eligible = !service
        .eligible_in(slice::from_ref(&saved.row), service.now())
        .is_empty();
    json!({
        "success": true,
        "data": saved.row.view(eligible),
        "warnings": saved.warnings,
    })
}

// Admin session endpoints
async fn admin_login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    if req.password != state.admin_password {
        warn!(target = LOG_TARGET, "rejected admin login");
        return Err(ApiError::Unauthorized("Invalid password"));
    }
    session
        .insert(ADMIN_SESSION_KEY, true)
        .map_err(|e| ApiError::Internal(format!("Failed to store session: {}", e)))?;
    session.renew();
    info!(target = LOG_TARGET, "admin logged in");
    Ok(HttpResponse::Ok().json(json!({"success": true})))
}

async fn admin_logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(json!({"success": true}))
}

// Public read endpoints
async fn eligible_now<R: Schedulable>(
    service: &RotationService<R>,
    scope: Option<&str>,
) -> Result<HttpResponse, ApiError> {
    let now = service.now();
    match scope {
        Some(raw) => {
            let scope = parse_scope::<R>(raw)?;
            let rows = service.eligible(scope, now).await?;
            let data: Vec<R::View> = rows.iter().map(|row| row.view(true)).collect();
            Ok(HttpResponse::Ok().json(json!({"success": true, "data": data})))
        }
        None => {
            let data: BTreeMap<&'static str, Vec<R::View>> = service
                .eligible_all(now)
                .await?
                .into_iter()
                .map(|(scope, rows)| {
                    (scope.column_value(), rows.iter().map(|row| row.view(true)).collect())
                })
                .collect();
            Ok(HttpResponse::Ok().json(json!({"success": true, "data": data})))
        }
    }
}

async fn public_banners(
    query: web::Query<BannerQuery>,
    service: web::Data<RotationService<BannerImage>>,
) -> Result<HttpResponse, ApiError> {
    eligible_now(&service, query.placement.as_deref()).await
}

async fn public_promotions(
    query: web::Query<PromotionQuery>,
    service: web::Data<RotationService<Promotion>>,
) -> Result<HttpResponse, ApiError> {
    eligible_now(&service, query.usage_type.as_deref()).await
}

// Admin endpoints, one set per record kind
async fn list_scope<R: Schedulable>(
    _: Admin,
    path: web::Path<String>,
    service: web::Data<RotationService<R>>,
) -> Result<HttpResponse, ApiError> {
    let scope = parse_scope::<R>(&path)?;
    let listing = service.listing(scope).await?;
    let data: Vec<R::View> = listing
        .rows
        .iter()
        .map(|(row, eligible)| row.view(*eligible))
        .collect();
    Ok(HttpResponse::Ok().insert_header(etag(&listing.version)).json(json!({
        "success": true,
        "scope": scope.to_string(),
        "version": listing.version.as_str(),
        "data": data,
    })))
}

async fn week_view<R: Schedulable>(
    _: Admin,
    path: web::Path<String>,
    service: web::Data<RotationService<R>>,
) -> Result<HttpResponse, ApiError> {
    let scope = parse_scope::<R>(&path.into_inner())?;
    let data: BTreeMap<DayTag, Vec<R::View>> = service
        .week(scope)
        .await?
        .into_iter()
        .map(|(day, rows)| (day, rows.iter().map(|row| row.view(true)).collect()))
        .collect();
    Ok(HttpResponse::Ok().json(json!({"success": true, "scope": scope.to_string(), "data": data})))
}

async fn create_item<R: Schedulable>(
    _: Admin,
    draft: web::Json<R::Draft>,
    service: web::Data<RotationService<R>>,
) -> Result<HttpResponse, ApiError> {
    let saved = service.create(draft.into_inner()).await?;
    Ok(HttpResponse::Created().json(saved_response(&service, saved)))
}

async fn update_item<R: Schedulable>(
    _: Admin,
    req: HttpRequest,
    path: web::Path<String>,
    draft: web::Json<R::Draft>,
    service: web::Data<RotationService<R>>,
) -> Result<HttpResponse, ApiError> {
    let id = ItemId::from(path.as_str());
    let saved = service
        .update(&id, draft.into_inner(), if_match(&req).as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(saved_response(&service, saved)))
}

async fn set_schedule<R: Schedulable>(
    _: Admin,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ScheduleBody>,
    service: web::Data<RotationService<R>>,
) -> Result<HttpResponse, ApiError> {
    let id = ItemId::from(path.as_str());
    let body = body.into_inner();
    let saved = service
        .set_schedule(&id, body.schedule_days, body.is_day_scheduled, if_match(&req).as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(saved_response(&service, saved)))
}

async fn set_active<R: Schedulable>(
    _: Admin,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ActiveBody>,
    service: web::Data<RotationService<R>>,
) -> Result<HttpResponse, ApiError> {
    let id = ItemId::from(path.as_str());
    let saved = service
        .set_active(&id, body.is_active, if_match(&req).as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(saved_response(&service, saved)))
}

async fn move_item<R: Schedulable>(
    _: Admin,
    path: web::Path<String>,
    body: web::Json<MoveBody>,
    service: web::Data<RotationService<R>>,
) -> Result<HttpResponse, ApiError> {
    let id = ItemId::from(path.as_str());
    let rows = service.move_item(&id, body.direction).await?;
    let eligible: HashSet<ItemId> = service
        .eligible_in(&rows, service.now())
        .iter()
        .map(|row| row.id().clone())
        .collect();
    let data: Vec<R::View> = rows.iter().map(|row| row.view(eligible.contains(row.id()))).collect();
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": data})))
}

async fn delete_item<R: Schedulable>(
    _: Admin,
    path: web::Path<String>,
    service: web::Data<RotationService<R>>,
) -> Result<HttpResponse, ApiError> {
    service.delete(&ItemId::from(path.as_str())).await?;
    Ok(HttpResponse::Ok().json(json!({"success": true})))
}

fn admin_routes<R: Schedulable>(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_item::<R>))
        .route("/scope/{scope}", web::get().to(list_scope::<R>))
        .route("/scope/{scope}/week", web::get().to(week_view::<R>))
        .route("/{id}", web::put().to(update_item::<R>))
        .route("/{id}", web::delete().to(delete_item::<R>))
        .route("/{id}/schedule", web::put().to(set_schedule::<R>))
        .route("/{id}/active", web::put().to(set_active::<R>))
        .route("/{id}/move", web::post().to(move_item::<R>));
}

/// Every API route; the app must also carry `AppState` and both services as data
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/api/login", web::post().to(admin_login))
        .route("/api/logout", web::post().to(admin_logout))
        .route("/api/banners", web::get().to(public_banners))
        .route("/api/promotions/active", web::get().to(public_promotions))
        .service(web::scope("/api/admin/banners").configure(admin_routes::<BannerImage>))
        .service(web::scope("/api/admin/promotions").configure(admin_routes::<Promotion>));
}

pub async fn start_server(
    bind: SocketAddr,
    admin_password: String,
    banners: RotationService<BannerImage>,
    promotions: RotationService<Promotion>,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState { admin_password });
    let banners = web::Data::new(banners);
    let promotions = web::Data::new(promotions);
    // One key for every worker so a session cookie is valid on all of them
    let session_key = Key::generate();

    info!(target = LOG_TARGET, %bind, "starting web server");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(banners.clone())
            .app_data(promotions.clone())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await
}
