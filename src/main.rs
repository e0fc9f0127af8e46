use actix_web::{web, App, HttpServer};
use messaging_service::{
    config, db, error, logging,
    middleware::JwtAuth,
    routes,
    services::{NotificationDispatcher, NotificationService},
    state::AppState,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    let db = db::init_pool(&cfg.database_url).await?;

    let notifications = Arc::new(NotificationService::new(db.clone()));
    let (dispatcher, _dispatch_worker) =
        NotificationDispatcher::spawn(notifications.clone(), cfg.notification_queue_depth);

    let state = AppState {
        db: db.clone(),
        config: cfg.clone(),
        notifications,
        dispatcher,
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting messaging-service");

    let jwt_secret = cfg.jwt_secret.clone();
    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(JwtAuth::new(&jwt_secret))
            .app_data(web::Data::new(state.clone()))
            .service(routes::conversations::list_conversations)
            .service(routes::conversations::get_conversation)
            .service(routes::conversations::start_conversation)
            .service(routes::conversations::mute_conversation)
            .service(routes::messages::send_message)
            .service(routes::messages::delete_message)
            .route("/health", web::get().to(|| async { "OK" }))
    })
    .bind(&bind_addr)
    .map_err(|e| error::AppError::StartServer(format!("bind: {e}")))?
    .run()
    .await
    .map_err(|e| error::AppError::StartServer(format!("run server: {e}")))
}
