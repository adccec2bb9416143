//! HTTP server wiring: persistence selection, pipeline composition, routes.

pub mod config;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{Identity, StaticIdentity, UserRepository};
use crate::inbound::http::{AppState, users};
use crate::middleware::Trace;
use crate::outbound::persistence::{
    DbPool, DieselUserRepository, MemoryUserRepository, PoolConfig,
};
use crate::server::config::ServerSettings;

/// Register the user endpoints under `/api/v1`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(users::create_user)
            .service(users::remove_user)
            .service(users::list_users),
    );
}

async fn select_repository(
    settings: &ServerSettings,
) -> std::io::Result<Arc<dyn UserRepository>> {
    match settings.database_url() {
        Some(url) => {
            let pool = DbPool::connect(PoolConfig::new(url))
                .await
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            Ok(Arc::new(DieselUserRepository::new(pool)))
        }
        None => Ok(Arc::new(MemoryUserRepository::new())),
    }
}

/// Run the HTTP server until shutdown.
pub async fn run(settings: ServerSettings) -> std::io::Result<()> {
    let repo = select_repository(&settings).await?;
    let identity: Arc<dyn Identity> = Arc::new(StaticIdentity::anonymous());
    let state = web::Data::new(AppState::build(repo, identity));

    let bind_addr = settings.bind_addr().to_owned();
    HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .wrap(Trace)
            .configure(routes);

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(bind_addr)?
    .run()
    .await
}
