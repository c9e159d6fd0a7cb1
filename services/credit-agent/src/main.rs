use actix_cors::Cors;
use actix_web::{dev::Service, middleware, web, App, HttpServer};
use anyhow::Context;
use credit_agent::{config::Config, handlers, metrics, QuoteService};
use dotenv::dotenv;
use quote_events::{LogSink, Publisher};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting Okra Credit Agent...");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    let publisher = if config.events.enabled {
        Publisher::new(Arc::new(LogSink))
    } else {
        info!("Quote event publishing disabled");
        Publisher::disabled()
    };

    let service = Arc::new(
        QuoteService::from_config(&config, publisher).context("Failed to build quote service")?,
    );
    info!(
        policy_version = %service.policies().policy_version,
        "Policy engines initialized"
    );

    let server_config = config.server.clone();

    info!(
        "Starting HTTP server on {}:{}",
        server_config.host, server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(middleware::Logger::default())
            .wrap_fn(|req, srv| {
                let method = req.method().to_string();
                let path = req.match_pattern().unwrap_or_else(|| req.path().to_string());
                let started = Instant::now();
                let fut = srv.call(req);

                async move {
                    let res = fut.await?;
                    metrics::observe_request(&method, &path, res.status().as_u16(), started.elapsed());
                    Ok(res)
                }
            })
            .configure(handlers::configure_routes)
    })
    .workers(server_config.workers)
    .bind((server_config.host, server_config.port))?
    .run()
    .await?;

    Ok(())
}
