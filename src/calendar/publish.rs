// src/calendar/publish.rs

//! Feed publishing: the atomic `.ics` write and the optional pull server.
//!
//! The server reads the published file on every request, so a scrape run in
//! another terminal is picked up without restarting it.

use std::path::PathBuf;

use actix_web::{App, HttpResponse, HttpServer, middleware, web};

use crate::calendar::{Feed, encode_feed};
use crate::error::Result;
use crate::models::Config;
use crate::storage::FileStore;

/// Encode the feed and write it under the output root. Returns the final
/// path for the run summary.
pub async fn publish_feed(feed: &Feed, config: &Config, store: &FileStore) -> Result<PathBuf> {
    let ics = encode_feed(feed, &config.calendar);
    store
        .write_bytes(&config.output.calendar_file, ics.as_bytes())
        .await?;
    let path = store.path(&config.output.calendar_file);
    log::info!(
        "Published {} events to {}",
        feed.len(),
        path.display()
    );
    Ok(path)
}

/// Serve the published calendar over HTTP until interrupted.
pub async fn serve(store: FileStore, file: String, host: &str, port: u16) -> Result<()> {
    let path = store.path(&file);
    log::info!("Serving {} on http://{host}:{port}/calendar.ics", path.display());
    log::info!("Subscribe from a calendar client with that URL");

    let data = web::Data::new((store, file));
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(middleware::Logger::default())
            .route("/", web::get().to(calendar))
            .route("/calendar.ics", web::get().to(calendar))
    })
    .bind((host, port))?
    .run()
    .await?;
    Ok(())
}

async fn calendar(data: web::Data<(FileStore, String)>) -> HttpResponse {
    let (store, file) = data.get_ref();
    match store.read_bytes(file).await {
        Ok(Some(bytes)) => HttpResponse::Ok()
            .content_type("text/calendar; charset=utf-8")
            .insert_header(("Cache-Control", "no-cache"))
            .insert_header(("Access-Control-Allow-Origin", "*"))
            .body(bytes),
        Ok(None) => HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body("No calendar has been generated yet. Run a scrape with -c or -t first.\n"),
        Err(e) => {
            log::warn!("Calendar not readable at {}: {e}", store.path(file).display());
            HttpResponse::InternalServerError()
                .content_type("text/plain; charset=utf-8")
                .body("Calendar file could not be read.\n")
        }
    }
}
