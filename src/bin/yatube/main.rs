use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::{bail, Context};
use env_logger::Env;
use sea_orm::DatabaseConnection;
use yatube::config::Config;
use yatube::db::{create_tables, init_db};
use yatube::middleware::ClientCtx;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();

    let config = Config::from_env()?;
    let db = init_db(config.database_url.to_owned(), config.sqlx_logging)
        .await
        .context("Database connection failed")?;

    if config.create_tables {
        create_tables(&db).await.context("Creating tables failed")?;
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("serve") => serve(config, db).await,
        Some("create-group") => create_group(&db, &args[1..]).await,
        Some(other) => bail!("Unknown command {:?}. Try `serve` or `create-group`.", other),
    }
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

async fn serve(config: Config, db: DatabaseConnection) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.media_dir)
        .with_context(|| format!("Cannot create media directory {:?}", config.media_dir))?;

    let secret_key = match &config.secret_key {
        Some(bytes) => Key::from(bytes.as_slice()),
        None => {
            log::warn!("SECRET_KEY is not set. Sessions will not survive a restart.");
            Key::generate()
        }
    };

    let bind_address = config.bind_address.to_owned();
    let db = Data::new(db);
    let config = Data::new(config);

    log::info!("Listening on {}", bind_address);
    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(db.clone())
            .app_data(config.clone())
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, yatube::web::error::render_404)
                    .handler(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        yatube::web::error::render_500,
                    ),
            )
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(config.secure_cookies)
                    .build(),
            )
            .wrap(Logger::new("%a %r %s %Dms"))
            .configure(yatube::web::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}

/// `create-group <slug> <title> [description]`
async fn create_group(db: &DatabaseConnection, args: &[String]) -> anyhow::Result<()> {
    let (slug, title) = match args {
        [slug, title, ..] => (slug, title),
        _ => bail!("Usage: yatube create-group <slug> <title> [description]"),
    };
    let description = args.get(2).map(String::as_str).unwrap_or_default();

    if yatube::group::get_group_by_slug(db, slug).await?.is_some() {
        bail!("Group {:?} already exists", slug);
    }

    let group = yatube::group::create_group(db, title, slug, description).await?;
    log::info!("Created group {} ({})", group.slug, group.id);
    Ok(())
}
