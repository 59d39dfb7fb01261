mod args;
mod entity;
mod errors;
mod migrator;
mod service;
mod session;
mod storage;
mod store;
use actix_cors::Cors;
use args::{self as run_args, RunArgs};
use clap::Parser;
use std::sync::{Arc, Mutex};

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{self, cookie::Key, dev::Server, middleware::Logger, web, App, HttpServer};
use log::{error, info};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbBackend, DbErr, Statement};
use service::DbConnection;
use session::TokenSession;
use storage::{FsImageStore, ImageStore};

async fn setup_database(
    db_url: &str,
    db_name: &str,
    refresh: bool,
) -> Result<DatabaseConnection, DbErr> {
    use sea_orm::ConnectionTrait;
    use sea_orm_migration::MigratorTrait;

    let mut c_opt = ConnectOptions::new(db_url);
    c_opt.sqlx_logging(false);

    let db = Database::connect(c_opt).await?;

    let db = match db.get_database_backend() {
        DbBackend::MySql => {
            db.execute(Statement::from_string(
                db.get_database_backend(),
                format!("CREATE DATABASE IF NOT EXISTS `{}`;", db_name),
            ))
            .await?;
            let url = format!("{}/{}", db_url, db_name);
            Database::connect(&url).await?
        }
        DbBackend::Postgres => {
            return Err(DbErr::Custom("postgresql is not supported".to_owned()));
        }
        DbBackend::Sqlite => db,
    };
    if refresh {
        info!("refreshing database schema");
        migrator::Migrator::fresh(&db).await?;
    }
    migrator::Migrator::up(&db, None).await?;

    Ok(db)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));

    let args = run_args::RunArgs::parse();

    info!(
        "Running blog server on {}:{}\nwith database url: {} and database name: {}",
        &args.adress, &args.port, &args.db, &args.db_name
    );
    create_and_run_server(&args).await?.await?;
    Ok(())
}

async fn create_and_run_server(args: &RunArgs) -> std::io::Result<Server> {
    let secret_key = Key::generate();
    let db = setup_database(&args.db, &args.db_name, args.fresh)
        .await
        .map_err(|e| {
            error!("database setup error: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;

    let db = DbConnection::new(db);

    let token_session: Arc<Mutex<dyn TokenSession>> = Arc::new(Mutex::new(
        session::DefaultTokenSession::new(args.session_ttl()),
    ));
    let token_session = web::Data::from(token_session);

    let images: Arc<dyn ImageStore> = Arc::new(FsImageStore::new(&args.media_dir));
    let images = web::Data::from(images);

    Ok(HttpServer::new(move || {
        let cors = Cors::permissive();
        App::new()
            .configure(service::configure_services)
            .app_data(web::Data::new(db.clone()))
            .app_data(token_session.clone())
            .app_data(images.clone())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                secret_key.clone(),
            ))
            .wrap(Logger::default())
            .wrap(cors)
    })
    .bind((args.adress.clone(), args.port))?
    .run())
}
