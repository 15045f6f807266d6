use std::{process, sync::Arc};

use postboard::{
    application::{error::AppError, loader::PostSource, page::IndexPage},
    config,
    domain::posts::CategoryFilter,
    infra::{
        api_client::HttpPostSource,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
    presentation::report::ListingReport,
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::List(args) => run_list(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let source = HttpPostSource::new(&settings.upstream)?;
    info!(
        target = "postboard::serve",
        addr = %settings.server.addr,
        posts_url = %source.posts_url(),
        "Starting HTTP server"
    );

    let state = HttpState::new(Arc::new(source), settings.site.clone());
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            let _ = shutdown_rx.await;
        },
    );
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server => {
            return finish_server(result);
        }
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| AppError::from(InfraError::from(err)))?;
        }
    }

    info!(target = "postboard::serve", "Shutdown requested");
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(result) => finish_server(result),
        Err(_) => {
            warn!(
                target = "postboard::serve",
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "Graceful shutdown timed out; aborting open connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn finish_server(
    result: Result<Result<(), std::io::Error>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::from(InfraError::from(err))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn run_list(settings: config::Settings, args: config::ListArgs) -> Result<(), AppError> {
    let source: Arc<dyn PostSource> = Arc::new(HttpPostSource::new(&settings.upstream)?);
    let selection = CategoryFilter::from_query(args.category.as_deref());

    let page = IndexPage::mount_with_selection(source, selection);
    let state = page.loaded().await;
    let report = ListingReport::from_state(&state);

    if args.json {
        let out = report
            .to_json()
            .map_err(|err| AppError::unexpected(format!("failed to render output: {err}")))?;
        println!("{out}");
    } else {
        print!("{}", report.to_text(&settings.site.all_label));
    }

    Ok(())
}
