use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info};

use guideline::queue;
use guideline::{
    load_or_default, requeue_pending, resolve_api_key, GuidelineError, JobProcessor,
    OpenAiGateway, SqliteJobStore, WorkerPool,
};
use guideline_server::logging::init_logging;
use guideline_server::{serve, AppState, ServerError};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("guideline-server: {}", e);
            ExitCode::FAILURE
        }
    }
}

// The blocking HTTP client used by the gateway must live outside the async
// runtime, so the runtime is built by hand after the workers start.
fn run() -> Result<(), ServerError> {
    let config = load_or_default().map_err(GuidelineError::from)?;
    init_logging(config.logging.format)?;

    info!("Starting guideline-server v{}", env!("CARGO_PKG_VERSION"));

    let api_key = resolve_api_key(&config.llm).map_err(GuidelineError::from)?;
    let store = Arc::new(
        SqliteJobStore::open(&config.resolved_database_path()).map_err(GuidelineError::from)?,
    );
    let gateway =
        OpenAiGateway::from_config(&config.llm, api_key).map_err(GuidelineError::from)?;
    info!("Using model {} at {}", config.llm.model, gateway.endpoint());

    let (job_queue, receiver) = queue::channel(config.queue_capacity);
    let job_queue = Arc::new(job_queue);
    let processor = JobProcessor::new(store.clone(), Arc::new(gateway));
    let pool = WorkerPool::start(processor, receiver, config.worker_count)
        .map_err(GuidelineError::from)?;

    requeue_pending(store.as_ref(), job_queue.as_ref()).map_err(GuidelineError::from)?;

    let state = AppState::new(store, job_queue, config.max_input_chars);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid server address: {}", e),
            )
        })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let served = runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, state, shutdown_signal()).await
    });
    drop(runtime);

    // The router held the last queue sender, so workers finish the backlog
    // and exit once the queue is empty.
    info!("Waiting for queued jobs to finish");
    pool.wait();

    served?;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, shutting down");
}
