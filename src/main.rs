use ghostly_glimpse::{app, config::AppConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Configuración (fichero TOML opcional + variables de entorno)
    let cfg = AppConfig::load()?;
    tracing::info!("🔧 Modo {:?}, modelo {}", cfg.variant, cfg.model.onnx_path);

    // 3. Adaptadores y caso de uso
    let detector = app::build_detector(&cfg).await;
    let state = app::build_state(&cfg, detector);

    let status = state.scan.status().await;
    if status.ready {
        tracing::info!("👻 {}", status.message);
    } else {
        tracing::warn!("⚠️ Espectrómetro aún no disponible: {}", status.message);
    }

    // 4. Router de Axum y archivos estáticos
    let app = app::build_app(&cfg, state);

    // 5. Lanzar el servidor
    tracing::info!("🚀 Caza Fantasmas iniciado en http://{}", cfg.addr);
    tracing::info!("📂 Archivos estáticos servidos desde {}", cfg.static_dir.display());

    let listener = tokio::net::TcpListener::bind(&cfg.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
