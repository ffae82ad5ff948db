//! Main application entry point.
//! The UI thread owns the marker model; eframe drives it.

use std::path::PathBuf;
use std::sync::Arc;

use capstudio::core::{StreamInfo, StreamKind};
use capstudio::ui::StudioApp;
use capstudio::{Clip, JsonFileStore, MarkerCollection, MarkerStateStore, StudioConfig, ThreadAffinity, TimeValue};
use eframe::egui;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("capstudio.json"));
    let loaded = StudioConfig::load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter.as_str().into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = &loaded {
        warn!(error = %e, "using default configuration");
    }
    info!(config = %config_path.display(), settings = %config.settings_path.display(), "starting capstudio");

    // Stand-in for the clip handed over by the recording engine.
    let duration = TimeValue::from_seconds(120.0);
    let clip = Arc::new(
        Clip::new(1, PathBuf::from("session.bag"), duration).with_streams(vec![
            StreamInfo {
                index: 0,
                kind: StreamKind::Depth,
                duration,
                codec_name: "z16".to_string(),
            },
            StreamInfo {
                index: 1,
                kind: StreamKind::Color,
                duration,
                codec_name: "rgb8".to_string(),
            },
        ]),
    );
    let store: Arc<dyn MarkerStateStore> = Arc::new(JsonFileStore::new(&config.settings_path));
    let key = clip.source_path.display().to_string();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("capstudio")
            .with_inner_size([1280.0, 360.0]),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "capstudio",
        native_options,
        Box::new(move |cc| {
            let markers = MarkerCollection::load(clip.clone(), store, key, Arc::new(ThreadAffinity::current()));
            Box::new(StudioApp::new(cc, config, clip, markers))
        }),
    )
}
