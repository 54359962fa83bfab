//! Cobbler - Interactive shoe configurator
//!
//! Headless preview: loads the model, clicks the center
//! of the viewport with the selected color, lets the camera reframe, and
//! logs what a renderer would have to redraw.

mod settings;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use cobbler_assets::AssetServer;
use cobbler_configurator::{ConfiguratorView, PaintOutcome, PointerEvent, ViewStatus};
use cobbler_core::{FrameClock, FrameClockConfig};
use glam::Vec2;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::settings::CobblerSettings;

const POLL_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Cobbler preview...");

    let settings = CobblerSettings::load();
    if !CobblerSettings::exists() {
        if let Err(e) = settings.save() {
            warn!("Failed to write default settings: {}", e);
        }
    }
    let model = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.asset.model.clone());

    let server = AssetServer::new(settings.asset.base_path.clone()).with_options(settings.asset.load_options());
    let mut view = ConfiguratorView::mount(&server, &model, settings.view_config());
    view.on_ready(|scene| {
        info!(
            "Model ready: {} nodes, {} surfaces, {} materials",
            scene.len(),
            scene.surfaces().len(),
            scene.material_refs().len()
        );
    });

    // Wait for the background load
    let mut clock = FrameClock::new(FrameClockConfig::default());
    let started = Instant::now();
    let mut last_frame = started;
    loop {
        let now = Instant::now();
        let dt = clock.tick((now - last_frame).as_secs_f32());
        last_frame = now;
        view.update(dt);

        match view.status() {
            ViewStatus::Ready => break,
            ViewStatus::Failed => {
                let reason = view.error().map(|e| e.to_string()).unwrap_or_default();
                return Err(anyhow::Error::msg(reason))
                    .with_context(|| format!("Failed to load model '{}'", model.display()));
            }
            ViewStatus::Unmounted => bail!("View was unmounted while loading"),
            ViewStatus::Loading => {}
        }

        std::thread::sleep(POLL_INTERVAL);
    }
    info!("Load took {:.2}s over {} frames", started.elapsed().as_secs_f32(), clock.frame_count);

    // Upload of the freshly normalized materials
    let initial_upload = view.take_dirty_materials().len();
    info!("{} materials need an initial upload", initial_upload);

    // Click at the viewport center
    let (width, height) = settings.session.viewport();
    let viewport = Vec2::new(width as f32, height as f32);
    let center = PointerEvent::new(viewport * 0.5, viewport);
    match view.click(&center) {
        PaintOutcome::Painted { target, triangle, distance } => info!(
            "Center click painted {:?} (triangle {}, {:.3} away) with {}",
            target,
            triangle,
            distance,
            view.selected_color()
        ),
        PaintOutcome::Missed => info!("Center click hit nothing"),
        other => warn!("Center click did not paint: {:?}", other),
    }

    // Let the reframe play out
    let mut settled_at = None;
    for frame in 0..settings.session.preview_frames {
        let dt = clock.tick_fixed();
        view.update(dt);
        if settled_at.is_none() && !view.camera().is_transitioning() {
            settled_at = Some(frame);
        }
    }
    match settled_at {
        Some(frame) => info!("Camera settled after {} frames", frame),
        None => warn!(
            "Camera still moving after {} frames",
            settings.session.preview_frames
        ),
    }

    let camera = view.camera();
    info!(
        "Camera at {:?} looking at {:?} (yaw {:.1}°, polar {:.1}°, distance {:.3})",
        camera.position(),
        camera.target(),
        camera.yaw().to_degrees(),
        camera.polar().to_degrees(),
        camera.distance()
    );

    let dirty = view.take_dirty_materials();
    if let Some(scene) = view.scene() {
        for target in &dirty {
            let node = scene.node(target.node).map(|n| n.name.as_str()).unwrap_or("?");
            if let Some(material) = scene.material(*target) {
                info!("Dirty material on '{}' slot {:?}: {}", node, target.slot, material.color);
            }
        }
    }

    let stats = view.paint_stats();
    info!(
        "Session done: {} painted, {} missed, {} rejected, {} unexpected",
        stats.painted, stats.missed, stats.rejected, stats.unexpected
    );

    Ok(())
}
