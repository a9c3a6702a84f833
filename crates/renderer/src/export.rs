use std::path::{Path, PathBuf};

use anyhow::{ensure, Result};

use crate::events::HostEvent;
use crate::raster::RasterSurface;
use crate::runtime::{FrameLoop, Frontend, SteppedTimeSource, TimeSource};
use crate::types::{ExportOptions, RendererConfig, Viewport};

/// Renders `options.frames` frames off-screen on a simulated clock and writes
/// each as a PNG. Returns the written paths in frame order.
pub fn export_frames<F: Frontend>(
    config: &RendererConfig,
    options: &ExportOptions,
    frontend: &mut F,
) -> Result<Vec<PathBuf>> {
    ensure!(options.frames > 0, "export needs at least one frame");
    let viewport = Viewport::from(config.surface_size);
    ensure!(
        !viewport.is_empty(),
        "export surface must be at least 1x1 pixels"
    );

    let mut surface = RasterSurface::new(viewport, config.background);
    let mut clock = SteppedTimeSource::new(std::time::Instant::now(), options.frame_interval);
    let mut frame_loop = FrameLoop::new(None);
    let mut written = Vec::with_capacity(options.frames as usize);

    for index in 0..options.frames {
        if let Some(pointer) = options.pointer {
            frontend.handle_event(HostEvent::PointerMoved(pointer), clock.now());
        }
        let sample = clock.sample();
        frontend.render(&mut surface, sample);
        let path = frame_path(&options.path, index, options.frames);
        surface.save_png(&path)?;
        frame_loop.mark_rendered(sample.instant);
        tracing::debug!(frame = index, path = %path.display(), "frame written");
        written.push(path);
    }
    frame_loop.stop();

    tracing::info!(
        frames = frame_loop.frames_rendered(),
        width = config.surface_size.0,
        height = config.surface_size.1,
        "export finished"
    );
    Ok(written)
}

/// `out.png` for a single frame, `out_0000.png`, `out_0001.png`, ... otherwise.
pub fn frame_path(base: &Path, index: u32, total: u32) -> PathBuf {
    if total <= 1 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let extension = base
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    base.with_file_name(format!("{stem}_{index:04}.{extension}"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use fxconfig::FxConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::scene::Scene;
    use crate::types::{Point, RenderMode};

    fn options(path: PathBuf, frames: u32) -> ExportOptions {
        ExportOptions {
            path,
            frames,
            frame_interval: Duration::from_millis(16),
            pointer: Some(Point::new(40.0, 30.0)),
        }
    }

    fn config() -> RendererConfig {
        RendererConfig {
            surface_size: (96, 64),
            mode: RenderMode::Windowed,
            ..RendererConfig::default()
        }
    }

    #[test]
    fn frame_paths_are_numbered_for_sequences() {
        let base = Path::new("/tmp/out/frame.png");
        assert_eq!(frame_path(base, 0, 1), PathBuf::from("/tmp/out/frame.png"));
        assert_eq!(frame_path(base, 3, 10), PathBuf::from("/tmp/out/frame_0003.png"));
        assert_eq!(
            frame_path(Path::new("shot"), 1, 2),
            PathBuf::from("shot_0001.png")
        );
    }

    #[test]
    fn writes_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let config = config();
        let mut scene = Scene::new(
            &FxConfig::default(),
            Viewport::from(config.surface_size),
            StdRng::seed_from_u64(3),
        )
        .unwrap();

        let written = export_frames(&config, &options(dir.path().join("frame.png"), 3), &mut scene)
            .unwrap();
        assert_eq!(written.len(), 3);
        for path in &written {
            let image = image::open(path).unwrap();
            assert_eq!((image.width(), image.height()), (96, 64));
        }
        assert_eq!(scene.pointer().position, Some(Point::new(40.0, 30.0)));
    }

    #[test]
    fn zero_frames_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config();
        let mut scene = Scene::new(
            &FxConfig::default(),
            Viewport::from(config.surface_size),
            StdRng::seed_from_u64(3),
        )
        .unwrap();
        let err = export_frames(&config, &options(dir.path().join("x.png"), 0), &mut scene)
            .unwrap_err();
        assert!(err.to_string().contains("at least one frame"));
    }
}
