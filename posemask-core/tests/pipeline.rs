use image::{Rgb, RgbImage};
use posemask_core::config::{self, PipelineConfig};
use posemask_core::export::{load_mask, RigMeta};
use posemask_core::generate::{GenerationRequest, SpriteGenerator};
use posemask_core::pipeline::Pipeline;
use posemask_core::render::{Background, BackgroundMode, MaskWarning};
use posemask_core::PoseMaskError;

/// Paints every lit pixel of the control image as a flat figure.
struct TraceGenerator {
    figure: u8,
    background: u8,
}

impl SpriteGenerator for TraceGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> anyhow::Result<RgbImage> {
        let control = request.control_image;
        Ok(RgbImage::from_fn(request.width, request.height, |x, y| {
            let lit = control.get_pixel(x, y).0.iter().any(|&c| c > 0);
            Rgb([if lit { self.figure } else { self.background }; 3])
        }))
    }
}

struct FailingGenerator;

impl SpriteGenerator for FailingGenerator {
    fn generate(&self, _: &GenerationRequest<'_>) -> anyhow::Result<RgbImage> {
        anyhow::bail!("model offline")
    }
}

fn small_config() -> PipelineConfig {
    config::load_from_yaml_str("pose:\n  resolution: 128\n  joint_radius: 4\n  bone_width: 3\nrig:\n  joint_radius: 3\n  bone_width: 2\n")
        .unwrap()
}

#[test]
fn writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(small_config(), TraceGenerator { figure: 220, background: 10 });
    let report = pipeline.run(dir.path()).unwrap();

    for path in [&report.pose, &report.sprite, &report.mask, &report.rig_mask, &report.rig_meta] {
        assert!(path.exists(), "missing {}", path.display());
    }
    assert_eq!(report.background, Background::Dark);
    assert_eq!(report.warning, None);

    let mask = load_mask(&report.mask).unwrap();
    let rig = image::open(&report.rig_mask).unwrap().to_rgb8();
    assert_eq!(rig.dimensions(), mask.dimensions());
    assert_eq!(mask.dimensions(), (128, 128));
    for (x, y, px) in rig.enumerate_pixels() {
        assert_eq!(px.0[0], mask.get_pixel(x, y).0[0]);
    }

    let meta: RigMeta = serde_json::from_str(&std::fs::read_to_string(&report.rig_meta).unwrap()).unwrap();
    assert_eq!(meta.joints_px.len(), 13);
    assert!(meta.coverage > 0.0 && meta.coverage < 1.0);
}

#[test]
fn auto_background_handles_light_sprites() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = small_config();
    config.silhouette.background = BackgroundMode::Auto;
    let report = Pipeline::new(config, TraceGenerator { figure: 40, background: 235 }).run(dir.path()).unwrap();
    assert_eq!(report.background, Background::Light);
    assert_eq!(report.warning, None);
}

#[test]
fn uniform_sprite_is_reported_not_failed() {
    let dir = tempfile::tempdir().unwrap();
    let report = Pipeline::new(small_config(), TraceGenerator { figure: 90, background: 90 }).run(dir.path()).unwrap();
    assert_eq!(report.warning, Some(MaskWarning::EmptyMask));
    assert!(load_mask(&report.mask).unwrap().pixels().all(|p| p.0[0] == 0));
}

#[test]
fn generator_failure_surfaces_as_generation_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Pipeline::new(small_config(), FailingGenerator).run(dir.path()).unwrap_err();
    match err {
        PoseMaskError::Generation(msg) => assert!(msg.contains("model offline")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(dir.path().join("pose.png").exists());
}
