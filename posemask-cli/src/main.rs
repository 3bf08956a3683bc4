use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use posemask_core::generate::FileSpriteGenerator;
use posemask_core::pipeline::Pipeline;
use posemask_core::render::{self, BackgroundMode, PoseStyle, RigMaskParams};
use posemask_core::{config, export, skeleton, Skeleton, VERSION};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "posemask", version = VERSION, about = "Pose control images, silhouettes and rig masks for sprite generation")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BackgroundArg {
    Dark,
    Light,
    Auto,
}

impl From<BackgroundArg> for BackgroundMode {
    fn from(b: BackgroundArg) -> Self {
        match b {
            BackgroundArg::Dark => BackgroundMode::Dark,
            BackgroundArg::Light => BackgroundMode::Light,
            BackgroundArg::Auto => BackgroundMode::Auto,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a skeleton to an openpose-style control PNG
    Pose {
        /// Skeleton YAML/JSON; the 13-joint template when omitted
        #[arg(long)]
        skeleton: Option<PathBuf>,
        #[arg(long, default_value_t = 1024)]
        resolution: u32,
        #[arg(long, default_value = "pose.png")]
        out: PathBuf,
    },
    /// Threshold a flat-background sprite into a binary mask
    Silhouette {
        #[arg(long)]
        sprite: PathBuf,
        #[arg(long, value_enum, default_value_t = BackgroundArg::Dark)]
        background: BackgroundArg,
        #[arg(long, default_value_t = 20)]
        floor: u8,
        #[arg(long, default_value = "npc_mask.png")]
        out: PathBuf,
    },
    /// Merge a mask with joint and bone channels
    RigMask {
        #[arg(long)]
        mask: PathBuf,
        #[arg(long)]
        skeleton: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        joint_radius: u32,
        #[arg(long, default_value_t = 6)]
        bone_width: u32,
        #[arg(long, default_value = "rig_mask.png")]
        out: PathBuf,
        /// Also write a JSON sidecar describing the channels
        #[arg(long)]
        meta: Option<PathBuf>,
    },
    /// Full pipeline using a sprite produced by an external model
    Run {
        #[arg(long)]
        sprite: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
    /// Load a pipeline config and print what it resolves to
    Inspect {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_skeleton(path: Option<&PathBuf>) -> Result<Skeleton> {
    match path {
        Some(p) => skeleton::load_from_path(p).with_context(|| format!("failed to load skeleton {}", p.display())),
        None => Ok(skeleton::default_skeleton()),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<config::PipelineConfig> {
    match path {
        Some(p) => config::load_from_path(p).with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(config::PipelineConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!(command = ?cli.cmd, "posemask {}", VERSION);
    match cli.cmd {
        Command::Pose { skeleton, resolution, out } => {
            let skeleton = load_skeleton(skeleton.as_ref())?;
            let img = render::rasterize_with(&skeleton, &PoseStyle { resolution, ..PoseStyle::default() })?;
            export::save_pose(&img, &out)?;
            println!("Wrote {}x{} pose image to {}", resolution, resolution, out.display());
        }
        Command::Silhouette { sprite, background, floor, out } => {
            let img = image::open(&sprite)
                .with_context(|| format!("failed to open sprite {}", sprite.display()))?
                .to_rgb8();
            let background = BackgroundMode::from(background).resolve(&img)?;
            let sil = render::extract_silhouette(&img, background, floor)?;
            export::save_mask(&sil.mask, &out)?;
            if sil.is_empty() {
                tracing::warn!(sprite = %sprite.display(), "no foreground found; check --background and --floor");
            }
            println!("Wrote mask to {} (coverage {:.1}%)", out.display(), sil.coverage() * 100.0);
        }
        Command::RigMask { mask, skeleton, joint_radius, bone_width, out, meta } => {
            let skeleton = load_skeleton(skeleton.as_ref())?;
            let mask_img = export::load_mask(&mask).with_context(|| format!("failed to open mask {}", mask.display()))?;
            let params = RigMaskParams { joint_radius, bone_width };
            let rig = render::compose_rig_mask(&mask_img, &skeleton, &params)?;
            export::save_rig_mask(&rig, &out)?;
            if let Some(meta_path) = meta {
                export::RigMeta::new(&mask_img, &skeleton, &params).save(&meta_path)?;
            }
            println!("Wrote {}x{} rig mask to {}", rig.width(), rig.height(), out.display());
        }
        Command::Run { sprite, config, out_dir } => {
            let config = load_config(config.as_ref())?;
            let pipeline = Pipeline::new(config, FileSpriteGenerator::new(sprite));
            let report = pipeline.run(&out_dir)?;
            println!("Background: {:?}", report.background);
            for path in [&report.pose, &report.sprite, &report.mask, &report.rig_mask, &report.rig_meta] {
                println!("  {}", path.display());
            }
            if let Some(w) = report.warning {
                tracing::warn!(warning = ?w, mask = %report.mask.display(), "pipeline finished with a degenerate mask");
            }
        }
        Command::Inspect { config } => {
            let config = load_config(config.as_ref())?;
            let skeleton = config.skeleton();
            let p = &config.pose;
            println!("pose: {}px, bone width {}px, joint radius {}px", p.resolution, p.bone_width, p.joint_radius);
            println!("  colors: bone={:?} joint={:?}", p.bone_color, p.joint_color);
            println!("silhouette: floor={}, background={:?}", config.silhouette.floor, config.silhouette.background);
            println!("rig: joint radius {}px, bone width {}px", config.rig.joint_radius, config.rig.bone_width);
            let g = &config.generation;
            println!("generation: steps={}, guidance={:.2}, control={:.2} until {:.2}, seed={}", g.steps, g.guidance_scale, g.conditioning_scale, g.guidance_end, g.seed);
            println!("  prompt: {}", g.prompt);
            println!("skeleton: {} joints, {} bones{}", skeleton.joints().len(), skeleton.bones().len(),
                if config.skeleton.is_none() { " (default template)" } else { "" });
            for (id, pos) in skeleton.joints() {
                println!("  [{}] ({:.3}, {:.3})", id, pos.x, pos.y);
            }
        }
    }
    Ok(())
}
