use clap::Parser;
use forestpatch::image::io::load_rgb_image;
use forestpatch::{
    FeatureConfig, PatchFeature, PatchSampler, Point, Rect, SamplerConfig, LABEL_NEGATIVE,
    LABEL_POSITIVE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "forestpatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    #[default]
    Uniform,
    Texture,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SamplerConfigJson {
    patch_width: usize,
    patch_height: usize,
    num_labels: usize,
    seed: u64,
    contrast_threshold: f32,
    batch_factor: usize,
    max_texture_batches: Option<usize>,
    extremum_width: usize,
}

impl Default for SamplerConfigJson {
    fn default() -> Self {
        let cfg = SamplerConfig::default();
        Self {
            patch_width: cfg.patch_width,
            patch_height: cfg.patch_height,
            num_labels: cfg.num_labels,
            seed: cfg.seed,
            contrast_threshold: cfg.contrast_threshold,
            batch_factor: cfg.batch_factor,
            max_texture_batches: cfg.max_texture_batches,
            extremum_width: cfg.feature.extremum_width,
        }
    }
}

impl From<SamplerConfigJson> for SamplerConfig {
    fn from(value: SamplerConfigJson) -> Self {
        Self {
            patch_width: value.patch_width,
            patch_height: value.patch_height,
            num_labels: value.num_labels,
            seed: value.seed,
            contrast_threshold: value.contrast_threshold,
            batch_factor: value.batch_factor,
            max_texture_batches: value.max_texture_batches,
            feature: FeatureConfig {
                extremum_width: value.extremum_width,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
struct RectJson {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl From<RectJson> for Rect {
    fn from(value: RectJson) -> Self {
        Rect::new(value.x, value.y, value.width, value.height)
    }
}

impl From<Rect> for RectJson {
    fn from(value: Rect) -> Self {
        Self {
            x: value.x,
            y: value.y,
            width: value.width,
            height: value.height,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct PointJson {
    x: i32,
    y: i32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    output_path: Option<String>,
    mode: ModeConfig,
    count: usize,
    label: usize,
    bbox: Option<RectJson>,
    centers: Vec<PointJson>,
    sampler: SamplerConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            output_path: None,
            mode: ModeConfig::Uniform,
            count: 100,
            label: 0,
            bbox: None,
            centers: Vec::new(),
            sampler: SamplerConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PatchRecord {
    label: usize,
    roi: RectJson,
    offsets: Vec<[i32; 2]>,
    frame: i32,
    patch: i32,
}

impl PatchRecord {
    fn new(label: usize, p: &PatchFeature) -> Self {
        let index = p.source_index();
        Self {
            label,
            roi: p.roi().into(),
            offsets: p.offsets().iter().map(|o| [o.dx, o.dy]).collect(),
            frame: index.frame,
            patch: index.patch,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct TextureSummary {
    positives: usize,
    negatives: usize,
    batches: usize,
}

#[derive(Debug, Serialize)]
struct Output {
    image_width: usize,
    image_height: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    texture: Option<TextureSummary>,
    records: Vec<PatchRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("forestpatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }
    if config.count == 0 {
        return Err("count must be at least 1".into());
    }

    let image = load_rgb_image(&config.image_path)?;
    let view = image.view();
    let mut sampler = PatchSampler::new(config.sampler.into())?;
    let bbox = config.bbox.map(Rect::from);
    let centers: Vec<Point> = config
        .centers
        .iter()
        .map(|c| Point::new(c.x, c.y))
        .collect();

    let texture = match config.mode {
        ModeConfig::Uniform => {
            let added = sampler.extract_patches(view, config.count, config.label, bbox, &centers)?;
            tracing::info!(added, label = config.label, "uniform sampling done");
            None
        }
        ModeConfig::Texture => {
            let stats =
                sampler.extract_texture_patches_from_image(view, config.count, bbox, &centers)?;
            tracing::info!(
                positives = stats.positives,
                negatives = stats.negatives,
                batches = stats.batches,
                "texture sampling done"
            );
            Some(TextureSummary {
                positives: stats.positives,
                negatives: stats.negatives,
                batches: stats.batches,
            })
        }
    };

    let labels = match config.mode {
        ModeConfig::Uniform => vec![config.label],
        ModeConfig::Texture => vec![LABEL_NEGATIVE, LABEL_POSITIVE],
    };
    let records = labels
        .into_iter()
        .flat_map(|label| {
            sampler
                .patches(label)
                .iter()
                .map(move |p| PatchRecord::new(label, p))
        })
        .collect();

    let output = Output {
        image_width: view.width(),
        image_height: view.height(),
        texture,
        records,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
