//! Generate one target field and write it as JSON

use anyhow::{Context, Result};
use flurry_core::{Color, Vec3};
use flurry_particles::rand::ParticleRng;
use flurry_particles::targets::{self, default_raster, TargetField};
use serde::Serialize;
use std::path::PathBuf;

pub const KINDS: [&str; 8] = [
    "greeting", "logo", "banner", "tree", "scatter", "decoration", "wish", "image",
];

pub struct TargetsArgs {
    pub kind: String,
    pub count: usize,
    pub seed: u64,
    pub text: Option<String>,
    pub image: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct TargetDump<'a> {
    kind: &'a str,
    count: usize,
    bounds: [Vec3; 2],
    positions: &'a [Vec3],
    colors: Option<&'a [Color]>,
}

pub fn run(args: TargetsArgs) -> Result<()> {
    let field = generate(&args)?;
    let dump = TargetDump {
        kind: &args.kind,
        count: field.len(),
        bounds: bounds(field.positions()),
        positions: field.positions(),
        colors: field.colors(),
    };
    let json = serde_json::to_string_pretty(&dump).context("Failed to serialize targets")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let [min, max] = dump.bounds;
            println!("Wrote {} {} targets to {}", dump.count, args.kind, path.display());
            println!(
                "  bounds: ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
                min.x, min.y, min.z, max.x, max.y, max.z
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn generate(args: &TargetsArgs) -> Result<TargetField> {
    let raster = default_raster();
    let raster = raster.as_ref();
    let mut rng = ParticleRng::new(args.seed);
    let count = args.count;
    let field = match args.kind.as_str() {
        "greeting" => targets::greeting_positions(raster, count, &mut rng),
        "logo" => {
            let img = read_image(args)?;
            targets::greeting_positions_from_image(&img, count, &mut rng)
        }
        "banner" => {
            let (default1, default2) = targets::BANNER_LINES;
            let text = args.text.as_deref().unwrap_or("");
            let mut lines = text.splitn(2, '/');
            let line1 = lines.next().filter(|l| !l.is_empty()).unwrap_or(default1);
            let line2 = lines.next().unwrap_or(default2);
            targets::banner_positions(raster, line1, line2, count, &mut rng)
        }
        "tree" => targets::tree_positions(count, &mut rng),
        "scatter" => targets::scatter_positions(count, &mut rng),
        "decoration" => targets::decoration_positions(count, &mut rng),
        "wish" => {
            let text = args
                .text
                .as_deref()
                .context("wish targets need --text")?;
            targets::wish_positions(raster, text, count)
        }
        "image" => {
            let img = read_image(args)?;
            targets::image_positions_and_colors(&img, count, &mut rng)
        }
        other => anyhow::bail!("unknown target kind '{}'; valid: {}", other, KINDS.join(", ")),
    };
    Ok(field)
}

fn read_image(args: &TargetsArgs) -> Result<targets::DynamicImage> {
    let path = args
        .image
        .as_ref()
        .with_context(|| format!("{} targets need --image", args.kind))?;
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let img = targets::decode_image(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(img)
}

fn bounds(positions: &[Vec3]) -> [Vec3; 2] {
    let Some(first) = positions.first() else {
        return [Vec3::ZERO, Vec3::ZERO];
    };
    positions.iter().fold([*first, *first], |[min, max], p| {
        [
            Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
            Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
        ]
    })
}
