use image::ImageReader;
use image_effect::{FilterBank, FilterKind, GridConfig, Labeler, compose_grid};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    let img_path = Path::new("data/test.png");
    let img = ImageReader::open(img_path)?.decode()?.to_rgb8();

    let set = FilterBank::new().apply(&img);
    for (kind, raster) in set.iter() {
        let path = output_dir.join(format!("{}.png", kind.name()));
        raster.to_dynamic().save(&path)?;
        println!("✓ {} -> {}", kind.title(), path.display());
    }

    let grid = compose_grid(&set, &Labeler::from_system_fonts(), &GridConfig::new())?;
    grid.save(output_dir.join("grid.png"))?;

    println!("✓ Grid: tmp/grid.png");
    println!("  Binary channels: {}", set.get(FilterKind::Binary).channel_count());

    Ok(())
}
