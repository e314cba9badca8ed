use clap::Parser;
use image::GrayImage;
use metaballs::{Grid, RenderConfig, ScalarField};
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    /// A single record, e.g. "A(0.0, 0.0) B(0.02, 0.0)"
    record: String,

    /// Field width in samples
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Field height in samples
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Output file path
    #[arg(short, long, default_value = "field.png")]
    output: PathBuf,
}

fn main() {
    let args = Args::parse();

    let config = RenderConfig::new(args.width, args.height).unwrap();
    let record = metaballs::parse_line(&args.record, &config.transform).unwrap();
    let grid = Grid::new(&config.extent, args.width as usize, args.height as usize);
    let field = ScalarField::synthesize(&grid, &config.kernel, record.points());
    let mask = field.threshold(config.threshold);

    // Raw field, brightest sample white; y up
    let max = field.max().max(f64::MIN_POSITIVE);
    let mut img = GrayImage::new(args.width, args.height);
    for y in 0..args.height {
        for x in 0..args.width {
            let value = field.get(x as usize, (args.height - 1 - y) as usize) / max;
            let pixel = (value * 255.0).round() as u8;
            img.put_pixel(x, y, image::Luma([pixel]));
        }
    }

    img.save(&args.output).unwrap();
    println!(
        "Saved {}x{} field of {} cells and {} mutants (max={:.4}, {} samples over {}) to {}",
        args.width,
        args.height,
        record.cells.len(),
        record.mutants.len(),
        field.max(),
        mask.count_on(),
        config.threshold,
        args.output.display(),
    );
}
