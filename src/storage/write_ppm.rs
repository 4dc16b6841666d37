use crate::core::data::render_image::ImageSnapshot;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `image` as a binary PPM (P6) file.
pub fn write_ppm(image: &ImageSnapshot, filepath: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(filepath)?);

    // PPM header: P6 means binary RGB, then width height max_colour
    writeln!(file, "P6")?;
    writeln!(file, "{} {}", image.width(), image.height())?;
    writeln!(file, "255")?;
    file.write_all(&image.to_rgb_bytes())?;
    file.flush()?;

    Ok(())
}
