// demos/heatmap.rs
//
// Walk the 2×3 sample matrix through the full pipeline and print every
// intermediate: gray→RGB expansion, interleaved→planar reorder, u8
// quantization, and the heat-ramp colormap.
//
// Run with: cargo run --example heatmap

use tintfield::colormap::ColorMap;
use tintfield::convert::{gray_to_rgb, rgb_to_planar, rgb_to_u8};
use tintfield::field::Field;

fn main() {
    // Row-major: row 0 = [0.1, 0.2, 0.33], row 1 = [0.44, 0.55, 0.66].
    let field = Field::from_vec(3, 2, vec![0.1f32, 0.2, 0.33, 0.44, 0.55, 0.66]);
    println!("Source field:\n{field:?}");

    // Gray → RGB (channel replicated three times, interleaved HWC).
    let rgb = gray_to_rgb(&field);
    println!("Gray expanded to RGB:\n{rgb:?}");

    // Reorder so the channel becomes the outermost dimension (CHW).
    let planes = rgb_to_planar(&rgb);
    let plane = field.width() * field.height();
    for (name, p) in ["R", "G", "B"].iter().zip(planes.chunks(plane)) {
        println!("{name} plane: {p:?}");
    }

    // Quantize to display bytes.
    let bytes = rgb_to_u8(&rgb);
    println!("Interleaved u8: {bytes:?}");

    // Heat-map color coding.
    let map = ColorMap::heat();
    let heat = map.apply(&field);
    println!("field -> rgb (heat ramp):\n{heat:?}");
    println!("as u8: {:?}", rgb_to_u8(&heat));
}
