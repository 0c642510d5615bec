// demos/window.rs
//
// Render an animated synthetic field through the heat ramp into a minifb
// window. Esc closes it.
//
// Run with: cargo run --example window

use minifb::{Key, Window, WindowOptions};

use tintfield::colormap::ColorMap;
use tintfield::field::Field;

const WIDTH: usize = 640;
const HEIGHT: usize = 480;

/// Two drifting radial bumps on a faint ramp, normalized to [0, 1].
fn make_field(t: f32) -> Field<f32> {
    let mut field = Field::new(WIDTH, HEIGHT);
    let (cx1, cy1) = (
        WIDTH as f32 * (0.5 + 0.3 * t.cos()),
        HEIGHT as f32 * (0.5 + 0.3 * t.sin()),
    );
    let (cx2, cy2) = (
        WIDTH as f32 * (0.5 + 0.25 * (1.7 * t + 1.0).sin()),
        HEIGHT as f32 * (0.5 + 0.25 * (1.3 * t).cos()),
    );
    let sigma2 = 2.0 * 60.0f32.powi(2);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let d1 = (x as f32 - cx1).powi(2) + (y as f32 - cy1).powi(2);
            let d2 = (x as f32 - cx2).powi(2) + (y as f32 - cy2).powi(2);
            let v = 0.1 * (x + y) as f32 / (WIDTH + HEIGHT) as f32
                + 0.9 * (-d1 / sigma2).exp()
                + 0.7 * (-d2 / sigma2).exp();
            field.set(x, y, v.min(1.0));
        }
    }
    field
}

fn main() {
    let mut window = Window::new(
        "tintfield — heat ramp",
        WIDTH,
        HEIGHT,
        WindowOptions::default(),
    )
    .expect("failed to open window");
    window.set_target_fps(30);

    let map = ColorMap::heat();
    let mut framebuffer = vec![0u32; WIDTH * HEIGHT];
    let mut t = 0.0f32;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let rgb = map.apply(&make_field(t));

        // Pack [0,1] channels into minifb's 0RGB u32 layout.
        for (i, px) in rgb.as_slice().chunks_exact(3).enumerate() {
            let r = (px[0] * 255.0) as u32;
            let g = (px[1] * 255.0) as u32;
            let b = (px[2] * 255.0) as u32;
            framebuffer[i] = (r << 16) | (g << 8) | b;
        }

        window
            .update_with_buffer(&framebuffer, WIDTH, HEIGHT)
            .expect("window update failed");
        t += 0.03;
    }
}
