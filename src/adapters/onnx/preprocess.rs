use image::{imageops::FilterType, RgbImage};

/// Resizes `rgb` to `size` x `size` (bilinear) and lays it out as a
/// `[1][3][size][size]` tensor with channels scaled to `[0, 1]`.
pub fn to_input_tensor(rgb: &RgbImage, size: u32) -> Vec<f32> {
    let resized = image::imageops::resize(rgb, size, size, FilterType::Triangle);
    let plane = (size as usize) * (size as usize);

    let mut input = vec![0.0f32; 3 * plane];
    for (x, y, pixel) in resized.enumerate_pixels() {
        let idx = y as usize * size as usize + x as usize;
        input[idx] = pixel[0] as f32 / 255.0;
        input[plane + idx] = pixel[1] as f32 / 255.0;
        input[2 * plane + idx] = pixel[2] as f32 / 255.0;
    }
    input
}
