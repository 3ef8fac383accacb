use image::DynamicImage;
use image::imageops::FilterType;
use rten_tensor::NdTensor;

/// Side length of the classifier's square input.
pub const INPUT_SIZE: u32 = 256;

/// Convert a decoded frame into the classifier's input tensor.
///
/// Resizes to 256x256, scales every channel into [0,1] and lays the pixels
/// out as NHWC with a single-image batch dimension.
pub fn to_model_input(frame: &DynamicImage) -> NdTensor<f32, 4> {
    let resized = frame.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let data: Vec<f32> = rgb.as_raw().iter().map(|&v| v as f32 / 255.0).collect();

    NdTensor::from_data([1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3], data)
}
