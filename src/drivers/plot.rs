use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;
use crate::drivers::error::ScopeError;
use crate::scope::{ScopeFrame, ViewTransform, Viewport};
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub grid: RGBColor,
    pub trace: RGBColor,
    pub trigger: RGBColor,
    pub marker: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
            grid: RGBColor(90, 90, 90),
            trace: RGBColor(80, 230, 120),
            trigger: RGBColor(230, 160, 40),
            marker: RED,
        }
    }
}
/// Re-targets a frame's transform to another pixel size, keeping the same view.
fn fit_transform(transform: &ViewTransform, width: u32, height: u32) -> ViewTransform {
    let mut fitted = *transform;
    let sx = width as f32 / transform.viewport.width;
    let sy = height as f32 / transform.viewport.height;
    fitted.viewport = Viewport::new(width as f32, height as f32);
    fitted.state.offset_x *= sx;
    fitted.state.offset_y *= sy;
    fitted
}
fn px(v: f32, limit: u32) -> i32 {
    // Keep far off-screen points from wrapping the rasterizer.
    let bound = limit as f32 * 16.0;
    v.clamp(-bound, bound).round() as i32
}
/// Draws grid, trigger level, trace and reference point of one frame into a PNG.
pub fn render_frame_png(frame: &ScopeFrame, style: PlotStyle) -> Result<Vec<u8>, ScopeError> {
    if style.width == 0 || style.height == 0 {
        return Err(ScopeError::Plot("image has zero size".into()));
    }
    let transform = fit_transform(&frame.transform, style.width, style.height);
    let (w, h) = (style.width as i32, style.height as i32);
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let grid = style.grid.mix(0.6);
        for &t in &frame.time_ticks {
            let x = px(transform.time_to_screen(t as f32), style.width);
            if (0..w).contains(&x) {
                root.draw(&PathElement::new(vec![(x, 0), (x, h)], &grid))?;
            }
        }
        for &v in &frame.volt_ticks {
            let y = px(transform.volts_to_screen(v as f32), style.height);
            if (0..h).contains(&y) {
                root.draw(&PathElement::new(vec![(0, y), (w, y)], &grid))?;
            }
        }
        let ty = px(transform.volts_to_screen(frame.trigger_volts), style.height);
        root.draw(&PathElement::new(vec![(0, ty), (w, ty)], &style.trigger))?;
        let trace: Vec<(i32, i32)> = frame
            .samples
            .iter()
            .enumerate()
            .map(|(i, &raw)| {
                let (x, y) = transform.point_to_screen(i, raw);
                (px(x, style.width), px(y, style.height))
            })
            .collect();
        if trace.len() > 1 {
            root.draw(&PathElement::new(trace, &style.trace))?;
        }
        if let Some(reference) = frame.reference {
            let x = px(transform.time_to_screen(reference.t_ms), style.width);
            let y = px(transform.volts_to_screen(reference.volts), style.height);
            root.draw(&Circle::new((x, y), 4, ShapeStyle::from(&style.marker).filled()))?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScopeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ScopeError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ScopeConfig, ScopePipeline, ViewCommand};
    const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];
    fn frame() -> ScopeFrame {
        let mut pipeline = ScopePipeline::new(ScopeConfig::new(10_000, 3, 12, 50));
        let wave: Vec<u16> = (0..4000).map(|i| if i % 200 < 100 { 3000 } else { 800 }).collect();
        pipeline.ingest(&wave);
        pipeline.enqueue(ViewCommand::Resize { width: 1200.0, height: 600.0 });
        pipeline.enqueue(ViewCommand::Zoom { delta: -1.0, x: 600.0, y: 300.0 });
        pipeline.enqueue(ViewCommand::Freeze(true));
        pipeline.enqueue(ViewCommand::MarkReference { x: 600.0, y: 300.0 });
        pipeline.frame()
    }
    #[test]
    fn renders_png() {
        let png = render_frame_png(&frame(), PlotStyle::default()).unwrap();
        assert_eq!(&png[..4], &PNG_MAGIC);
    }
    #[test]
    fn transform_is_rescaled_with_image() {
        let frame = frame();
        let fitted = fit_transform(&frame.transform, 600, 300);
        let t = frame.transform.screen_to_time(600.0);
        assert!((fitted.time_to_screen(t) - 300.0).abs() < 1e-2);
    }
    #[test]
    fn zero_sized_image_is_rejected() {
        let style = PlotStyle {
            width: 0,
            ..PlotStyle::default()
        };
        assert!(matches!(render_frame_png(&frame(), style), Err(ScopeError::Plot(_))));
    }
}
