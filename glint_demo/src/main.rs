//! Textured quad demo.
//!
//! Composes the full pipeline: a unit quad with position, color, and
//! texture-coordinate streams, byte-width indices, a two-stage shader, and
//! one diffuse texture on unit 0. Runs headless against the trace device by
//! default; `--window` opens a real window instead (the loop runs the same
//! either way, the driver itself being out of scope).
//!
//! Usage:
//!   glint_demo [--frames N] [--window] [--ms] [--texture PATH]
//!
//! `--ms` switches the once-per-second sample from frames-per-second to
//! average milliseconds per frame. `--texture` uploads a PNG instead of the
//! built-in checkerboard.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use glint_render_core::glint::device::{
    GraphicsDevice, IndexElementType, SamplingDesc, StageKind, TraceDevice,
};
use glint_render_core::glint::pipeline::{RenderPipeline, RenderPipelineDesc};
use glint_render_core::glint::resource::{
    DecodedImage, GeometryBuffer, GeometryDesc, ImageDecoder, IndexStreamDesc, PngFileDecoder,
    ShaderPipeline, ShaderPipelineDesc, StageDesc, StreamDesc, Texture, TextureDesc,
};
use glint_render_core::glint::surface::{HeadlessProvider, SurfaceConfig, SurfaceProvider, WinitProvider};
use glint_render_core::glint::{AppConfig, Application, RateMonitor, Result};
use glint_render_core::{render_error, render_info};

const VERTEX_SHADER: &str = "\
#version 150 core

in vec4 in_Position;
in vec4 in_Color;
in vec2 in_TextureCoord;

out vec4 pass_Color;
out vec2 pass_TextureCoord;

void main() {
    gl_Position = in_Position;
    pass_Color = in_Color;
    pass_TextureCoord = in_TextureCoord;
}
";

const FRAGMENT_SHADER: &str = "\
#version 150 core

uniform sampler2D texture_diffuse;

in vec4 pass_Color;
in vec2 pass_TextureCoord;

out vec4 out_Color;

void main() {
    out_Color = pass_Color * texture(texture_diffuse, pass_TextureCoord);
}
";

struct Options {
    frames: u64,
    windowed: bool,
    monitor: RateMonitor,
    texture: Option<PathBuf>,
}

fn parse_options() -> std::result::Result<Options, String> {
    let mut options = Options {
        frames: 300,
        windowed: false,
        monitor: RateMonitor::FramesPerSecond,
        texture: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--frames" => {
                let value = args.next().ok_or("--frames needs a value")?;
                options.frames = value
                    .parse()
                    .map_err(|_| format!("bad frame count: {}", value))?;
            }
            "--window" => options.windowed = true,
            "--ms" => options.monitor = RateMonitor::MillisPerFrame,
            "--texture" => {
                let value = args.next().ok_or("--texture needs a path")?;
                options.texture = Some(PathBuf::from(value));
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(options)
}

/// 4x4 two-tone checkerboard, used when no texture file is given
fn checkerboard() -> DecodedImage {
    let mut pixels = Vec::with_capacity(4 * 4 * 4);
    for y in 0..4u32 {
        for x in 0..4u32 {
            if (x + y) % 2 == 0 {
                pixels.extend_from_slice(&[230, 230, 230, 255]);
            } else {
                pixels.extend_from_slice(&[40, 40, 40, 255]);
            }
        }
    }
    DecodedImage {
        width: 4,
        height: 4,
        pixels,
    }
}

/// The composed drawable: quad geometry, two-stage shader, diffuse texture
fn build_pipeline(
    device: Arc<Mutex<dyn GraphicsDevice>>,
    image: DecodedImage,
) -> Result<RenderPipeline> {
    #[rustfmt::skip]
    let positions: [f32; 16] = [
        -0.5,  0.5, 0.0, 1.0,
        -0.5, -0.5, 0.0, 1.0,
         0.5, -0.5, 0.0, 1.0,
         0.5,  0.5, 0.0, 1.0,
    ];
    #[rustfmt::skip]
    let colors: [f32; 16] = [
        1.0, 0.0, 0.0, 1.0,
        0.0, 1.0, 0.0, 1.0,
        0.0, 0.0, 1.0, 1.0,
        1.0, 1.0, 1.0, 1.0,
    ];
    #[rustfmt::skip]
    let texture_coords: [f32; 8] = [
        0.0, 0.0,
        0.0, 1.0,
        1.0, 1.0,
        1.0, 0.0,
    ];

    let geometry = GeometryBuffer::from_desc(GeometryDesc {
        device: device.clone(),
        streams: vec![
            StreamDesc::from_f32(0, 4, &positions),
            StreamDesc::from_f32(1, 4, &colors),
            StreamDesc::from_f32(2, 2, &texture_coords),
        ],
        vertex_count: 4,
        indices: Some(IndexStreamDesc {
            element_type: IndexElementType::U8,
            values: vec![0, 1, 2, 0, 2, 3],
        }),
    })?;

    let shader = ShaderPipeline::from_desc(ShaderPipelineDesc {
        device: device.clone(),
        stages: vec![
            StageDesc {
                kind: StageKind::Vertex,
                source: VERTEX_SHADER.to_string(),
            },
            StageDesc {
                kind: StageKind::Fragment,
                source: FRAGMENT_SHADER.to_string(),
            },
        ],
        attribute_bindings: vec![
            (0, "in_Position".to_string()),
            (1, "in_Color".to_string()),
            (2, "in_TextureCoord".to_string()),
        ],
    })?;

    let texture = Texture::from_desc(TextureDesc {
        device: device.clone(),
        image,
        unit: 0,
        sampling: SamplingDesc::default(),
        generate_mipmaps: true,
    })?;

    RenderPipeline::from_desc(RenderPipelineDesc {
        device,
        geometry,
        shader: Some(shader),
        textures: vec![texture],
    })
}

fn run(options: Options) -> Result<()> {
    let trace = Arc::new(Mutex::new(TraceDevice::new()));
    let device: Arc<Mutex<dyn GraphicsDevice>> = trace.clone();

    let image = match &options.texture {
        Some(path) => PngFileDecoder.decode(path)?,
        None => checkerboard(),
    };

    let provider: Box<dyn SurfaceProvider> = if options.windowed {
        Box::new(WinitProvider)
    } else {
        Box::new(HeadlessProvider::with_frame_budget(options.frames))
    };

    let config = AppConfig {
        surface: SurfaceConfig {
            title: "Textured quad".to_string(),
            ..SurfaceConfig::default()
        },
        monitor: options.monitor,
        ..AppConfig::default()
    };

    let mut app = Application::new(config, device, provider);
    app.init(|device| build_pipeline(device, image))?;
    app.run()?;

    let trace = trace.lock().unwrap();
    render_info!(
        "glint_demo",
        "session complete: {} draws, {} clears, device clean: {}",
        trace.draw_commands().len(),
        trace.clear_count(),
        trace.is_unbound() && trace.alive_buffers() == 0
    );
    Ok(())
}

fn main() -> ExitCode {
    let options = match parse_options() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("glint_demo: {}", message);
            eprintln!("usage: glint_demo [--frames N] [--window] [--ms] [--texture PATH]");
            return ExitCode::FAILURE;
        }
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            render_error!("glint_demo", "{}", err);
            ExitCode::FAILURE
        }
    }
}
