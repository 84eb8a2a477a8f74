use nalgebra::Matrix4;
use wasm_bindgen::prelude::*;
use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext, WebGlUniformLocation};

const VERTEX_SHADER: &str = r#"
    attribute vec3 aPosition;
    uniform mat4 uViewProjection;
    uniform float uPointSize;
    void main() {
        gl_Position = uViewProjection * vec4(aPosition, 1.0);
        gl_PointSize = uPointSize;
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    precision mediump float;
    uniform vec3 uColor;
    void main() {
        gl_FragColor = vec4(uColor, 1.0);
    }
"#;

pub struct Renderer {
    pub gl: WebGlRenderingContext,
    view_proj_location: WebGlUniformLocation,
    color_location: WebGlUniformLocation,
    point_size_location: WebGlUniformLocation,
    position_location: u32,
    dynamic_vertex_buffer: WebGlBuffer,
}

impl Renderer {
    pub fn new(gl: WebGlRenderingContext) -> Result<Self, JsValue> {
        let program = create_program(&gl)?;
        gl.use_program(Some(&program));

        let dynamic_vertex_buffer = gl.create_buffer().ok_or("Failed to create buffer")?;

        let view_proj_location = gl
            .get_uniform_location(&program, "uViewProjection")
            .ok_or("Failed to get uViewProjection location")?;
        let color_location = gl
            .get_uniform_location(&program, "uColor")
            .ok_or("Failed to get uColor location")?;
        let point_size_location = gl
            .get_uniform_location(&program, "uPointSize")
            .ok_or("Failed to get uPointSize location")?;
        let position_location = gl.get_attrib_location(&program, "aPosition") as u32;

        Ok(Renderer {
            gl,
            view_proj_location,
            color_location,
            point_size_location,
            position_location,
            dynamic_vertex_buffer,
        })
    }

    pub fn clear(&self, r: f32, g: f32, b: f32) {
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear(
            WebGlRenderingContext::COLOR_BUFFER_BIT | WebGlRenderingContext::DEPTH_BUFFER_BIT,
        );
    }

    pub fn enable_depth_test(&self) {
        self.gl.enable(WebGlRenderingContext::DEPTH_TEST);
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    fn upload(&self, vertices: &[f32], view_proj: &Matrix4<f32>, r: f32, g: f32, b: f32) {
        self.gl.bind_buffer(
            WebGlRenderingContext::ARRAY_BUFFER,
            Some(&self.dynamic_vertex_buffer),
        );
        unsafe {
            let vert_array = js_sys::Float32Array::view(vertices);
            self.gl.buffer_data_with_array_buffer_view(
                WebGlRenderingContext::ARRAY_BUFFER,
                &vert_array,
                WebGlRenderingContext::DYNAMIC_DRAW,
            );
        }

        self.gl.vertex_attrib_pointer_with_i32(
            self.position_location,
            3,
            WebGlRenderingContext::FLOAT,
            false,
            0,
            0,
        );
        self.gl.enable_vertex_attrib_array(self.position_location);

        self.gl.uniform3f(Some(&self.color_location), r, g, b);

        let mut vp_array = [0.0f32; 16];
        vp_array.copy_from_slice(view_proj.as_slice());
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(&self.view_proj_location), false, &vp_array);
    }

    /// Draws `vertices` (xyz triples) as sized points of one color.
    pub fn draw_points(
        &self,
        vertices: &[f32],
        point_size: f32,
        r: f32,
        g: f32,
        b: f32,
        view_proj: &Matrix4<f32>,
    ) {
        if vertices.is_empty() {
            return;
        }
        self.upload(vertices, view_proj, r, g, b);
        self.gl
            .uniform1f(Some(&self.point_size_location), point_size);
        self.gl
            .draw_arrays(WebGlRenderingContext::POINTS, 0, (vertices.len() / 3) as i32);
    }

    /// Draws `vertices` as one connected strip, for rings and circles.
    pub fn draw_line_strip(
        &self,
        vertices: &[f32],
        r: f32,
        g: f32,
        b: f32,
        view_proj: &Matrix4<f32>,
    ) {
        if vertices.is_empty() {
            return;
        }
        self.upload(vertices, view_proj, r, g, b);
        self.gl.draw_arrays(
            WebGlRenderingContext::LINE_STRIP,
            0,
            (vertices.len() / 3) as i32,
        );
    }

    /// Draws `vertices` as independent segments (point pairs), for the
    /// distance poles and axis lines.
    pub fn draw_segments(
        &self,
        vertices: &[f32],
        r: f32,
        g: f32,
        b: f32,
        view_proj: &Matrix4<f32>,
    ) {
        if vertices.is_empty() {
            return;
        }
        self.upload(vertices, view_proj, r, g, b);
        self.gl
            .draw_arrays(WebGlRenderingContext::LINES, 0, (vertices.len() / 3) as i32);
    }
}

fn create_program(gl: &WebGlRenderingContext) -> Result<WebGlProgram, JsValue> {
    let vert_shader = compile_shader(gl, WebGlRenderingContext::VERTEX_SHADER, VERTEX_SHADER)?;
    let frag_shader = compile_shader(gl, WebGlRenderingContext::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl.create_program().ok_or("Unable to create program")?;
    gl.attach_shader(&program, &vert_shader);
    gl.attach_shader(&program, &frag_shader);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, WebGlRenderingContext::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        Err(JsValue::from_str(
            &gl.get_program_info_log(&program).unwrap_or_default(),
        ))
    }
}

fn compile_shader(
    gl: &WebGlRenderingContext,
    shader_type: u32,
    source: &str,
) -> Result<web_sys::WebGlShader, JsValue> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or("Unable to create shader")?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, WebGlRenderingContext::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        Err(JsValue::from_str(
            &gl.get_shader_info_log(&shader).unwrap_or_default(),
        ))
    }
}
