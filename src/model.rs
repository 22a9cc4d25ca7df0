#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
}

impl Vertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub const fn new(x: f32, y: f32) -> Self {
        Self { position: [x, y] }
    }

    /// Layout of vertex buffer slot 0: an 8 byte stride with one `vec2<f32>` at location 0.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Two triangles forming a square with half-extent 0.8 around the origin.
pub const VERTICES: &[Vertex] = &[
    Vertex::new(-0.8, -0.8),
    Vertex::new(0.8, -0.8),
    Vertex::new(0.8, 0.8),
    Vertex::new(-0.8, -0.8),
    Vertex::new(0.8, 0.8),
    Vertex::new(-0.8, 0.8),
];

pub fn vertex_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Number of vertices to draw: one per pair of floats.
pub fn draw_count(vertices: &[Vertex]) -> u32 {
    let floats: &[f32] = bytemuck::cast_slice(vertices);
    (floats.len() / 2) as u32
}
