use crate::error::{Error, Result};
use crate::model::{self, Vertex};

/// GPU copy of a vertex array, sized exactly to its bytes.
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl VertexBuffer {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn size(&self) -> wgpu::BufferAddress {
        self.buffer.size()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}

/// Bytes to upload for `vertices`. Empty input is rejected, since a zero-sized
/// vertex buffer cannot be bound.
pub fn vertex_payload(vertices: &[Vertex]) -> Result<&[u8]> {
    if vertices.is_empty() {
        return Err(Error::EmptyVertices);
    }
    Ok(model::vertex_bytes(vertices))
}

/// Allocates a fresh buffer for `vertices` and queues the write.
pub fn upload_vertices(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    vertices: &[Vertex],
) -> Result<VertexBuffer> {
    let bytes = vertex_payload(vertices)?;

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Cell vertices"),
        size: bytes.len() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    queue.write_buffer(&buffer, 0, bytes);

    log::debug!("uploaded {} vertices ({} bytes)", vertices.len(), bytes.len());

    Ok(VertexBuffer {
        buffer,
        vertex_count: model::draw_count(vertices),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vertices_are_rejected() {
        assert!(matches!(vertex_payload(&[]), Err(Error::EmptyVertices)));
    }

    #[test]
    fn payload_is_the_whole_square() {
        let payload = vertex_payload(model::VERTICES).unwrap();
        assert_eq!(payload.len(), 48);
        assert_eq!(payload, model::vertex_bytes(model::VERTICES));
    }

    #[test]
    fn repeated_payloads_are_bit_identical() {
        let first = vertex_payload(model::VERTICES).unwrap().to_vec();
        let second = vertex_payload(model::VERTICES).unwrap().to_vec();
        assert_eq!(first, second);
    }
}
