use anyhow::{bail, Result};

/// Scalar type of one vertex attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComponentType {
    Float32,
    Uint8,
}

impl ComponentType {
    #[inline]
    pub const fn byte_size(self) -> u64 {
        match self {
            ComponentType::Float32 => 4,
            ComponentType::Uint8 => 1,
        }
    }
}

/// One attribute inside an interleaved vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    pub name: &'static str,
    pub components: u8,
    pub component_type: ComponentType,
    /// Integer components are mapped to `[0, 1]` when set.
    pub normalized: bool,
    /// Byte offset inside the vertex.
    pub offset: u64,
}

impl VertexAttribute {
    #[inline]
    pub const fn byte_size(&self) -> u64 {
        self.components as u64 * self.component_type.byte_size()
    }

    /// Matching wgpu vertex format, if wgpu can express this combination.
    pub fn wgpu_format(&self) -> Result<wgpu::VertexFormat> {
        use wgpu::VertexFormat as F;

        let format = match (self.component_type, self.components, self.normalized) {
            (ComponentType::Float32, 1, _) => F::Float32,
            (ComponentType::Float32, 2, _) => F::Float32x2,
            (ComponentType::Float32, 3, _) => F::Float32x3,
            (ComponentType::Float32, 4, _) => F::Float32x4,
            (ComponentType::Uint8, 2, true) => F::Unorm8x2,
            (ComponentType::Uint8, 4, true) => F::Unorm8x4,
            (ComponentType::Uint8, 2, false) => F::Uint8x2,
            (ComponentType::Uint8, 4, false) => F::Uint8x4,
            (ty, n, norm) => bail!(
                "vertex attribute `{}`: {n} x {ty:?} (normalized: {norm}) has no wgpu format",
                self.name
            ),
        };
        Ok(format)
    }
}

/// Interleaved vertex layout shared by a buffer and the shader consuming it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttributes {
    attributes: Vec<VertexAttribute>,
    stride: u64,
}

impl VertexAttributes {
    #[inline]
    pub fn builder() -> VertexAttributesBuilder {
        VertexAttributesBuilder::default()
    }

    /// Position (2 x f32, location 0) followed by a packed color (4 x u8 normalized, location 1).
    pub fn position_color() -> Self {
        Self::builder()
            .add(0, "position", 2, ComponentType::Float32, false)
            .add(1, "color", 4, ComponentType::Uint8, true)
            .build()
    }

    #[inline]
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Size of one vertex in bytes.
    #[inline]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn get(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Converts to wgpu attribute descriptors, failing on unsupported combinations.
    pub fn to_wgpu(&self) -> Result<Vec<wgpu::VertexAttribute>> {
        self.attributes
            .iter()
            .map(|a| {
                Ok(wgpu::VertexAttribute {
                    format: a.wgpu_format()?,
                    offset: a.offset,
                    shader_location: a.location,
                })
            })
            .collect()
    }
}

/// Accumulates attributes in declaration order, packing them back to back.
#[derive(Debug, Default)]
pub struct VertexAttributesBuilder {
    attributes: Vec<VertexAttribute>,
    offset: u64,
}

impl VertexAttributesBuilder {
    pub fn add(
        mut self,
        location: u32,
        name: &'static str,
        components: u8,
        component_type: ComponentType,
        normalized: bool,
    ) -> Self {
        let attribute = VertexAttribute {
            location,
            name,
            components,
            component_type,
            normalized,
            offset: self.offset,
        };
        self.offset += attribute.byte_size();
        self.attributes.push(attribute);
        self
    }

    pub fn build(self) -> VertexAttributes {
        VertexAttributes {
            attributes: self.attributes,
            stride: self.offset,
        }
    }
}
