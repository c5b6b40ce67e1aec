use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::VertexAttributes;

/// A WGSL program together with the vertex layout it consumes.
///
/// Programs are plain descriptions; the render context compiles and caches
/// the matching pipelines. Equality and hashing cover the whole program, so
/// two programs sharing a name but not a source are distinct.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ShaderProgram {
    pub name: Cow<'static, str>,
    pub source: Cow<'static, str>,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    pub attributes: VertexAttributes,
}

impl ShaderProgram {
    pub const POSITION_COLOR: &'static str = "position_color";

    /// Flat-colored geometry: 2D position plus a packed ABGR color per vertex.
    pub fn position_color() -> Self {
        Self {
            name: Cow::Borrowed(Self::POSITION_COLOR),
            source: Cow::Borrowed(include_str!("shaders/position_color.wgsl")),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            attributes: VertexAttributes::position_color(),
        }
    }
}

/// Named shader programs shared between shapes.
///
/// Passed explicitly to whoever needs a program; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct ShaderRegistry {
    programs: HashMap<Cow<'static, str>, Arc<ShaderProgram>>,
}

impl ShaderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in programs.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ShaderProgram::position_color());
        registry
    }

    /// Registers `program`, replacing any program with the same name.
    pub fn register(&mut self, program: ShaderProgram) -> Arc<ShaderProgram> {
        let program = Arc::new(program);
        if self
            .programs
            .insert(program.name.clone(), Arc::clone(&program))
            .is_some()
        {
            log::debug!("shader program `{}` replaced", program.name);
        }
        program
    }

    pub fn get(&self, name: &str) -> Option<Arc<ShaderProgram>> {
        self.programs.get(name).cloned()
    }

    /// The built-in position/color program.
    pub fn position_color(&self) -> Result<Arc<ShaderProgram>> {
        self.get(ShaderProgram::POSITION_COLOR)
            .context("shader program `position_color` is not registered")
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
