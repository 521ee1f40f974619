//! Seam toward the host compositor. The host-native adapter (building real
//! layers from the render records) lives outside this crate; what ships here
//! is the capability trait and an offline JSON surface.

use std::io::Write;

use crate::error::{FlatshadeError, FlatshadeResult};
use crate::render::ProjectRender;

/// Injected capability that materializes a finished render.
pub trait ApplyTarget {
    fn apply(&mut self, render: &ProjectRender) -> FlatshadeResult<()>;
}

/// Writes the render as pretty-printed JSON; the offline stand-in for a
/// host-native layer builder.
pub struct JsonApplyTarget<W: Write> {
    writer: W,
}

impl<W: Write> JsonApplyTarget<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ApplyTarget for JsonApplyTarget<W> {
    fn apply(&mut self, render: &ProjectRender) -> FlatshadeResult<()> {
        serde_json::to_writer_pretty(&mut self.writer, render)
            .map_err(|e| FlatshadeError::io(format!("cannot write render: {e}")))?;
        writeln!(self.writer).map_err(|e| FlatshadeError::io(e.to_string()))
    }
}
