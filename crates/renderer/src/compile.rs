use std::fmt;

/// Version directive injected ahead of both stages.
pub const VERSION_DIRECTIVE: &str = "#version 300 es";

/// Default precision injected ahead of both stages.
pub const PRECISION_DIRECTIVE: &str = "precision highp float;";

/// Name of the optional `vec2` uniform carrying the drawable size in pixels.
pub const WINDOW_SIZE_UNIFORM: &str = "u_window_size";

/// Name of the optional `float` uniform carrying elapsed seconds.
pub const TIME_UNIFORM: &str = "u_time";

/// Full-screen triangle built from `gl_VertexID`; no vertex buffer is bound.
///
/// Vertex 0 lands on (-1, -1), vertex 1 on (3, -1) and vertex 2 on (-1, 3),
/// which covers the whole clip-space square.
pub const VERTEX_SHADER_BODY: &str = r"void main()
{
    highp vec2 v = 4.0 * vec2(gl_VertexID & 1, (gl_VertexID >> 1) & 1) - 1.0;
    gl_Position = vec4(v, 0.0, 1.0);
}
";

/// Pipeline stage, used to label driver diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Produces the complete source handed to the driver for one stage.
///
/// A leading `#version` line in `body` is blanked rather than removed so the
/// `#line 1` reset keeps driver line numbers aligned with the user's file.
pub fn assemble_stage_source(body: &str) -> String {
    let mut assembled = String::with_capacity(body.len() + 64);
    assembled.push_str(VERSION_DIRECTIVE);
    assembled.push('\n');
    assembled.push_str(PRECISION_DIRECTIVE);
    assembled.push('\n');
    assembled.push_str("#line 1\n");

    let mut skipped_version = false;
    for line in body.lines() {
        if !skipped_version && line.trim_start().starts_with("#version") {
            skipped_version = true;
        } else {
            assembled.push_str(line);
        }
        assembled.push('\n');
    }
    assembled
}

/// Driver logs gathered after `glLinkProgram` reported failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFailure {
    pub program_log: String,
    pub vertex_log: Option<String>,
    pub fragment_log: Option<String>,
}

impl LinkFailure {
    /// Stages whose compilation failed, in pipeline order.
    pub fn failed_stages(&self) -> Vec<ShaderStage> {
        let mut stages = Vec::new();
        if self.vertex_log.is_some() {
            stages.push(ShaderStage::Vertex);
        }
        if self.fragment_log.is_some() {
            stages.push(ShaderStage::Fragment);
        }
        stages
    }

    /// Emits one error event for the link log and one per failed stage.
    pub fn log(&self) {
        tracing::error!("shader linking error:\n{}", self.program_log.trim_end());
        if let Some(log) = &self.vertex_log {
            tracing::error!(stage = %ShaderStage::Vertex, "shader compilation error:\n{}", log.trim_end());
        }
        if let Some(log) = &self.fragment_log {
            tracing::error!(stage = %ShaderStage::Fragment, "shader compilation error:\n{}", log.trim_end());
        }
    }
}

impl fmt::Display for LinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages = self.failed_stages();
        if stages.is_empty() {
            f.write_str("shader program failed to link")
        } else {
            let names: Vec<String> = stages.iter().map(ToString::to_string).collect();
            write!(
                f,
                "shader program failed to link ({} compilation failed)",
                names.join(" and ")
            )
        }
    }
}

/// Failures while building the shader program.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("can't create {what}: {reason}")]
    Create { what: &'static str, reason: String },
    #[error("{0}")]
    Link(LinkFailure),
}
