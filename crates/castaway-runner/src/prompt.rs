//! Prompt template loading and rendering via `minijinja`.
//!
//! The built-in templates under `templates/` are compiled into the binary.
//! Operators can point `llm.templates_dir` at a directory holding their own
//! copies to tune agent behavior without recompiling. The perception is
//! rendered section by section into a system message and a user message.

use std::path::Path;

use castaway_types::Perception;
use minijinja::Environment;

use crate::error::LlmError;

/// Template names, in the order their output appears in the user message
/// (after `system`, which becomes the system message).
const SECTIONS: [&str; 4] = ["identity", "perception", "memory", "actions"];

const BUILTIN: [(&str, &str); 5] = [
    ("system", include_str!("../templates/system.j2")),
    ("identity", include_str!("../templates/identity.j2")),
    ("perception", include_str!("../templates/perception.j2")),
    ("memory", include_str!("../templates/memory.j2")),
    ("actions", include_str!("../templates/actions.j2")),
];

/// Manages prompt template loading and rendering.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl core::fmt::Debug for PromptEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PromptEngine").finish_non_exhaustive()
    }
}

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// System message establishing the agent's reality.
    pub system: String,
    /// User message containing identity, surroundings, memory, and actions.
    pub user: String,
}

impl PromptEngine {
    /// Engine using the built-in templates.
    pub fn builtin() -> Result<Self, LlmError> {
        let mut env = Environment::new();
        for (name, source) in BUILTIN {
            env.add_template(name, source)
                .map_err(|e| LlmError::Template(format!("failed to add {name} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Engine loading every template from `dir` (`system.j2`,
    /// `identity.j2`, `perception.j2`, `memory.j2`, `actions.j2`).
    pub fn from_dir(dir: &Path) -> Result<Self, LlmError> {
        let mut env = Environment::new();
        for (name, _) in BUILTIN {
            let path = dir.join(format!("{name}.j2"));
            let source = std::fs::read_to_string(&path)
                .map_err(|e| LlmError::Template(format!("failed to read {}: {e}", path.display())))?;
            env.add_template_owned(name, source)
                .map_err(|e| LlmError::Template(format!("failed to add {name} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Engine from an optional override directory.
    pub fn new(templates_dir: Option<&str>) -> Result<Self, LlmError> {
        match templates_dir {
            Some(dir) => Self::from_dir(Path::new(dir)),
            None => Self::builtin(),
        }
    }

    /// Render the full prompt for one agent's decision.
    pub fn render(&self, perception: &Perception) -> Result<RenderedPrompt, LlmError> {
        let system = self.render_section("system", perception)?;
        let mut parts = Vec::with_capacity(SECTIONS.len());
        for name in SECTIONS {
            let text = self.render_section(name, perception)?;
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_owned());
            }
        }
        Ok(RenderedPrompt {
            system: system.trim().to_owned(),
            user: parts.join("\n\n"),
        })
    }

    fn render_section(&self, name: &str, perception: &Perception) -> Result<String, LlmError> {
        self.env
            .get_template(name)
            .map_err(|e| LlmError::Template(format!("missing {name} template: {e}")))?
            .render(perception)
            .map_err(|e| LlmError::Template(format!("{name} render failed: {e}")))
    }
}
