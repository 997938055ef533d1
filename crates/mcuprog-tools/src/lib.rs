//! Tool registry and dispatch
//!
//! This crate opens programming tools by name, with support for
//! feature-gated inclusion and dynamic help text generation. The front end
//! only sees the [`Engine`] trait; [`ToolRegistry`] is itself an engine that
//! picks the tool named in the arguments and delegates to it.

use mcuprog_core::{Engine, EngineError, StructuredArguments};

/// Information about a tool
pub struct ToolInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available tools (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_tools() -> Vec<ToolInfo> {
    let mut tools = Vec::new();

    #[cfg(feature = "sim")]
    tools.push(ToolInfo {
        name: "sim",
        aliases: &["simulator", "dummy"],
        description: "Simulated UPDI kit with an in-memory target",
    });

    tools
}

/// Generate a short list of tool names for CLI help
pub fn tool_names_short() -> String {
    let names: Vec<&str> = available_tools().iter().map(|t| t.name).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Resolve a tool name or alias to its primary name
pub fn find_tool(name: &str) -> Option<&'static str> {
    available_tools()
        .into_iter()
        .find(|t| {
            t.name.eq_ignore_ascii_case(name)
                || t.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
        })
        .map(|t| t.name)
}

/// Open the tool named in `args`
pub fn open_tool(args: &StructuredArguments) -> Result<Box<dyn Engine>, EngineError> {
    let requested = args.tool.as_deref().ok_or(EngineError::NoToolConnected)?;
    let name = find_tool(requested).ok_or_else(|| EngineError::ToolNotFound {
        name: requested.to_string(),
        available: tool_names_short(),
    })?;

    if let Some(serial) = &args.serialnumber {
        log::debug!("Looking for {} with serial number '{}'", name, serial);
    }

    match name {
        #[cfg(feature = "sim")]
        "sim" => open_sim(args),

        _ => Err(EngineError::ToolNotFound {
            name: requested.to_string(),
            available: tool_names_short(),
        }),
    }
}

#[cfg(feature = "sim")]
fn open_sim(args: &StructuredArguments) -> Result<Box<dyn Engine>, EngineError> {
    log::info!("Opening simulated tool...");
    let tool = mcuprog_sim::SimTool::open(args.device.as_deref())?;
    Ok(Box::new(tool))
}

/// Engine that opens the requested tool and delegates to it
///
/// The opened tool is kept, so consecutive runs naming the same tool talk
/// to the same connection.
#[derive(Default)]
pub struct ToolRegistry {
    current: Option<(&'static str, Box<dyn Engine>)>,
}

impl ToolRegistry {
    /// Create a registry with no tool opened yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary name of the currently opened tool
    pub fn current_tool(&self) -> Option<&'static str> {
        self.current.as_ref().map(|(name, _)| *name)
    }
}

impl Engine for ToolRegistry {
    fn run(&mut self, args: &StructuredArguments) -> Result<(), EngineError> {
        let wanted = args.tool.as_deref().and_then(find_tool);

        let reuse = matches!(
            (&self.current, wanted),
            (Some((open, _)), Some(name)) if *open == name
        );
        if !reuse {
            self.current = None;
            let engine = open_tool(args)?;
            // open_tool only succeeds for names find_tool knows
            let name = wanted.unwrap_or_default();
            self.current = Some((name, engine));
        }

        match self.current.as_mut() {
            Some((_, engine)) => engine.run(args),
            None => Err(EngineError::NoToolConnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcuprog_core::Action;

    #[test]
    fn test_no_tool() {
        let err = open_tool(&StructuredArguments::default()).err().unwrap();
        assert_eq!(err.kind(), "NoToolConnected");

        let mut registry = ToolRegistry::new();
        let err = registry.run(&StructuredArguments::default()).unwrap_err();
        assert_eq!(err.kind(), "NoToolConnected");
        assert!(registry.current_tool().is_none());
    }

    #[test]
    fn test_unknown_tool() {
        let args = StructuredArguments {
            tool: Some("pickit9".to_string()),
            ..Default::default()
        };
        match open_tool(&args) {
            Err(EngineError::ToolNotFound { name, available }) => {
                assert_eq!(name, "pickit9");
                assert_eq!(available, tool_names_short());
            }
            _ => panic!("expected ToolNotFound"),
        }
    }

    #[cfg(feature = "sim")]
    #[test]
    fn test_find_sim_aliases() {
        assert_eq!(find_tool("sim"), Some("sim"));
        assert_eq!(find_tool("Simulator"), Some("sim"));
        assert_eq!(find_tool("dummy"), Some("sim"));
        assert!(tool_names_short().contains("sim"));
    }

    #[cfg(feature = "sim")]
    #[test]
    fn test_registry_keeps_tool_open() {
        let mut registry = ToolRegistry::new();
        let mut args = StructuredArguments {
            tool: Some("sim".to_string()),
            memory: "eeprom".to_string(),
            action: Action::Write,
            literal: vec![mcuprog_core::literal::parse_literal("0x42").unwrap()],
            ..Default::default()
        };
        registry.run(&args).unwrap();
        assert_eq!(registry.current_tool(), Some("sim"));

        // The same simulated target still holds the written byte
        args.action = Action::Verify;
        registry.run(&args).unwrap();
    }

    #[cfg(feature = "sim")]
    #[test]
    fn test_registry_reports_device_errors() {
        let mut registry = ToolRegistry::new();
        let args = StructuredArguments {
            tool: Some("sim".to_string()),
            device: Some("pic18f47q10".to_string()),
            ..Default::default()
        };
        assert_eq!(registry.run(&args).unwrap_err().kind(), "DeviceNotSupported");
    }
}
