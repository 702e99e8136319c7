use cadenza_core::CommandHelp;

/// Unified help menu: built-in commands plus every initialized plugin's
/// contributions, grouped by plugin.
#[derive(Debug, Clone, Default)]
pub struct HelpMenu {
    builtins: Vec<CommandHelp>,
    sections: Vec<(String, Vec<CommandHelp>)>,
}

impl HelpMenu {
    pub fn new(builtins: Vec<CommandHelp>) -> Self {
        Self {
            builtins,
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, heading: String, entries: Vec<CommandHelp>) {
        self.sections.push((heading, entries));
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push("COMMANDS".to_string());
        for entry in &self.builtins {
            lines.push(format_entry(entry));
        }
        for (heading, entries) in &self.sections {
            lines.push(String::new());
            lines.push(heading.clone());
            for entry in entries {
                lines.push(format_entry(entry));
            }
        }
        lines
    }
}

fn format_entry(entry: &CommandHelp) -> String {
    format!("  {:<24} {}", entry.command, entry.description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_plugin_commands_under_headings() {
        let mut menu = HelpMenu::new(vec![CommandHelp::new("help", "show this menu")]);
        menu.add_section(
            "Local (local)".to_string(),
            vec![CommandHelp::new("local list", "list library tracks")],
        );

        let lines = menu.lines();
        assert_eq!(lines[0], "COMMANDS");
        assert!(lines.iter().any(|l| l.contains("help")));
        assert!(lines.iter().any(|l| l == "Local (local)"));
        assert!(lines.iter().any(|l| l.contains("local list")));
    }
}
