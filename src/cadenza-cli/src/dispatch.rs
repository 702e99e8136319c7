use cadenza_plugin::PluginRegistry;

/// Interpreter-level commands, handled without touching any plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Help,
    Now,
    Settings,
    Quit,
}

/// A routed plugin operation. `Play` covers the bare-alias shorthand:
/// `sp` alone means `sp play`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginCommand {
    Play(Vec<String>),
    Pause,
    Stop,
    Volume(Vec<String>),
    /// Subcommand the plugin flagged for pagination.
    Paginated { command: String, args: Vec<String> },
    /// Anything else, forwarded verbatim.
    Other { command: String, args: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Empty,
    Builtin(Builtin),
    Plugin { index: usize, command: PluginCommand },
    UnknownAlias(String),
}

/// Route one input line. The first token is a builtin or a plugin alias;
/// the second selects the operation. Alias matching is case-insensitive,
/// arguments pass through untouched.
pub fn route(registry: &PluginRegistry, line: &str) -> Dispatch {
    let mut tokens = line.split_whitespace();
    let Some(head) = tokens.next() else {
        return Dispatch::Empty;
    };
    let head = head.to_lowercase();

    match head.as_str() {
        "help" | "?" => return Dispatch::Builtin(Builtin::Help),
        "now" => return Dispatch::Builtin(Builtin::Now),
        "settings" => return Dispatch::Builtin(Builtin::Settings),
        "quit" | "exit" | "q" => return Dispatch::Builtin(Builtin::Quit),
        _ => {}
    }

    let Some(index) = registry.index_of_alias(&head) else {
        return Dispatch::UnknownAlias(head);
    };

    let Some(subcommand) = tokens.next() else {
        return Dispatch::Plugin {
            index,
            command: PluginCommand::Play(Vec::new()),
        };
    };
    let subcommand = subcommand.to_lowercase();
    let args: Vec<String> = tokens.map(str::to_string).collect();

    let command = match subcommand.as_str() {
        "play" => PluginCommand::Play(args),
        "pause" => PluginCommand::Pause,
        "stop" => PluginCommand::Stop,
        "volume" | "vol" => PluginCommand::Volume(args),
        _ => {
            if registry
                .registration(index)
                .paginated_commands
                .iter()
                .any(|c| c == &subcommand)
            {
                PluginCommand::Paginated {
                    command: subcommand,
                    args,
                }
            } else {
                PluginCommand::Other {
                    command: subcommand,
                    args,
                }
            }
        }
    };

    Dispatch::Plugin { index, command }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::{CommandHelp, PlaybackInfo, PlaybackUpdate};
    use cadenza_plugin::{CommandOutcome, PlayArgs, Plugin, PluginResult};

    struct FakeProvider;

    impl Plugin for FakeProvider {
        fn id(&self) -> &str {
            "fake"
        }

        fn name(&self) -> &str {
            "Fake"
        }

        fn default_alias(&self) -> &str {
            "fk"
        }

        fn initialized(&self) -> bool {
            true
        }

        fn paginated_commands(&self) -> Vec<String> {
            vec!["search".into()]
        }

        fn play(&mut self, _args: PlayArgs) -> PluginResult<()> {
            Ok(())
        }

        fn pause(&mut self) -> PluginResult<()> {
            Ok(())
        }

        fn stop(&mut self) -> PluginResult<()> {
            Ok(())
        }

        fn set_volume(&mut self, _level: i64) -> PluginResult<()> {
            Ok(())
        }

        fn update_playback_info(&mut self) -> Option<PlaybackUpdate> {
            None
        }

        fn get_current_playback(&self) -> Option<PlaybackInfo> {
            None
        }

        fn command_help(&self) -> Vec<CommandHelp> {
            Vec::new()
        }

        fn invoke(&mut self, command: &str, _args: &[String]) -> PluginResult<CommandOutcome> {
            Ok(CommandOutcome::Message(command.to_string()))
        }
    }

    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(FakeProvider), None);
        registry
    }

    #[test]
    fn builtins_route_before_aliases() {
        let registry = registry();
        assert_eq!(route(&registry, "help"), Dispatch::Builtin(Builtin::Help));
        assert_eq!(route(&registry, "NOW"), Dispatch::Builtin(Builtin::Now));
        assert_eq!(route(&registry, "quit"), Dispatch::Builtin(Builtin::Quit));
        assert_eq!(
            route(&registry, "settings"),
            Dispatch::Builtin(Builtin::Settings)
        );
    }

    #[test]
    fn bare_alias_means_play() {
        let registry = registry();
        assert_eq!(
            route(&registry, "fk"),
            Dispatch::Plugin {
                index: 0,
                command: PluginCommand::Play(Vec::new()),
            }
        );
    }

    #[test]
    fn play_with_tokens_passes_them_through() {
        let registry = registry();
        assert_eq!(
            route(&registry, "fk play 3"),
            Dispatch::Plugin {
                index: 0,
                command: PluginCommand::Play(vec!["3".into()]),
            }
        );
    }

    #[test]
    fn paginated_subcommand_is_flagged() {
        let registry = registry();
        assert_eq!(
            route(&registry, "fk search beatles abbey"),
            Dispatch::Plugin {
                index: 0,
                command: PluginCommand::Paginated {
                    command: "search".into(),
                    args: vec!["beatles".into(), "abbey".into()],
                },
            }
        );
    }

    #[test]
    fn unflagged_subcommand_forwards_verbatim() {
        let registry = registry();
        assert_eq!(
            route(&registry, "fk shuffle"),
            Dispatch::Plugin {
                index: 0,
                command: PluginCommand::Other {
                    command: "shuffle".into(),
                    args: Vec::new(),
                },
            }
        );
    }

    #[test]
    fn unknown_alias_reported_not_fatal() {
        let registry = registry();
        assert_eq!(
            route(&registry, "zz play"),
            Dispatch::UnknownAlias("zz".into())
        );
    }

    #[test]
    fn empty_line_is_a_no_op() {
        let registry = registry();
        assert_eq!(route(&registry, "   "), Dispatch::Empty);
    }

    #[test]
    fn alias_matching_is_case_insensitive() {
        let registry = registry();
        assert!(matches!(
            route(&registry, "FK pause"),
            Dispatch::Plugin {
                command: PluginCommand::Pause,
                ..
            }
        ));
    }
}
