use crate::contract::{PluginError, PluginResult};
use cadenza_core::SelectionItem;

/// Raw input reaching a `play`-shaped entry point. Three shapes occur: a
/// token list from command-line parsing, a selected pagination triple, or a
/// one-element sequence wrapping that triple.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayRequest {
    Tokens(Vec<String>),
    Selected(SelectionItem),
    SelectedList(Vec<SelectionItem>),
}

/// Normalized play arguments. Providers only ever see this; the shape
/// sniffing happens once, here.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayArgs {
    /// No argument at all: play whatever the provider considers a sensible
    /// default, or fail with `InvalidArgument` if none exists.
    Default,
    /// Free-form tokens, e.g. a numeric index into the last listing or a
    /// provider-specific query.
    Tokens(Vec<String>),
    /// A concrete item picked through pagination.
    Item(SelectionItem),
}

impl PlayArgs {
    pub fn normalize(request: PlayRequest) -> PluginResult<Self> {
        match request {
            PlayRequest::Tokens(tokens) if tokens.is_empty() => Ok(PlayArgs::Default),
            PlayRequest::Tokens(tokens) => Ok(PlayArgs::Tokens(tokens)),
            PlayRequest::Selected(item) => Ok(PlayArgs::Item(item)),
            PlayRequest::SelectedList(mut items) => match items.len() {
                0 => Ok(PlayArgs::Default),
                1 => Ok(PlayArgs::Item(items.remove(0))),
                n => Err(PluginError::invalid_argument(format!(
                    "expected a single selected item, got {n}"
                ))),
            },
        }
    }

    /// Resolve to a concrete item against an ordered listing. Numeric tokens
    /// are 1-based, matching the numbering pagination displays.
    pub fn resolve(&self, items: &[SelectionItem]) -> PluginResult<SelectionItem> {
        match self {
            PlayArgs::Item(item) => Ok(item.clone()),
            PlayArgs::Tokens(tokens) => match tokens.as_slice() {
                [single] => {
                    let index: usize = single.parse().map_err(|_| {
                        PluginError::invalid_argument(format!("not a track number: '{single}'"))
                    })?;
                    index
                        .checked_sub(1)
                        .and_then(|i| items.get(i))
                        .cloned()
                        .ok_or_else(|| {
                            PluginError::invalid_argument(format!(
                                "track number {index} out of range (1..={})",
                                items.len()
                            ))
                        })
                }
                _ => Err(PluginError::invalid_argument(
                    "expected a single track number",
                )),
            },
            PlayArgs::Default => Err(PluginError::invalid_argument(
                "nothing selected and no default item",
            )),
        }
    }
}
