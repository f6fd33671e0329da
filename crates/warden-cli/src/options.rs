//! Splits command tokens into positional arguments and supervisor options.

use warden_protocol::CommandOptions;

/// Tokens following a subcommand, split for dispatch.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CommandArguments {
    /// Tokens that are neither flags nor flag values, in order.
    pub(crate) positionals: Vec<String>,
    /// Flags in `--key value`, `--key=value`, or bare `--flag` form.
    pub(crate) options: CommandOptions,
}

impl CommandArguments {
    pub(crate) fn parse(tokens: &[String]) -> Self {
        let split = tokens
            .iter()
            .position(|token| is_flag(token))
            .unwrap_or(tokens.len());
        let (leading, flags) = tokens.split_at(split);

        let mut positionals = leading.to_vec();
        let mut options = CommandOptions::new();
        let mut remaining = flags.iter().peekable();
        while let Some(token) = remaining.next() {
            // Bare tokens after an inline `--key=value` flag are arguments too.
            let Some(flag) = token.strip_prefix("--") else {
                positionals.push(token.clone());
                continue;
            };
            if let Some((key, value)) = flag.split_once('=') {
                options.insert(key, value);
                continue;
            }
            if flag.is_empty() {
                continue;
            }
            match remaining.next_if(|next| !is_flag(next)) {
                Some(value) => options.insert(flag, value.as_str()),
                None => options.insert(flag, true),
            }
        }

        Self {
            positionals,
            options,
        }
    }
}

fn is_flag(token: &str) -> bool {
    token.starts_with("--")
}
