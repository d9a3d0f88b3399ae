//! Script line parsing.
//!
//! ```text
//! # comment
//! invoke enroll m-1 "Roof A" 4
//! query balance m-1
//! ```
//!
//! Tokens are whitespace-separated; double quotes group a token that
//! contains spaces.

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Invoke,
    Query,
}

/// One executable script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub line: usize,
    pub kind: Kind,
    pub function: String,
    pub args: Vec<String>,
}

/// Parse a whole script. Blank and `#` lines are skipped.
pub fn parse(source: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = tokenize(trimmed).map_err(|e| anyhow::anyhow!("line {line}: {e}"))?;
        if tokens.len() < 2 {
            bail!("line {line}: expected `invoke|query <function> [args...]`");
        }
        let kind = match tokens[0].as_str() {
            "invoke" => Kind::Invoke,
            "query" => Kind::Query,
            other => bail!("line {line}: unknown verb `{other}`"),
        };
        let args = tokens.split_off(2);
        let function = tokens.swap_remove(1);
        commands.push(Command {
            line,
            kind,
            function,
            args,
        });
    }
    Ok(commands)
}

fn tokenize(line: &str) -> std::result::Result<Vec<String>, &'static str> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quoted {
        return Err("unterminated quote");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
