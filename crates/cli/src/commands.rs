//! Command parsing and handlers.

use anyhow::{anyhow, bail, Context as _};
use serde_json::{json, Value};

use crate::context::AppContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search { query: String, page: u32 },
    Pending,
    Purge,
    Help,
}

impl Command {
    /// Parse the arguments after the program name.
    pub fn parse<I, S>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let command = match args.next().as_deref() {
            Some("search") => {
                let query = args.next().ok_or_else(|| anyhow!("search needs a query"))?;
                let page = match args.next() {
                    Some(raw) => raw.parse::<u32>().with_context(|| format!("invalid page: {raw}"))?,
                    None => 1,
                };
                Self::Search { query, page }
            }
            Some("pending") => Self::Pending,
            Some("purge") => Self::Purge,
            Some("help") | None => Self::Help,
            Some(unknown) => bail!("Unknown command: {unknown}"),
        };

        if let Some(extra) = args.next() {
            bail!("Unexpected argument: {extra}");
        }
        Ok(command)
    }
}

/// Run `command` and return the JSON to print.
pub async fn run(ctx: &AppContext, command: Command) -> anyhow::Result<Value> {
    match command {
        Command::Search { query, page } => {
            let response =
                ctx.search.search_page(&query, page).await.context("search request failed")?;
            Ok(serde_json::to_value(response)?)
        }
        Command::Pending => {
            let records = ctx.transport.pending().await.context("failed to list transactions")?;
            Ok(serde_json::to_value(records)?)
        }
        Command::Purge => {
            let removed =
                ctx.transport.purge_completed().await.context("failed to purge transactions")?;
            Ok(json!({ "removed": removed }))
        }
        Command::Help => Ok(Value::Null),
    }
}
