//! Encrypted item commands.
//!
//! Provides `gpgvault item add|list|get|update|remove`. Values come from
//! `--value`, `--value-base64`, or stdin; with `--encrypted` they are stored
//! exactly as given.

use std::io::{IsTerminal, Read};

use clap::Args;
use console::style;
use gpgvault_store::{decode_value, encode_value, ItemUpdate, NewItem};
use uuid::Uuid;

use crate::Context;

/// Item command arguments.
#[derive(Args)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemCommand,
}

/// Where an item value comes from.
#[derive(Args, Debug, Default)]
pub struct ValueInput {
    /// Value as text (if omitted with --value-base64, read from stdin)
    #[arg(long, conflicts_with = "value_base64")]
    pub value: Option<String>,

    /// Value as standard base64
    #[arg(long)]
    pub value_base64: Option<String>,
}

impl ValueInput {
    /// Resolve the value bytes, reading `stdin` when no flag was given.
    ///
    /// An interactive terminal gets a hidden prompt instead of a raw read.
    pub fn read(&self, stdin: impl Read + IsTerminal) -> anyhow::Result<Vec<u8>> {
        if let Some(value) = &self.value {
            return Ok(value.clone().into_bytes());
        }
        if let Some(encoded) = &self.value_base64 {
            return Ok(decode_value(encoded)?);
        }

        if stdin.is_terminal() {
            let value = rpassword::prompt_password("Value: ")
                .map_err(|e| anyhow::anyhow!("Failed to read value: {}", e))?;
            return Ok(value.into_bytes());
        }

        let mut buf = Vec::new();
        let mut stdin = stdin;
        stdin.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

#[derive(clap::Subcommand)]
pub enum ItemCommand {
    /// Store a new item, encrypted to all registered keys
    Add {
        /// Display name
        name: String,

        #[command(flatten)]
        input: ValueInput,

        /// The value is already encrypted; store it verbatim
        #[arg(long)]
        encrypted: bool,
    },

    /// List items (names only)
    List,

    /// Print an item's stored value
    Get {
        /// Item uuid
        uuid: Uuid,

        /// Print the value base64-encoded
        #[arg(long)]
        base64: bool,
    },

    /// Replace an item's value
    Update {
        /// Item uuid
        uuid: Uuid,

        /// Also rename the item
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        input: ValueInput,

        /// The value is already encrypted; store it verbatim
        #[arg(long)]
        encrypted: bool,
    },

    /// Delete an item
    Remove {
        /// Item uuid
        uuid: Uuid,
    },
}

/// Run the item command.
pub async fn run(args: ItemArgs, ctx: &Context) -> anyhow::Result<()> {
    let vault = ctx.vault().await?;
    let owner = ctx.owner;

    match args.command {
        ItemCommand::Add {
            name,
            input,
            encrypted,
        } => {
            let value = input.read(std::io::stdin())?;
            let new = if encrypted {
                NewItem::encrypted(name, value)
            } else {
                NewItem::plaintext(name, value)
            };

            let item = vault.create_item(owner, new).await?;
            println!(
                "{} Stored '{}' as {}",
                style("+").green(),
                item.name,
                style(item.uuid).bold()
            );
        }

        ItemCommand::List => {
            let items = vault.list_items(owner).await?;
            if items.is_empty() {
                println!("No items stored.");
            } else {
                println!("{:<38} {:<32} {}", "UUID", "NAME", "UPDATED");
                println!("{}", "-".repeat(92));
                for item in &items {
                    println!(
                        "{:<38} {:<32} {}",
                        item.uuid,
                        item.name,
                        item.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                    );
                }
                println!("\n{} item(s) total.", items.len());
            }
        }

        ItemCommand::Get { uuid, base64 } => {
            let item = vault.get_item(owner, uuid).await?;
            match std::str::from_utf8(&item.value) {
                Ok(text) if !base64 => print!("{}", text),
                _ => println!("{}", encode_value(&item.value)),
            }
        }

        ItemCommand::Update {
            uuid,
            name,
            input,
            encrypted,
        } => {
            let value = input.read(std::io::stdin())?;
            let mut update = if encrypted {
                ItemUpdate::encrypted(value)
            } else {
                ItemUpdate::plaintext(value)
            };
            if let Some(name) = name {
                update = update.with_name(name);
            }

            let item = vault.update_item(owner, uuid, update).await?;
            println!("{} Updated '{}'", style("*").green(), item.name);
        }

        ItemCommand::Remove { uuid } => {
            vault.delete_item(owner, uuid).await?;
            println!("Item {} deleted.", uuid);
        }
    }

    Ok(())
}
