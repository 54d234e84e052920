//! Key registry commands.
//!
//! Provides `gpgvault key add|list|show|update|remove|fingerprints`.

use clap::Args;
use console::style;
use gpgvault_store::Key;
use uuid::Uuid;

use crate::Context;

/// Key command arguments.
#[derive(Args)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

#[derive(clap::Subcommand)]
pub enum KeyCommand {
    /// Register a key by id or fingerprint (8, 16 or 40 hex, optional 0x)
    Add {
        /// Key id or fingerprint
        id: String,
    },

    /// List registered keys
    List,

    /// Show one key
    Show {
        /// Key uuid
        uuid: Uuid,
    },

    /// Re-resolve a key from a new id or fingerprint
    Update {
        /// Key uuid
        uuid: Uuid,

        /// New key id or fingerprint
        id: String,
    },

    /// Remove a key; existing items stay encrypted to it
    Remove {
        /// Key uuid
        uuid: Uuid,
    },

    /// Print the fingerprints new items are encrypted to
    Fingerprints,
}

/// Run the key command.
pub async fn run(args: KeyArgs, ctx: &Context) -> anyhow::Result<()> {
    let vault = ctx.vault().await?;
    let owner = ctx.owner;

    match args.command {
        KeyCommand::Add { id } => {
            let key = vault.register_key(owner, &id).await?;
            println!("{} Registered key {}", style("+").green(), style(key.uuid).bold());
            println!("  {}", key);
        }

        KeyCommand::List => {
            let keys = vault.list_keys(owner).await?;
            if keys.is_empty() {
                println!("No keys registered.");
            } else {
                println!("{:<38} {}", "UUID", "FINGERPRINT");
                println!("{}", "-".repeat(90));
                for key in &keys {
                    println!("{:<38} {}", key.uuid, key);
                }
                println!("\n{} key(s) total.", keys.len());
            }
        }

        KeyCommand::Show { uuid } => {
            let key = vault.get_key(owner, uuid).await?;
            print_key(&key);
        }

        KeyCommand::Update { uuid, id } => {
            let key = vault.update_key(owner, uuid, &id).await?;
            println!("{} Updated key {}", style("*").green(), style(key.uuid).bold());
            println!("  {}", key);
        }

        KeyCommand::Remove { uuid } => {
            vault.remove_key(owner, uuid).await?;
            println!("Key {} removed.", uuid);
        }

        KeyCommand::Fingerprints => {
            for fpr in vault.list_fingerprints(owner).await? {
                println!("{}", fpr);
            }
        }
    }

    Ok(())
}

fn print_key(key: &Key) {
    println!("uuid:        {}", key.uuid);
    println!("fingerprint: {}", key);
    println!("created:     {}", key.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("updated:     {}", key.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
}
