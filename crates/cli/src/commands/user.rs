// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dp user` - Per-user preferences and stored credentials

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use dp_core::{EncryptedSecret, StoredCredential, UserId};
use dp_storage::Repository;

use crate::context::Context;
use crate::output::format_or_json;

#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Submit filled forms without waiting for a confirmation
    AutoSubmit {
        id: String,

        #[arg(value_enum)]
        state: Toggle,
    },
    /// Store encrypted portal credentials
    Credential {
        id: String,

        /// Portal login (CPF), stored in clear
        #[arg(long)]
        identity: String,

        #[arg(long)]
        ciphertext: String,

        #[arg(long)]
        iv: String,

        #[arg(long)]
        auth_tag: String,
    },
    /// Show a user's automation settings
    Show { id: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Serialize)]
struct UserSummary {
    id: UserId,
    auto_submit: bool,
    has_credentials: bool,
}

pub async fn handle(command: UserCommand, ctx: &Context) -> Result<()> {
    match command {
        UserCommand::AutoSubmit { id, state } => {
            let id = UserId::from(id);
            let enabled = state == Toggle::On;
            ctx.repo.set_auto_submit(&id, enabled).await?;
            println!("auto-submit {} for {}", if enabled { "on" } else { "off" }, id);
        }
        UserCommand::Credential { id, identity, ciphertext, iv, auth_tag } => {
            let credential = StoredCredential {
                user_id: UserId::from(id),
                identity,
                secret: EncryptedSecret { ciphertext, iv, auth_tag },
            };
            ctx.repo.put_credential(&credential).await?;
            println!("credentials stored for {}", credential.user_id);
        }
        UserCommand::Show { id } => {
            let id = UserId::from(id);
            let profile = ctx.repo.get_profile(&id).await?;
            let summary = UserSummary {
                auto_submit: profile.is_some_and(|p| p.auto_submit),
                has_credentials: ctx.repo.get_credential(&id).await?.is_some(),
                id,
            };
            format_or_json(ctx.format, &summary, || {
                println!("{}", summary.id);
                println!("  auto-submit:  {}", if summary.auto_submit { "on" } else { "off" });
                println!("  credentials:  {}", if summary.has_credentials { "stored" } else { "none" });
            })?;
        }
    }
    Ok(())
}
