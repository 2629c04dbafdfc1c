// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::cli::{OutputFormat, SettingCommand};
use crate::display::format_configuration_line;
use crate::error::{Error, Result};
use crate::sync::{Backend, SyncContext};

use super::{block_on, open_context, print_json, sync_note, warm_connectivity};

pub fn run(data_dir: &Path, cmd: SettingCommand) -> Result<()> {
    let (ctx, _) = open_context(data_dir)?;
    block_on(run_impl(&ctx, cmd))
}

pub(crate) async fn run_impl<B: Backend>(ctx: &SyncContext<B>, cmd: SettingCommand) -> Result<()> {
    let coordinator = ctx.coordinator();
    match cmd {
        SettingCommand::Set {
            key,
            value,
            description,
        } => {
            warm_connectivity(ctx).await;
            let applied = coordinator
                .set_configuration(&key, &value, description)
                .await?;
            println!(
                "{}{}",
                format_configuration_line(&applied.value),
                sync_note(applied.synced)
            );
            Ok(())
        }
        SettingCommand::Get { key } => match coordinator.configuration(key.trim()).await? {
            Some(config) => {
                println!("{}", config.value);
                Ok(())
            }
            None => Err(Error::SettingNotFound(key)),
        },
        SettingCommand::List { output } => {
            let configs = coordinator.configurations().await?;
            match output {
                OutputFormat::Json => print_json(&configs),
                OutputFormat::Text => {
                    for config in &configs {
                        println!("{}", format_configuration_line(config));
                    }
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "setting_tests.rs"]
mod tests;
