// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use almanac::{AlmanacError, ErrorReporter};
use almanac_studio::{
    cli::{Cli, Command},
    commands, http, ConfigLoader,
};
use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tracing::info;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        match e.downcast_ref::<AlmanacError>() {
            Some(err) => {
                let reporter = if std::io::stderr().is_terminal() {
                    ErrorReporter::new()
                } else {
                    ErrorReporter::plain()
                };
                eprint!("{}", reporter.report(err));
            }
            None => eprintln!("error: {e:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::new(cli.config.as_deref()).load()?;
    match cli.cmd.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("almanac studio starting");
            let state = http::state_from_config(&config)?;
            http::serve(&config, state).await
        }
        command => {
            println!("{}", commands::execute(&command, &config)?);
            Ok(())
        }
    }
}
