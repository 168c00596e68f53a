use crate::{
    bot::{AccessGate, Command, InboundMessage, Relay, TelegramTransport},
    transmission::TorrentManager,
    Config, TransmissionClient,
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use teloxide::{
    prelude::*,
    types::{AllowedUpdate, BotCommand, UpdateKind},
};
#[cfg(unix)]
use tokio::signal::unix as signal;
use tokio_util::sync::CancellationToken;

/// Long-polling timeout passed to getUpdates.
const POLL_TIMEOUT_S: u32 = 30;
/// Must outlast the long poll so the request is not cut short.
const HTTP_TIMEOUT: Duration = Duration::from_secs(45);
const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);

/// Run the bot until SIGINT or SIGTERM.
pub async fn run(config: Config) -> Result<()> {
    info!(
        "configuration loaded, transmission_url = {}, allowed_users = {:?}",
        config.transmission.url, config.telegram.allowed_users
    );

    let manager: Arc<dyn TorrentManager> = Arc::new(
        TransmissionClient::new(&config.transmission)
            .context("creating transmission client")?,
    );

    let http = teloxide::net::default_reqwest_settings()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("creating telegram http client")?;
    let bot = teloxide::Bot::with_client(&config.telegram.token, http);
    let me = bot.get_me().await.context("creating telegram bot")?;
    bot.delete_webhook()
        .await
        .context("clearing telegram webhook")?;
    register_commands(&bot).await?;
    info!("bot started, username = {:?}", me.username);

    let relay = Relay::new(
        manager.clone(),
        Arc::new(TelegramTransport::new(bot.clone())),
        AccessGate::new(config.telegram.allowed_users.iter().copied()),
    );
    let cancel = CancellationToken::new();

    let result = tokio::select! {
        r = signal() => r,
        _ = poll_updates(&bot, relay, cancel.clone()) => Ok(()),
    };
    info!("shutting down bot");
    cancel.cancel();
    manager.close();
    result
}

async fn register_commands(bot: &Bot) -> Result<()> {
    let commands = Command::MENU
        .iter()
        .map(|(name, description)| BotCommand::new(*name, *description))
        .collect::<Vec<_>>();
    bot.set_my_commands(commands)
        .await
        .context("setting commands")?;
    debug!("commands registered");
    Ok(())
}

/// Pull updates forever, handing every message to its own task.
async fn poll_updates(bot: &Bot, relay: Relay, cancel: CancellationToken) {
    let mut offset: i32 = 0;
    loop {
        let result = bot
            .get_updates()
            .offset(offset)
            .timeout(POLL_TIMEOUT_S)
            .allowed_updates(vec![AllowedUpdate::Message])
            .await;
        let updates = match result {
            Ok(updates) => updates,
            Err(e) => {
                warn!("telegram getUpdates failed: {e}");
                tokio::time::sleep(POLL_ERROR_DELAY).await;
                continue;
            }
        };
        trace!("got {} telegram updates", updates.len());

        for update in updates {
            offset = update.id.as_offset();
            let UpdateKind::Message(msg) = update.kind else {
                continue;
            };
            let Some(msg) = InboundMessage::from_telegram(&msg) else {
                debug!("ignoring message without sender in chat {}", msg.chat.id.0);
                continue;
            };
            let relay = relay.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => debug!("handler abandoned on shutdown"),
                    _ = relay.handle(msg) => {}
                }
            });
        }
    }
}

#[cfg(unix)]
async fn signal() -> Result<()> {
    let mut sig_term = signal::signal(signal::SignalKind::terminate())?;

    tokio::select! {
        _ = sig_term.recv() => {
            info!("received sigterm, exiting");
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, stopping");
            Ok(())
        }
    }
}

#[cfg(not(unix))]
async fn signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("ctrl-c received, stopping");
    Ok(())
}
