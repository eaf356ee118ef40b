use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use amora_shared::types::event::{payloads, routing_keys, Event};

use crate::services::notification_service;
use crate::AppState;

/// Listen for moderation outcomes and surface them in the inbox of the
/// affected user.
pub async fn listen_moderation_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "amora-notification.moderation",
        &[routing_keys::MODERATION_USER_BLOCKED],
    ).await?;

    tracing::info!("listening for moderation events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.to_string();

                if routing_key == routing_keys::MODERATION_USER_BLOCKED {
                    match serde_json::from_slice::<Event<payloads::UserBlocked>>(&delivery.data) {
                        Ok(event) => {
                            let data = &event.data;
                            tracing::info!(
                                user_id = %data.user_id,
                                "received user.blocked event"
                            );

                            if let Err(e) = notification_service::create_notification(
                                &state.db,
                                data.user_id,
                                "account",
                                "Account blocked",
                                "Your account has been blocked after a moderation review",
                                data.report_id,
                            ) {
                                tracing::error!(error = %e, "failed to create account notification");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to deserialize user.blocked event");
                        }
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "moderation consumer error");
            }
        }
    }

    Ok(())
}
