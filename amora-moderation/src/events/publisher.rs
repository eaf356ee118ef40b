use uuid::Uuid;

use amora_shared::clients::rabbitmq::RabbitMQClient;
use amora_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_report_created(
    rabbitmq: &RabbitMQClient,
    report_id: Uuid,
    reporter_id: Uuid,
    reported_id: Uuid,
    report_type: &str,
) {
    let event = Event::new(
        "amora-moderation",
        routing_keys::MODERATION_REPORT_CREATED,
        payloads::ReportCreated {
            report_id,
            reporter_id,
            reported_id,
            report_type: report_type.to_string(),
        },
    )
    .with_user(reporter_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_REPORT_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish report.created event");
    }
}

pub async fn publish_report_resolved(
    rabbitmq: &RabbitMQClient,
    report_id: Uuid,
    reported_id: Uuid,
    resolution: &str,
) {
    let event = Event::new(
        "amora-moderation",
        routing_keys::MODERATION_REPORT_RESOLVED,
        payloads::ReportResolved {
            report_id,
            reported_id,
            resolution: resolution.to_string(),
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_REPORT_RESOLVED, &event).await {
        tracing::error!(error = %e, "failed to publish report.resolved event");
    }
}

pub async fn publish_user_blocked(
    rabbitmq: &RabbitMQClient,
    user_id: Uuid,
    report_id: Option<Uuid>,
) {
    let event = Event::new(
        "amora-moderation",
        routing_keys::MODERATION_USER_BLOCKED,
        payloads::UserBlocked { user_id, report_id },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_USER_BLOCKED, &event).await {
        tracing::error!(error = %e, "failed to publish user.blocked event");
    }
}
