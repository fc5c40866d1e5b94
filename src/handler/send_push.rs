use futures::future::join_all;
use serde::Serialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
    model::PushSubscription,
    push::build_request,
    types::{PushData, PushHeader, PushTarget, Urgency},
};

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
    pub removed: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Sent,
    Gone,
    Failed,
}

/// Sends `push_data` to every subscription of the user. Failures of single
/// subscriptions are logged and counted, never retried.
pub async fn send(
    app_state: AppState<State>,
    user_id: String,
    push_data: PushData,
) -> Result<DeliveryReport, Error> {
    let items = app_state
        .database
        .push_subscription
        .get_by_user(&user_id)
        .await?;

    let push_header = PushHeader {
        ttl: app_state.config.push_ttl,
        urgency: Some(Urgency::High),
        topic: None,
    };
    let payload = push_data.to_string();

    let tasks = items.into_iter().map(|subscription| {
        send_one(&app_state, subscription, &push_header, payload.as_bytes())
    });
    let outcomes = join_all(tasks).await;

    let report = summarize(&outcomes);
    tracing::info!(
        "Push to user {}: {} sent, {} failed, {} removed",
        user_id,
        report.sent,
        report.failed,
        report.removed
    );

    Ok(report)
}

async fn send_one(
    state: &State,
    subscription: PushSubscription,
    push_header: &PushHeader,
    payload: &[u8],
) -> Outcome {
    match send_push(state, &subscription, push_header, payload).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(
                "Push notification to subscription {} failed: {}",
                subscription.id,
                e
            );
            Outcome::Failed
        },
    }
}

async fn send_push(
    state: &State,
    subscription: &PushSubscription,
    push_header: &PushHeader,
    payload: &[u8],
) -> Result<Outcome, Error> {
    let target = PushTarget {
        endpoint: subscription.endpoint.to_owned(),
        p256dh: subscription.p256dh.to_owned(),
        auth: subscription.auth.to_owned(),
    };
    let request = build_request(
        &target,
        payload,
        &state.config.vapid,
        &state.config.mail_to,
        push_header,
    )?;

    let status = state.http.post_push(request).await?;

    match outcome(status, &state.config.status_code_to_delete) {
        Outcome::Gone => {
            state
                .database
                .push_subscription
                .delete_by_id(&subscription.id)
                .await?;
            Ok(Outcome::Gone)
        },
        Outcome::Failed => {
            tracing::warn!(
                "Push service answered {} for subscription {}",
                status,
                subscription.id
            );
            Ok(Outcome::Failed)
        },
        Outcome::Sent => Ok(Outcome::Sent),
    }
}

/// Pruning statuses win over everything else; any other non-2xx is a failure.
fn outcome(status: u16, status_code_to_delete: &[u16]) -> Outcome {
    if status_code_to_delete.contains(&status) {
        return Outcome::Gone;
    }

    if (200..300).contains(&status) {
        Outcome::Sent
    } else {
        Outcome::Failed
    }
}

fn summarize(outcomes: &[Outcome]) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Sent => report.sent += 1,
            Outcome::Gone => report.removed += 1,
            Outcome::Failed => report.failed += 1,
        }
    }
    report
}
