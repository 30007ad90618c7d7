use crate::error::PredictError;
use crate::models::session_types::{RequestState, SessionView};
use crate::services::controller::{Completion, Controller};
use crate::services::inference_client::InferenceClient;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
    /// The response belonged to a selection that has since been replaced.
    Discarded,
}

/// Run one submit cycle: admit the request, call the service without holding
/// the session lock, then apply the outcome.
///
/// `on_change` receives a snapshot after each transition (InFlight, then the
/// final state). Validation and in-flight rejections return `Err` without any
/// request being made.
pub async fn submit<C, F>(
    session: &Mutex<Controller>,
    client: &C,
    on_change: F,
) -> Result<SubmitOutcome, PredictError>
where
    C: InferenceClient,
    F: Fn(SessionView) + Send + Sync,
{
    let ticket = {
        let mut controller = session.lock().await;
        match controller.begin_submit() {
            Ok(ticket) => {
                on_change(controller.view());
                ticket
            }
            Err(err) => {
                on_change(controller.view());
                return Err(err);
            }
        }
    };

    let outcome = client.predict(&ticket.file).await;

    let mut controller = session.lock().await;
    let completion = controller.complete(ticket.generation, outcome);
    on_change(controller.view());

    Ok(match completion {
        Completion::Applied(RequestState::Succeeded) => SubmitOutcome::Succeeded,
        Completion::Applied(_) => SubmitOutcome::Failed,
        Completion::Stale => SubmitOutcome::Discarded,
    })
}
