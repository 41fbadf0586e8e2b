use chrono::NaiveDate;
use frontal_bridge::{
    MessageFromBackend,
    auth::User,
    notification::NotificationType,
    progress::{ProgressInput, ProgressRecord},
};

/// Returns the signed-in user, or tells the frontend nobody is.
async fn signed_in_user(context: &super::AppContextHandle) -> Option<User> {
    let user = {
        let state = context.state.read().await;
        state.collaborators.auth.current_user()
    };
    if user.is_none() {
        context
            .send_notification(NotificationType::Error, "User not logged in")
            .await;
    }
    user
}

/// Stores the given values as today's progress of the signed-in user.
pub async fn handle_save_progress(context: super::AppContextHandle, input: ProgressInput) {
    let Some(user) = signed_in_user(&context).await else {
        return;
    };
    let today = chrono::Local::now().date_naive();
    let record = ProgressRecord::from_input(user.id, today, input);

    let store = {
        let state = context.state.read().await;
        state.collaborators.store.clone()
    };
    match store.insert_progress_record(&record).await {
        Ok(()) => {
            log::info!("Saved progress for {}", record.date);
            context
                .send_notification(NotificationType::Success, "Progress saved!")
                .await;
        }
        Err(error) => {
            log::error!("Failed to save progress: {error}");
            context
                .send_notification(
                    NotificationType::Error,
                    format!("Failed to save progress: {error}"),
                )
                .await;
        }
    }
}

pub async fn handle_progress_for_date(context: super::AppContextHandle, date: NaiveDate) {
    let Some(user) = signed_in_user(&context).await else {
        return;
    };
    let store = {
        let state = context.state.read().await;
        state.collaborators.store.clone()
    };
    let records = store.query_progress_by_date(&user.id, date).await;
    send_records(&context, records).await;
}

/// Sends every record of the signed-in user, oldest first.
pub async fn handle_progress_history(context: super::AppContextHandle) {
    let Some(user) = signed_in_user(&context).await else {
        return;
    };
    let store = {
        let state = context.state.read().await;
        state.collaborators.store.clone()
    };
    let records = store.query_progress_history(&user.id).await;
    send_records(&context, records).await;
}

async fn send_records(
    context: &super::AppContextHandle,
    records: Result<Vec<ProgressRecord>, crate::providers::store::StoreError>,
) {
    match records {
        Ok(records) => {
            context
                .send(MessageFromBackend::ProgressResponse(records))
                .await;
        }
        Err(error) => {
            log::error!("Failed to query progress: {error}");
            context
                .send_notification(
                    NotificationType::Error,
                    format!("Failed to load progress: {error}"),
                )
                .await;
        }
    }
}
