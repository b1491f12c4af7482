// Registration page handlers.

use axum::{extract::State, response::Html, Form};
use serde::Deserialize;

use super::views::{render, RegisterPage};
use super::AppState;
use crate::error::AppError;
use crate::flow::RegistrationFlow;
use crate::metrics;
use crate::models::RegistrationForm;
use crate::submit_guard::SubmitKind;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub phone: String,
}

pub async fn page() -> Result<Html<String>, AppError> {
    render(&RegisterPage::from(&RegistrationFlow::new()))
}

pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Html<String>, AppError> {
    let mut flow = RegistrationFlow::with_form(RegistrationForm {
        nickname: form.nickname,
        phone: form.phone,
    });

    let _permit = match state
        .guard
        .acquire(SubmitKind::Register, &flow.form().phone)
    {
        Ok(permit) => permit,
        Err(e) => {
            flow.show_error(e.to_string());
            return render(&RegisterPage::from(&flow));
        }
    };

    let req = match flow.begin_submit() {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!(error = %e, "registration rejected locally");
            metrics::VALIDATION_FAILURES_TOTAL
                .with_label_values(&["register"])
                .inc();
            return render(&RegisterPage::from(&flow));
        }
    };

    let result = state.client.register_user(&req).await;
    flow.complete(result);
    if let Some(user) = flow.registered() {
        tracing::info!(user_id = %user.user_id, "registered user");
    }

    render(&RegisterPage::from(&flow))
}
