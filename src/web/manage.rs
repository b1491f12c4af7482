// Management page handlers: search, score-editor navigation, forced score.
//
// The located user travels in hidden form fields, so every post rebuilds
// the page from the request alone. Those fields carry a seal issued with the
// search result and are refused without it.

use axum::{
    extract::{Query, State},
    response::Html,
    Form,
};
use serde::Deserialize;

use super::views::{render, ManagePage};
use super::AppState;
use crate::error::AppError;
use crate::flow::{EditState, FlowError, ManagementFlow};
use crate::metrics;
use crate::models::{GameName, ManagedUser};
use crate::seal::UserSeal;
use crate::submit_guard::SubmitKind;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub code: String,
}

/// Fields posted by the user panel forms.
#[derive(Debug, Default, Deserialize)]
pub struct ManageForm {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub phone_number: String,
    /// Signature over the three user fields, issued with the page.
    #[serde(default)]
    pub seal: String,
    /// `reveal` or `cancel`; a game button sends `game` instead.
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub game: Option<String>,
    /// Game currently open in the score editor.
    #[serde(default)]
    pub selected: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
}

impl ManageForm {
    /// The user named by the hidden fields, if a search of ours issued them.
    fn located_user(&self, seal: &UserSeal) -> Result<ManagedUser, FlowError> {
        if self.user_id.is_empty() {
            return Err(FlowError::NoUser);
        }
        let user = ManagedUser {
            user_id: self.user_id.clone(),
            nickname: self.nickname.clone(),
            phone_number: self.phone_number.clone(),
        };
        if !seal.verify(&user, &self.seal) {
            tracing::warn!(user_id = %self.user_id, "rejected unsealed user fields");
            return Err(FlowError::NoUser);
        }
        Ok(user)
    }

    fn selected_game(&self) -> Result<Option<GameName>, FlowError> {
        match self.selected.as_deref().filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => GameName::parse(raw).map(Some).ok_or(FlowError::NoGameSelected),
        }
    }

    /// Rebuild the page state described by the hidden fields. Every panel
    /// post comes from a page where the games were shown or are being
    /// revealed now.
    fn restore(&self, seal: &UserSeal) -> Result<ManagementFlow, FlowError> {
        let user = self.located_user(seal)?;
        let game = self.selected_game()?;

        let mut flow = ManagementFlow::with_user(self.code.clone(), user);
        flow.reveal_games()?;
        if let Some(game) = game {
            flow.select_game(game)?;
            flow.set_score(self.score.clone().unwrap_or_default())?;
        }
        Ok(flow)
    }

    /// Page shown when the posted state cannot be trusted.
    fn rejected(&self, err: FlowError) -> ManagementFlow {
        let mut flow = ManagementFlow::new();
        flow.set_code(self.code.clone());
        flow.show_error(err.to_string());
        flow
    }
}

pub async fn page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&ManagePage::new(&ManagementFlow::new(), &state.seal))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, AppError> {
    let mut flow = ManagementFlow::new();
    flow.set_code(params.code);

    let code = match flow.begin_search() {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = %e, "search rejected locally");
            metrics::VALIDATION_FAILURES_TOTAL
                .with_label_values(&["search"])
                .inc();
            return render(&ManagePage::new(&flow, &state.seal));
        }
    };

    let result = state.client.find_user(&code).await;
    flow.complete_search(result);
    render(&ManagePage::new(&flow, &state.seal))
}

/// Reveal the game buttons, pick a game, or cancel the open score editor.
pub async fn edit(
    State(state): State<AppState>,
    Form(form): Form<ManageForm>,
) -> Result<Html<String>, AppError> {
    let mut flow = match form.restore(&state.seal) {
        Ok(flow) => flow,
        Err(e) => return render(&ManagePage::new(&form.rejected(e), &state.seal)),
    };

    let result = if form.action == "cancel" {
        flow.cancel()
    } else if let Some(game) = form.game.as_deref() {
        GameName::parse(game)
            .ok_or(FlowError::NoGameSelected)
            .and_then(|game| flow.select_game(game))
    } else {
        flow.reveal_games()
    };

    if let Err(e) = result {
        flow.show_error(e.to_string());
    }
    render(&ManagePage::new(&flow, &state.seal))
}

pub async fn submit_score(
    State(state): State<AppState>,
    Form(form): Form<ManageForm>,
) -> Result<Html<String>, AppError> {
    let mut flow = match form.restore(&state.seal) {
        Ok(flow) => flow,
        Err(e) => {
            metrics::VALIDATION_FAILURES_TOTAL
                .with_label_values(&["score"])
                .inc();
            return render(&ManagePage::new(&form.rejected(e), &state.seal));
        }
    };

    let guard_key = match (flow.user(), flow.edit()) {
        (Some(user), Some(EditState::Editing { game, .. })) => {
            format!("{}:{}", user.user_id, game.as_str())
        }
        _ => {
            flow.show_error(FlowError::NoGameSelected.to_string());
            return render(&ManagePage::new(&flow, &state.seal));
        }
    };
    let _permit = match state.guard.acquire(SubmitKind::ForceScore, &guard_key) {
        Ok(permit) => permit,
        Err(e) => {
            flow.show_error(e.to_string());
            return render(&ManagePage::new(&flow, &state.seal));
        }
    };

    let req = match flow.begin_score_submit() {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!(error = %e, "score edit rejected locally");
            metrics::VALIDATION_FAILURES_TOTAL
                .with_label_values(&["score"])
                .inc();
            if e != FlowError::InvalidScore {
                flow.show_error(e.to_string());
            }
            return render(&ManagePage::new(&flow, &state.seal));
        }
    };

    let result = state.client.force_score(&req).await;
    if result.is_ok() {
        tracing::info!(
            user_id = %req.user_id,
            game = %req.game_name,
            score = req.score,
            "forced score override"
        );
    }
    flow.complete_score(result);
    render(&ManagePage::new(&flow, &state.seal))
}
