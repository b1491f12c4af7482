// Management page: user search followed by an optional forced score edit.
//
// The edit state lives inside `SearchState::Found`, so there is no way to
// reach the score form without a located user.

use crate::client::ApiError;
use crate::models::{ForceScoreRequest, GameName, ManagedUser, ScoreEdit, UserResponse};

use super::FlowError;

pub const USER_NOT_FOUND: &str = "사용자를 찾을 수 없습니다.";
pub const SCORE_FAILED: &str = "기록 수정에 실패했습니다.";
pub const SCORE_UPDATED: &str = "기록이 성공적으로 수정되었습니다.";

#[derive(Debug, Clone, PartialEq)]
pub enum EditState {
    /// Only the "edit record" button is shown.
    Hidden,
    /// Game buttons are shown, none selected.
    Choosing,
    /// One game selected with its score input.
    Editing {
        game: GameName,
        score: String,
        submitting: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching,
    Found { user: ManagedUser, edit: EditState },
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct ManagementFlow {
    code: String,
    search: SearchState,
    error: Option<String>,
    notice: Option<String>,
}

impl Default for ManagementFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagementFlow {
    pub fn new() -> Self {
        Self {
            code: String::new(),
            search: SearchState::Idle,
            error: None,
            notice: None,
        }
    }

    /// Resume a page where `user` was already located by a previous search.
    pub fn with_user(code: impl Into<String>, user: ManagedUser) -> Self {
        Self {
            code: code.into(),
            search: SearchState::Found {
                user,
                edit: EditState::Hidden,
            },
            error: None,
            notice: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn user(&self) -> Option<&ManagedUser> {
        match &self.search {
            SearchState::Found { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn edit(&self) -> Option<&EditState> {
        match &self.search {
            SearchState::Found { edit, .. } => Some(edit),
            _ => None,
        }
    }

    /// Message shown in red above the results, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.search {
            SearchState::NotFound(message) => Some(message),
            _ => self.error.as_deref(),
        }
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.notice = None;
        self.error = Some(message.into());
    }

    /// Confirmation shown after a successful score edit.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    // ── Search ────────────────────────────────────────────────────────

    /// Start a new search, dropping any previous result and edit state.
    pub fn begin_search(&mut self) -> Result<String, FlowError> {
        if self.search == SearchState::Searching {
            return Err(FlowError::InFlight);
        }
        self.error = None;
        self.notice = None;

        let code = self.code.trim().to_string();
        if code.is_empty() {
            let err = FlowError::MissingCode;
            self.search = SearchState::Idle;
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.search = SearchState::Searching;
        Ok(code)
    }

    pub fn complete_search(&mut self, result: Result<UserResponse, ApiError>) {
        if self.search != SearchState::Searching {
            return;
        }
        self.search = match result {
            Ok(user) => SearchState::Found {
                user: user.into(),
                edit: EditState::Hidden,
            },
            Err(e) => SearchState::NotFound(e.display_message(USER_NOT_FOUND)),
        };
    }

    // ── Score edit ────────────────────────────────────────────────────

    fn edit_mut(&mut self) -> Result<&mut EditState, FlowError> {
        match &mut self.search {
            SearchState::Found { edit, .. } => Ok(edit),
            _ => Err(FlowError::NoUser),
        }
    }

    /// Show the four game buttons.
    pub fn reveal_games(&mut self) -> Result<(), FlowError> {
        let edit = self.edit_mut()?;
        if *edit == EditState::Hidden {
            *edit = EditState::Choosing;
        }
        Ok(())
    }

    /// Select one game; the score input starts empty.
    pub fn select_game(&mut self, game: GameName) -> Result<(), FlowError> {
        *self.edit_mut()? = EditState::Editing {
            game,
            score: String::new(),
            submitting: false,
        };
        Ok(())
    }

    pub fn set_score(&mut self, raw: impl Into<String>) -> Result<(), FlowError> {
        match self.edit_mut()? {
            EditState::Editing { score, .. } => {
                *score = raw.into();
                Ok(())
            }
            _ => Err(FlowError::NoGameSelected),
        }
    }

    /// Drop the selected game and score without contacting the server.
    pub fn cancel(&mut self) -> Result<(), FlowError> {
        let edit = self.edit_mut()?;
        if matches!(edit, EditState::Editing { .. }) {
            *edit = EditState::Choosing;
        }
        Ok(())
    }

    /// Validate the score and hand back the override request to send.
    pub fn begin_score_submit(&mut self) -> Result<ForceScoreRequest, FlowError> {
        let (user_id, game, raw) = match &self.search {
            SearchState::Found {
                user,
                edit:
                    EditState::Editing {
                        game,
                        score,
                        submitting,
                    },
            } => {
                if *submitting {
                    return Err(FlowError::InFlight);
                }
                (user.user_id.clone(), *game, score.clone())
            }
            SearchState::Found { .. } => return Err(FlowError::NoGameSelected),
            _ => return Err(FlowError::NoUser),
        };

        let Some(score) = parse_score(&raw) else {
            let err = FlowError::InvalidScore;
            self.error = Some(err.to_string());
            return Err(err);
        };

        self.error = None;
        self.notice = None;
        if let Ok(EditState::Editing { submitting, .. }) = self.edit_mut() {
            *submitting = true;
        }

        let edit = ScoreEdit {
            game_name: game,
            user_id,
            score,
        };
        Ok(ForceScoreRequest::from(&edit))
    }

    pub fn complete_score(&mut self, result: Result<(), ApiError>) {
        let Ok(edit) = self.edit_mut() else {
            return;
        };
        match result {
            Ok(()) => {
                *edit = EditState::Choosing;
                self.notice = Some(SCORE_UPDATED.to_string());
            }
            Err(e) => {
                if let EditState::Editing { submitting, .. } = edit {
                    *submitting = false;
                }
                self.error = Some(e.display_message(SCORE_FAILED));
            }
        }
    }
}

/// Parse an operator-entered score: present, numeric, finite and not negative.
pub fn parse_score(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite() && *score >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found_flow() -> ManagementFlow {
        let mut flow = ManagementFlow::new();
        flow.set_code("AB12");
        flow.begin_search().unwrap();
        flow.complete_search(Ok(UserResponse {
            user_id: "AB12".into(),
            nickname: "철수".into(),
            phone: "010-1234-5678".into(),
        }));
        flow
    }

    #[test]
    fn test_search_found() {
        let flow = found_flow();
        let user = flow.user().unwrap();
        assert_eq!(user.nickname, "철수");
        assert_eq!(user.phone_number, "010-1234-5678");
        assert_eq!(flow.edit(), Some(&EditState::Hidden));
        assert_eq!(flow.error(), None);
    }

    #[test]
    fn test_search_not_found_hides_user_and_games() {
        let mut flow = ManagementFlow::new();
        flow.set_code("ZZZZ");
        flow.begin_search().unwrap();
        flow.complete_search(Err(ApiError::Status {
            status: 404,
            message: Some(USER_NOT_FOUND.into()),
        }));
        assert_eq!(flow.error(), Some(USER_NOT_FOUND));
        assert!(flow.user().is_none());
        assert!(flow.edit().is_none());
        assert_eq!(flow.reveal_games(), Err(FlowError::NoUser));
    }

    #[test]
    fn test_empty_code_rejected_locally() {
        let mut flow = ManagementFlow::new();
        flow.set_code("   ");
        assert_eq!(flow.begin_search(), Err(FlowError::MissingCode));
        assert_eq!(flow.search(), &SearchState::Idle);
    }

    #[test]
    fn test_new_search_clears_edit_state() {
        let mut flow = found_flow();
        flow.reveal_games().unwrap();
        flow.select_game(GameName::Allcll).unwrap();
        flow.set_code("CD34");
        flow.begin_search().unwrap();
        assert_eq!(flow.search(), &SearchState::Searching);
        assert!(flow.edit().is_none());
    }

    #[test]
    fn test_select_and_cancel() {
        let mut flow = found_flow();
        flow.reveal_games().unwrap();
        assert_eq!(flow.edit(), Some(&EditState::Choosing));

        flow.select_game(GameName::GreenyNeck).unwrap();
        flow.set_score("12").unwrap();
        flow.cancel().unwrap();
        assert_eq!(flow.edit(), Some(&EditState::Choosing));
    }

    #[test]
    fn test_select_game_clears_score() {
        let mut flow = found_flow();
        flow.select_game(GameName::Keyzzle).unwrap();
        flow.set_score("99").unwrap();
        flow.select_game(GameName::Allcll).unwrap();
        assert_eq!(
            flow.edit(),
            Some(&EditState::Editing {
                game: GameName::Allcll,
                score: String::new(),
                submitting: false,
            })
        );
    }

    #[test]
    fn test_invalid_score_rejected_without_request() {
        let mut flow = found_flow();
        flow.select_game(GameName::Keyzzle).unwrap();
        flow.set_score("abc").unwrap();
        assert_eq!(flow.begin_score_submit(), Err(FlowError::InvalidScore));
        assert_eq!(flow.error(), Some("유효한 점수를 입력해주세요."));
    }

    #[test]
    fn test_score_success_resets_selection_keeps_user() {
        let mut flow = found_flow();
        flow.select_game(GameName::PikachuVolley).unwrap();
        flow.set_score("12.5").unwrap();
        let req = flow.begin_score_submit().unwrap();
        assert_eq!(req.game_name, GameName::PikachuVolley);
        assert_eq!(req.user_id, "AB12");
        assert_eq!(req.score, 12.5);

        flow.complete_score(Ok(()));
        assert_eq!(flow.notice(), Some(SCORE_UPDATED));
        assert_eq!(flow.edit(), Some(&EditState::Choosing));
        assert!(flow.user().is_some());
    }

    #[test]
    fn test_score_failure_keeps_selection() {
        let mut flow = found_flow();
        flow.select_game(GameName::Keyzzle).unwrap();
        flow.set_score("3").unwrap();
        flow.begin_score_submit().unwrap();
        assert_eq!(flow.begin_score_submit(), Err(FlowError::InFlight));

        flow.complete_score(Err(ApiError::Status {
            status: 500,
            message: None,
        }));
        assert_eq!(flow.error(), Some(SCORE_FAILED));
        assert!(matches!(
            flow.edit(),
            Some(EditState::Editing {
                game: GameName::Keyzzle,
                submitting: false,
                ..
            })
        ));
        assert!(flow.begin_score_submit().is_ok());
    }

    #[test]
    fn test_score_without_game() {
        let mut flow = found_flow();
        assert_eq!(flow.begin_score_submit(), Err(FlowError::NoGameSelected));
        let mut empty = ManagementFlow::new();
        assert_eq!(empty.begin_score_submit(), Err(FlowError::NoUser));
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("10"), Some(10.0));
        assert_eq!(parse_score(" 0.25 "), Some(0.25));
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("abc"), None);
        assert_eq!(parse_score("-1"), None);
        assert_eq!(parse_score("NaN"), None);
        assert_eq!(parse_score("inf"), None);
    }
}
