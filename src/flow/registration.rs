// Registration page: Idle -> Submitting -> Success | Failed.

use crate::client::ApiError;
use crate::models::{RegisterUserRequest, RegisterUserResponse, RegisteredUser, RegistrationForm};
use crate::phone::{apply_phone_edit, format_phone, PhoneEdit};

use super::FlowError;

pub const REGISTER_FAILED: &str = "사용자 등록에 실패했습니다.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    Idle,
    Submitting,
    Success(RegisteredUser),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RegistrationFlow {
    form: RegistrationForm,
    state: RegistrationState,
    // Values captured when the request went out; shown on success.
    submitted: Option<RegisterUserRequest>,
}

impl Default for RegistrationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationFlow {
    pub fn new() -> Self {
        Self::with_form(RegistrationForm::default())
    }

    /// Start from posted form values. The phone is normalised to the mask.
    pub fn with_form(form: RegistrationForm) -> Self {
        Self {
            form: RegistrationForm {
                phone: format_phone(&form.phone),
                nickname: form.nickname,
            },
            state: RegistrationState::Idle,
            submitted: None,
        }
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.form.nickname = nickname.into();
    }

    /// Apply a keystroke edit to the phone field.
    pub fn edit_phone(&mut self, raw: &str) -> PhoneEdit {
        let edit = apply_phone_edit(raw);
        self.form.phone = edit.value.clone();
        edit
    }

    /// Move to `Submitting` and hand back the request to send.
    pub fn begin_submit(&mut self) -> Result<RegisterUserRequest, FlowError> {
        if self.state == RegistrationState::Submitting {
            return Err(FlowError::InFlight);
        }
        if self.form.nickname.trim().is_empty() {
            let err = FlowError::MissingNickname;
            self.state = RegistrationState::Failed(err.to_string());
            return Err(err);
        }

        let req = RegisterUserRequest {
            nickname: self.form.nickname.clone(),
            phone: self.form.phone.clone(),
        };
        self.submitted = Some(req.clone());
        self.state = RegistrationState::Submitting;
        Ok(req)
    }

    /// Feed back the outcome of the create-user call.
    pub fn complete(&mut self, result: Result<RegisterUserResponse, ApiError>) {
        let Some(submitted) = self.submitted.take() else {
            return;
        };

        self.state = match result {
            Ok(resp) => match resp.user_id.or(resp.token) {
                Some(user_id) => {
                    self.form = RegistrationForm::default();
                    RegistrationState::Success(RegisteredUser {
                        user_id,
                        nickname: submitted.nickname,
                        phone: submitted.phone,
                    })
                }
                None => {
                    tracing::warn!("registration response carried no user id or token");
                    RegistrationState::Failed(REGISTER_FAILED.to_string())
                }
            },
            Err(e) => RegistrationState::Failed(e.display_message(REGISTER_FAILED)),
        };
    }

    /// Show a message next to the form without touching the fields.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.submitted = None;
        self.state = RegistrationState::Failed(message.into());
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RegistrationState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn registered(&self) -> Option<&RegisteredUser> {
        match &self.state {
            RegistrationState::Success(user) => Some(user),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> RegistrationFlow {
        let mut flow = RegistrationFlow::new();
        flow.set_nickname("철수");
        flow.edit_phone("010-12345678");
        flow
    }

    #[test]
    fn test_success_shows_user_and_resets_form() {
        let mut flow = filled();
        let req = flow.begin_submit().unwrap();
        assert_eq!(req.nickname, "철수");
        assert_eq!(req.phone, "010-1234-5678");
        assert_eq!(flow.state(), &RegistrationState::Submitting);

        flow.complete(Ok(RegisterUserResponse {
            user_id: Some("AB12".into()),
            token: None,
        }));

        let user = flow.registered().unwrap();
        assert_eq!(user.user_id, "AB12");
        assert_eq!(user.nickname, "철수");
        assert_eq!(user.phone, "010-1234-5678");
        assert_eq!(flow.form(), &RegistrationForm::default());
    }

    #[test]
    fn test_token_only_response() {
        let mut flow = filled();
        flow.begin_submit().unwrap();
        flow.complete(Ok(RegisterUserResponse {
            user_id: None,
            token: Some("tok".into()),
        }));
        assert_eq!(flow.registered().unwrap().user_id, "tok");
    }

    #[test]
    fn test_failure_keeps_fields() {
        let mut flow = filled();
        flow.begin_submit().unwrap();
        flow.complete(Err(ApiError::Status {
            status: 409,
            message: Some("이미 등록된 번호입니다.".into()),
        }));
        assert_eq!(flow.error(), Some("이미 등록된 번호입니다."));
        assert_eq!(flow.form().nickname, "철수");
        assert_eq!(flow.form().phone, "010-1234-5678");
    }

    #[test]
    fn test_failure_without_message_uses_default() {
        let mut flow = filled();
        flow.begin_submit().unwrap();
        flow.complete(Err(ApiError::Status {
            status: 500,
            message: None,
        }));
        assert_eq!(flow.error(), Some(REGISTER_FAILED));
    }

    #[test]
    fn test_duplicate_submit_rejected_while_submitting() {
        let mut flow = filled();
        flow.begin_submit().unwrap();
        assert_eq!(flow.begin_submit(), Err(FlowError::InFlight));
    }

    #[test]
    fn test_resubmit_after_failure() {
        let mut flow = filled();
        flow.begin_submit().unwrap();
        flow.complete(Err(ApiError::InvalidUrl("x".into())));
        assert!(flow.begin_submit().is_ok());
    }

    #[test]
    fn test_empty_nickname_rejected() {
        let mut flow = RegistrationFlow::new();
        flow.set_nickname("  ");
        assert_eq!(flow.begin_submit(), Err(FlowError::MissingNickname));
        assert_eq!(flow.error(), Some("닉네임을 입력해주세요."));
    }

    #[test]
    fn test_with_form_normalises_phone() {
        let flow = RegistrationFlow::with_form(RegistrationForm {
            nickname: "영희".into(),
            phone: "01098765432".into(),
        });
        assert_eq!(flow.form().phone, "010-9876-5432");
    }

    #[test]
    fn test_phone_edit_reset() {
        let mut flow = RegistrationFlow::new();
        let edit = flow.edit_phone("01");
        assert_eq!(edit.cursor, 4);
        assert_eq!(flow.form().phone, "010-");
    }
}
