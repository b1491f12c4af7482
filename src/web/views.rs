// HTML views for the two console pages.

use askama::Template;
use axum::response::Html;

use crate::error::AppError;
use crate::flow::{EditState, ManagementFlow, RegistrationFlow};
use crate::models::{GameName, ManagedUser, RegisteredUser};
use crate::phone::PHONE_MAX_LEN;
use crate::seal::UserSeal;

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub nickname: String,
    pub phone: String,
    pub phone_max_len: usize,
    pub error: Option<String>,
    pub registered: Option<RegisteredUser>,
}

impl From<&RegistrationFlow> for RegisterPage {
    fn from(flow: &RegistrationFlow) -> Self {
        RegisterPage {
            nickname: flow.form().nickname.clone(),
            phone: flow.form().phone.clone(),
            phone_max_len: PHONE_MAX_LEN,
            error: flow.error().map(str::to_string),
            registered: flow.registered().cloned(),
        }
    }
}

pub struct GameButton {
    pub id: &'static str,
    pub label: &'static str,
}

pub struct SelectedGame {
    pub id: &'static str,
    pub label: &'static str,
    pub score: String,
}

/// The located user plus whatever part of the score editor is open.
pub struct UserPanel {
    pub user: ManagedUser,
    /// Posted back with the hidden user fields.
    pub seal: String,
    pub games_visible: bool,
    pub games: Vec<GameButton>,
    pub selected: Option<SelectedGame>,
}

#[derive(Template)]
#[template(path = "manage.html")]
pub struct ManagePage {
    pub code: String,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub user: Option<UserPanel>,
}

impl ManagePage {
    pub fn new(flow: &ManagementFlow, seal: &UserSeal) -> Self {
        let user = flow.user().zip(flow.edit()).map(|(user, edit)| {
            let selected = match edit {
                EditState::Editing { game, score, .. } => Some(SelectedGame {
                    id: game.as_str(),
                    label: game.label(),
                    score: score.clone(),
                }),
                _ => None,
            };
            UserPanel {
                user: user.clone(),
                seal: seal.sign(user),
                games_visible: *edit != EditState::Hidden,
                games: GameName::ALL
                    .iter()
                    .map(|game| GameButton {
                        id: game.as_str(),
                        label: game.label(),
                    })
                    .collect(),
                selected,
            }
        });

        ManagePage {
            code: flow.code().to_string(),
            error: flow.error().map(str::to_string),
            notice: flow.notice().map(str::to_string),
            user,
        }
    }
}

pub fn render<T: Template>(page: &T) -> Result<Html<String>, AppError> {
    Ok(Html(page.render()?))
}
