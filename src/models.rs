// View-model shapes and wire types for the remote game API.

use serde::{Deserialize, Serialize};

use crate::phone::PHONE_PREFIX;

// ── Games ─────────────────────────────────────────────────────────────

/// The fixed set of games whose scores can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameName {
    Keyzzle,
    Allcll,
    PikachuVolley,
    GreenyNeck,
}

impl GameName {
    pub const ALL: [GameName; 4] = [
        GameName::Keyzzle,
        GameName::Allcll,
        GameName::PikachuVolley,
        GameName::GreenyNeck,
    ];

    /// Identifier sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameName::Keyzzle => "keyzzle",
            GameName::Allcll => "allcll",
            GameName::PikachuVolley => "pikachu-volley",
            GameName::GreenyNeck => "greeny-neck",
        }
    }

    /// Button label shown to operators.
    pub fn label(&self) -> &'static str {
        match self {
            GameName::Keyzzle => "Keyzzle",
            GameName::Allcll => "올클",
            GameName::PikachuVolley => "피배",
            GameName::GreenyNeck => "목 늘리기",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|game| game.as_str() == value)
    }
}

impl std::fmt::Display for GameName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── View models ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub nickname: String,
    pub phone: String,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            nickname: String::new(),
            phone: PHONE_PREFIX.to_string(),
        }
    }
}

/// Projection of a freshly registered user, shown once to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    /// Server-assigned identifier. Some endpoint variants only return a
    /// token, in which case that token is shown here.
    pub user_id: String,
    pub nickname: String,
    pub phone: String,
}

/// Search result for the management page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedUser {
    pub user_id: String,
    pub nickname: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEdit {
    pub game_name: GameName,
    pub user_id: String,
    pub score: f64,
}

// ── Wire types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub nickname: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserResponse {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: String,
    pub nickname: String,
    pub phone: String,
}

impl From<UserResponse> for ManagedUser {
    fn from(user: UserResponse) -> Self {
        ManagedUser {
            user_id: user.user_id,
            nickname: user.nickname,
            phone_number: user.phone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceScoreRequest {
    pub game_name: GameName,
    pub user_id: String,
    pub score: f64,
}

impl From<&ScoreEdit> for ForceScoreRequest {
    fn from(edit: &ScoreEdit) -> Self {
        ForceScoreRequest {
            game_name: edit.game_name,
            user_id: edit.user_id.clone(),
            score: edit.score,
        }
    }
}

/// Error payload returned by the API on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
