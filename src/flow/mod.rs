// Page state machines for the registration and management pages.
//
// These hold no I/O: a page handler asks the flow for the request to send,
// performs the call, and feeds the result back in.

pub mod management;
pub mod registration;

use thiserror::Error;

pub use management::{EditState, ManagementFlow, SearchState};
pub use registration::{RegistrationFlow, RegistrationState};

/// Local failures that stop a submission before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("닉네임을 입력해주세요.")]
    MissingNickname,
    #[error("사용자 코드를 입력해주세요.")]
    MissingCode,
    #[error("유효한 점수를 입력해주세요.")]
    InvalidScore,
    #[error("먼저 사용자를 검색해주세요.")]
    NoUser,
    #[error("게임을 선택해주세요.")]
    NoGameSelected,
    #[error("요청을 처리 중입니다. 잠시만 기다려주세요.")]
    InFlight,
}
