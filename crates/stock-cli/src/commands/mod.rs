//! CLI 명령어 구현 모듈.

pub mod download;
pub mod indices;
pub mod inspect;
pub mod listing;
pub mod probe;
