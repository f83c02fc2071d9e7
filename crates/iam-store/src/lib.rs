//! # IAM Store
//!
//! iam-core의 저장소 trait에 대한 인메모리 구현을 제공합니다.
//!
//! 영속 저장소는 이 시스템의 외부 협력자입니다. 이 크레이트의
//! [`MemoryStore`]는 개발/테스트용 기준 구현이며, trait 계약(단일 문서
//! 원자성, 저장소 수준 이메일 유일성)을 그대로 따릅니다.

pub mod memory;

pub use memory::MemoryStore;
