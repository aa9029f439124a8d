//! Gemini provider implementation
//!
//! A thin `generateContent` client for the public Generative Language API
//! plus the mapping between conversation turns and Gemini's wire types.

pub mod client;
pub mod mapper;
pub mod types;

pub use client::{GeminiClient, DEFAULT_BASE_URL};
