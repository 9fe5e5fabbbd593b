//! Main module for sentex library functionality

pub mod analyzer;
pub mod assessing;
pub mod collecting;
pub mod document;
pub mod error;
pub mod extraction;
pub mod index;
pub mod normalization;
pub mod query;
pub mod settings;
pub mod statistics;
pub mod testing;
pub mod vocabulary;
