//! fittrack - fitness tracking backend
//!
//! This crate provides the REST server behind the fittrack app: accounts with
//! bearer-token authentication, progress logs, training preferences, an
//! exercise data proxy and generated workout recommendations.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod integrations;
pub mod models;
pub mod server;
pub mod telemetry;
