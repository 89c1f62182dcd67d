// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Process configuration.
//!
//! Every setting comes from an environment variable and can be overridden by
//! the matching command-line flag.

use clap::Parser;

use crate::embeddings::DEFAULT_MODEL_ID;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 11435;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "local-embedding-server")]
#[command(version)]
#[command(about = "Local OpenAI-compatible embeddings endpoint", long_about = None)]
pub struct ServerConfig {
    /// Embedding model: HuggingFace Hub repository id or local model directory
    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_MODEL_ID)]
    pub model: String,

    /// Address to bind
    #[arg(long, env = "EMBEDDING_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port to bind
    #[arg(long, env = "EMBEDDING_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl ServerConfig {
    /// `(host, port)` pair accepted by `TcpListener::bind`
    pub fn listen_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}
